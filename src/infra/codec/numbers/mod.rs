//! Numeric codec: little-endian integers of arbitrary bit width, the
//! NMEA 2000 "data not available" sentinels, and exact decimal resolution.
//!
//! Whole-byte widths (8, 16, 24, 32 and 64 bits) reserve their top value as
//! a null marker: all ones when unsigned, the largest positive value when
//! signed. Sub-byte and odd widths carry no sentinel and decode raw.
use crate::core::{FieldSchema, FieldValue};
use crate::error::EncodeError;
use crate::infra::codec::bits::{read_bits, write_bits, BitReader, BitWriter};
use tracing::warn;

/// Powers of ten exactly representable as `f64`.
const POW10: [f64; 23] = [
    1e0, 1e1, 1e2, 1e3, 1e4, 1e5, 1e6, 1e7, 1e8, 1e9, 1e10, 1e11, 1e12, 1e13, 1e14, 1e15, 1e16,
    1e17, 1e18, 1e19, 1e20, 1e21, 1e22,
];
/// Largest integer an `f64` holds without rounding.
const MAX_EXACT_F64: u128 = 1 << 53;
/// Finest resolution exponent accepted from a catalog.
const MAX_EXPONENT: u32 = 30;

//==================================================================================SENTINEL
/// `true` for the widths that reserve a null sentinel.
pub fn has_sentinel(bit_length: u32) -> bool {
    matches!(bit_length, 8 | 16 | 24 | 32 | 64)
}

/// All ones on `bit_length` bits.
pub fn max_unsigned(bit_length: u32) -> u64 {
    match bit_length {
        0 => 0,
        64.. => u64::MAX,
        bits => (1u64 << bits) - 1,
    }
}

/// Raw bit pattern meaning "data not available", for widths that have one.
pub fn null_pattern(bit_length: u32, signed: bool) -> Option<u64> {
    if !has_sentinel(bit_length) {
        return None;
    }
    Some(if signed {
        max_unsigned(bit_length - 1)
    } else {
        max_unsigned(bit_length)
    })
}

/// Two's complement interpretation of the low `bit_length` bits.
pub fn sign_extend(raw: u64, bit_length: u32) -> i64 {
    match bit_length {
        0 => 0,
        64.. => raw as i64,
        bits => {
            let shift = 64 - bits;
            ((raw << shift) as i64) >> shift
        }
    }
}

fn from_raw(raw: u64, bit_length: u32, signed: bool) -> FieldValue {
    if null_pattern(bit_length, signed) == Some(raw) {
        return FieldValue::Null;
    }
    if signed {
        FieldValue::I64(sign_extend(raw, bit_length))
    } else {
        FieldValue::U64(raw)
    }
}

fn zero(signed: bool) -> FieldValue {
    if signed {
        FieldValue::I64(0)
    } else {
        FieldValue::U64(0)
    }
}

//==================================================================================DECODE
/// Decode a little-endian integer occupying exactly `bytes`.
///
/// Widths of 1, 2, 3, 4 and 8 bytes are numbers subject to the null
/// sentinel. Any other non-empty width is returned as raw bytes.
pub fn decode(bytes: &[u8], signed: bool) -> FieldValue {
    match bytes.len() {
        0 => zero(signed),
        1..=4 | 8 => {
            let raw = bytes
                .iter()
                .rev()
                .fold(0u64, |acc, byte| (acc << 8) | *byte as u64);
            from_raw(raw, bytes.len() as u32 * 8, signed)
        }
        len => {
            warn!(len, "Unsupported numeric width, returning raw bytes");
            FieldValue::Bytes(bytes.to_vec())
        }
    }
}

/// Read a numeric field of `bit_length` bits at `bit_offset`.
///
/// Returns `Null` when the field lies (even partially) outside the buffer.
pub fn read_number(buffer: &[u8], bit_offset: u32, bit_length: u32, signed: bool) -> FieldValue {
    if bit_length == 0 {
        return zero(signed);
    }
    let end = bit_offset as usize + bit_length as usize;
    if end > buffer.len() * 8 {
        return FieldValue::Null;
    }
    if bit_offset % 8 == 0 && bit_length % 8 == 0 {
        let start = bit_offset as usize / 8;
        return decode(&buffer[start..end / 8], signed);
    }
    if bit_length > 32 && bit_length != 64 {
        warn!(bit_offset, bit_length, "Unsupported numeric width, returning raw bits");
        let mut reader = BitReader::at(buffer, bit_offset as usize);
        return reader
            .read_bytes(bit_length as usize)
            .map(FieldValue::Bytes)
            .unwrap_or(FieldValue::Null);
    }
    match read_bits(buffer, bit_offset as usize, bit_length) {
        Ok(raw) => from_raw(raw, bit_length, signed),
        Err(_) => FieldValue::Null,
    }
}

//==================================================================================RESOLUTION
/// Decimal scale factor stored as `mantissa * 10^-exponent`.
///
/// Keeping the decimal form lets a raw integer be scaled with a single
/// exact division, so `15300000 * 1e-6` yields exactly `15.3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    mantissa: i64,
    exponent: u32,
}

impl Default for Resolution {
    fn default() -> Self {
        Self::ONE
    }
}

impl Resolution {
    pub const ONE: Self = Self {
        mantissa: 1,
        exponent: 0,
    };

    /// Build from the shortest decimal representation of `value`.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() || value == 0.0 {
            return None;
        }
        Self::parse(&format!("{value}"))
    }

    /// Parse a decimal literal such as `0.0001`, `1e-7` or `10`.
    ///
    /// Exponents finer than `10^-30` are rejected.
    pub fn parse(literal: &str) -> Option<Self> {
        let (digits, power) = decimal_parts(literal)?;
        if digits == 0 {
            return None;
        }
        if power >= 0 {
            let mantissa = digits.checked_mul(10i128.checked_pow(power as u32)?)?;
            return Some(Self {
                mantissa: i64::try_from(mantissa).ok()?,
                exponent: 0,
            });
        }
        let exponent = power.unsigned_abs();
        if exponent > MAX_EXPONENT {
            return None;
        }
        Some(Self {
            mantissa: i64::try_from(digits).ok()?,
            exponent,
        })
    }

    pub fn is_one(&self) -> bool {
        *self == Self::ONE
    }

    /// `raw * resolution`, correctly rounded: the integer product is
    /// divided once by the power of ten. `None` only on `i128` overflow.
    pub fn scale(&self, raw: i128) -> Option<f64> {
        let product = raw.checked_mul(self.mantissa as i128)?;
        let exponent = self.exponent as usize;
        if product.unsigned_abs() <= MAX_EXACT_F64 && exponent < POW10.len() {
            return Some(product as f64 / POW10[exponent]);
        }
        // Past 2^53 the product itself is inexact as f64: round from the
        // decimal literal instead.
        let digits = product.unsigned_abs().to_string();
        let sign = if product < 0 { "-" } else { "" };
        let literal = if exponent == 0 {
            format!("{sign}{digits}")
        } else if digits.len() > exponent {
            let (int_part, frac_part) = digits.split_at(digits.len() - exponent);
            format!("{sign}{int_part}.{frac_part}")
        } else {
            format!("{sign}0.{digits:0>exponent$}")
        };
        literal.parse().ok()
    }

    /// Raw integer closest to `value / resolution`, ties away from zero.
    ///
    /// `value` is taken at its shortest decimal form, so `1.005` at `0.01`
    /// is the exact tie `100.5` and yields 101.
    pub fn unscale(&self, value: f64) -> Option<i128> {
        if !value.is_finite() {
            return None;
        }
        let (digits, power) = decimal_parts(&format!("{value}"))?;
        self.unscale_decimal(digits, power)
    }

    /// Raw integer closest to `value / resolution` for an integral value.
    pub fn unscale_integer(&self, value: i128) -> Option<i128> {
        self.unscale_decimal(value, 0)
    }

    /// `digits * 10^power / resolution` as an exact rational.
    fn unscale_decimal(&self, digits: i128, power: i32) -> Option<i128> {
        let shift = power.checked_add(self.exponent as i32)?;
        let mantissa = self.mantissa as i128;
        if shift >= 0 {
            let numerator = digits.checked_mul(10i128.checked_pow(shift as u32)?)?;
            return Some(divide_rounded(numerator, mantissa));
        }
        match 10i128
            .checked_pow(shift.unsigned_abs())
            .and_then(|scale| scale.checked_mul(mantissa))
        {
            Some(denominator) => Some(divide_rounded(digits, denominator)),
            // The quotient is far below one half.
            None => Some(0),
        }
    }
}

/// Split a decimal literal into `digits * 10^power`, trailing zeros folded
/// into the power.
fn decimal_parts(literal: &str) -> Option<(i128, i32)> {
    let literal = literal.trim();
    let (number, exp) = match literal.find(['e', 'E']) {
        Some(at) => (&literal[..at], literal[at + 1..].parse::<i32>().ok()?),
        None => (literal, 0),
    };
    let (negative, number) = match number.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, number.strip_prefix('+').unwrap_or(number)),
    };
    let (int_part, frac_part) = number.split_once('.').unwrap_or((number, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    let mut digits: i128 = 0;
    for c in int_part.chars().chain(frac_part.chars()) {
        let digit = c.to_digit(10)?;
        digits = digits.checked_mul(10)?.checked_add(digit as i128)?;
    }
    let mut power = exp.checked_sub(i32::try_from(frac_part.len()).ok()?)?;
    while digits != 0 && digits % 10 == 0 {
        digits /= 10;
        power = power.checked_add(1)?;
    }
    Some((if negative { -digits } else { digits }, power))
}

/// `numerator / denominator` rounded half away from zero.
fn divide_rounded(numerator: i128, denominator: i128) -> i128 {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    if remainder.unsigned_abs() * 2 < denominator.unsigned_abs() {
        quotient
    } else if (numerator < 0) != (denominator < 0) {
        quotient - 1
    } else {
        quotient + 1
    }
}

/// Apply a resolution to a decoded raw value. Non-numeric values and
/// products beyond `f64` precision pass through unchanged.
pub fn apply_resolution(value: FieldValue, resolution: Resolution) -> FieldValue {
    if resolution.is_one() {
        return value;
    }
    let raw = match &value {
        FieldValue::I64(v) => *v as i128,
        FieldValue::U64(v) => *v as i128,
        _ => return value,
    };
    resolution
        .scale(raw)
        .map(FieldValue::F64)
        .unwrap_or(value)
}

//==================================================================================ENCODE
/// Raw bits for `value` in `field`: the sentinel for `Null`, resolution
/// removed, two's complement masked to the field width.
pub fn to_raw(value: &FieldValue, field: &FieldSchema) -> Result<u64, EncodeError> {
    let bits = field.bit_length;
    if value.is_null() {
        return Ok(null_pattern(bits, field.signed).unwrap_or_else(|| max_unsigned(bits)));
    }
    let raw: i128 = match value {
        FieldValue::F64(v) => field.resolution.unscale(*v),
        FieldValue::I64(v) if field.resolution.is_one() => Some(*v as i128),
        FieldValue::U64(v) if field.resolution.is_one() => Some(*v as i128),
        FieldValue::I64(v) => field.resolution.unscale_integer(*v as i128),
        FieldValue::U64(v) => field.resolution.unscale_integer(*v as i128),
        // Raw little-endian bytes, as decoded for unsupported widths.
        FieldValue::Bytes(bytes) if bytes.len() <= 8 => Some(
            bytes
                .iter()
                .rev()
                .fold(0i128, |acc, byte| (acc << 8) | *byte as i128),
        ),
        _ => None,
    }
    .ok_or_else(|| EncodeError::TypeMismatch {
        field: field.id.clone(),
        value: value.clone(),
    })?;
    Ok((raw as u64) & max_unsigned(bits))
}

/// Write `value` into `buffer` at `bit_offset` following `field`.
pub fn encode(
    buffer: &mut [u8],
    bit_offset: u32,
    value: &FieldValue,
    field: &FieldSchema,
) -> Result<(), EncodeError> {
    if field.bit_length == 0 {
        return Ok(());
    }
    if field.bit_length > 64 {
        let bytes = match value {
            FieldValue::Bytes(bytes) => bytes.clone(),
            FieldValue::Null => Vec::new(),
            other => {
                return Err(EncodeError::TypeMismatch {
                    field: field.id.clone(),
                    value: other.clone(),
                })
            }
        };
        let mut writer = BitWriter::at(buffer, bit_offset as usize);
        return writer
            .write_bytes(&bytes, field.bit_length as usize)
            .map_err(|source| EncodeError::Write {
                field: field.id.clone(),
                source,
            });
    }
    let raw = to_raw(value, field)?;
    write_bits(buffer, bit_offset as usize, raw, field.bit_length).map_err(|source| {
        EncodeError::Write {
            field: field.id.clone(),
            source,
        }
    })
}
