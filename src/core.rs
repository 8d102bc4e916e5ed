//! Defines the "data contract" between the schema normalizer (the scribe)
//! and the field engine (the interpreter).
//!
//! The normalizer turns a raw catalog into `MessageSchema` values. The
//! `engine` module consumes those schemas to parse or build binary payloads.
use crate::infra::codec::numbers::Resolution;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Field values keyed by field id, as supplied to the encoder or
/// collected by `Packet::fields`.
pub type FieldMap = BTreeMap<String, FieldValue>;

//==================================================================================FIELD_KIND
/// Semantic type of a field within a message schema.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Plain signed or unsigned integer.
    Integer,
    /// Integer scaled by a decimal resolution.
    ScaledDecimal,
    /// Integer resolved through an enumeration table.
    Lookup(Arc<EnumTable>),
    /// 11-bit NMEA 2000 manufacturer code.
    ManufacturerCode,
    /// ASCII text occupying a fixed number of bytes.
    FixedText,
    /// Text whose byte length is carried in the payload itself.
    ///
    /// * `length_prefixed` – a length byte (counting itself) opens the region;
    ///   otherwise the region is delimited by start (0x02) and stop (0x01) bytes.
    /// * `control_byte` – a second header byte selects the encoding
    ///   (0 = UTF-16LE, 1 = ASCII).
    VariableLengthText {
        length_prefixed: bool,
        control_byte: bool,
    },
    /// Opaque bits: binary data, reserved or spare regions.
    BinaryBlob,
}

impl FieldKind {
    /// `true` when the layout of the remaining fields depends on this one.
    pub fn is_variable(&self) -> bool {
        matches!(self, FieldKind::VariableLengthText { .. })
    }
}

/// Numeric value to label table of a lookup field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnumTable(BTreeMap<u64, String>);

impl EnumTable {
    /// Label of a raw value, when the table knows it.
    pub fn label(&self, value: u64) -> Option<&str> {
        self.0.get(&value).map(String::as_str)
    }

    /// Reverse lookup used when encoding a label.
    pub fn value_of(&self, label: &str) -> Option<u64> {
        self.0
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(label))
            .map(|(value, _)| *value)
    }
}

impl FromIterator<(u64, String)> for EnumTable {
    fn from_iter<T: IntoIterator<Item = (u64, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

//==================================================================================FIELD_SCHEMA
/// Static description of a field inside a message.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    /// 1. Field identifier, unique within its message.
    pub id: String,
    /// 2. Human readable name.
    pub name: String,
    /// 3. Optional catalog description.
    pub description: Option<String>,
    /// 4. Physical unit, when the catalog provides one.
    pub unit: Option<String>,
    /// 5. Semantic kind driving extraction and injection.
    pub kind: FieldKind,
    /// 6. Width in bits. For variable-length text this is the width resolved
    ///    against a concrete payload.
    pub bit_length: u32,
    /// 7. Position of the first bit, counted from the start of the payload.
    pub bit_offset: u32,
    /// 8. Whole byte count, present only when `bit_length` is a multiple of 8.
    pub byte_length: Option<u32>,
    /// 9. Two's complement interpretation.
    pub signed: bool,
    /// 10. Decimal scale applied to the raw integer.
    pub resolution: Resolution,
    /// 11. Expected value when the field discriminates between variants.
    pub match_value: Option<i64>,
    /// 12. Part of the message's identity (`source`, `instance`, `pgn`).
    pub is_differentiator: bool,
    /// 13. Value injected when the caller supplies none.
    pub default: Option<FieldValue>,
}

impl FieldSchema {
    /// Position of the first bit past the field.
    pub fn bit_end(&self) -> u32 {
        self.bit_offset + self.bit_length
    }

    /// Copy of the field relocated to `bit_offset` with width `bit_length`.
    pub fn positioned(&self, bit_offset: u32, bit_length: u32) -> Self {
        Self {
            bit_offset,
            bit_length,
            byte_length: (bit_length % 8 == 0).then_some(bit_length / 8),
            ..self.clone()
        }
    }
}

//==================================================================================MESSAGE_SCHEMA
/// Position and expected value of a discriminating field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchField {
    /// Index into `MessageSchema::fields`.
    pub index: usize,
    pub expected: i64,
}

/// Complete, normalized description of one message variant.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageSchema {
    /// Parameter Group Number.
    pub pgn: u32,
    /// Catalog identifier, unique across the catalog (e.g. `vesselHeading`).
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: Option<String>,
    /// Ordered fields with computed bit offsets.
    pub fields: Vec<FieldSchema>,
    /// `ceil(sum of declared bit lengths / 8)`.
    pub byte_length: usize,
    /// At least one field is variable-length text.
    pub is_variable_length: bool,
    pub is_single_frame: bool,
    pub is_proprietary: bool,
    /// Default CAN priority, 0 (highest) to 7.
    pub priority: u8,
    /// Size of the repeating field set declared by the catalog.
    pub repeating_fields: u32,
    /// Discriminating fields, in declaration order.
    pub match_fields: Vec<MatchField>,
}

impl MessageSchema {
    /// Field by id.
    pub fn field(&self, id: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|field| field.id == id)
    }

    /// Fields forming the message identity.
    pub fn differentiators(&self) -> impl Iterator<Item = &FieldSchema> {
        self.fields.iter().filter(|field| field.is_differentiator)
    }

    /// PDU1 messages (PF below 240) carry an explicit destination.
    pub fn is_addressable(&self) -> bool {
        ((self.pgn >> 8) & 0xFF) < 0xF0
    }
}

/// Variants sharing one PGN, told apart by their match fields.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionGroup {
    pub pgn: u32,
    /// Frame mode shared by every option (taken from the first one).
    pub is_single_frame: bool,
    pub options: Vec<Arc<MessageSchema>>,
    /// Used when no option matches the payload.
    pub fallback: Arc<MessageSchema>,
}

/// What the registry holds for a PGN.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaEntry {
    Single(Arc<MessageSchema>),
    Options(OptionGroup),
}

impl SchemaEntry {
    pub fn pgn(&self) -> u32 {
        match self {
            SchemaEntry::Single(schema) => schema.pgn,
            SchemaEntry::Options(group) => group.pgn,
        }
    }

    /// Whether frames of this PGN bypass Fast Packet reassembly.
    pub fn is_single_frame(&self) -> bool {
        match self {
            SchemaEntry::Single(schema) => schema.is_single_frame,
            SchemaEntry::Options(group) => group.is_single_frame,
        }
    }
}

//==================================================================================FIELD_VALUE
/// Decoded or to-be-encoded field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// "Data not available": the reserved all-ones pattern.
    Null,
    I64(i64),
    U64(u64),
    F64(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Integer view; floats qualify only when integral.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::I64(v) => Some(*v),
            FieldValue::U64(v) => i64::try_from(*v).ok(),
            FieldValue::F64(v) if v.fract() == 0.0 && v.abs() < 9.2e18 => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            FieldValue::U64(v) => Some(*v),
            FieldValue::I64(v) => u64::try_from(*v).ok(),
            FieldValue::F64(v) if v.fract() == 0.0 && *v >= 0.0 && *v < 1.8e19 => Some(*v as u64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::F64(v) => Some(*v),
            FieldValue::I64(v) => Some(*v as f64),
            FieldValue::U64(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => f.write_str("null"),
            FieldValue::I64(v) => write!(f, "{v}"),
            FieldValue::U64(v) => write!(f, "{v}"),
            FieldValue::F64(v) => write!(f, "{v}"),
            FieldValue::Text(text) => f.write_str(text),
            FieldValue::Bytes(bytes) => {
                for byte in bytes {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
        }
    }
}

macro_rules! field_value_from {
    ($($ty:ty => $variant:ident as $target:ty),* $(,)?) => {
        $(impl From<$ty> for FieldValue {
            fn from(value: $ty) -> Self {
                FieldValue::$variant(value as $target)
            }
        })*
    };
}

field_value_from!(
    u8 => U64 as u64,
    u16 => U64 as u64,
    u32 => U64 as u64,
    u64 => U64 as u64,
    i8 => I64 as i64,
    i16 => I64 as i64,
    i32 => I64 as i64,
    i64 => I64 as i64,
    f32 => F64 as f64,
    f64 => F64 as f64,
);

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(value: Vec<u8>) -> Self {
        FieldValue::Bytes(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}
