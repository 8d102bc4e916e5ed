//! NMEA 2000 text encodings.
//!
//! | Kind                 | Layout                                   |
//! |----------------------|------------------------------------------|
//! | fixed                | N bytes, padded with 0xFF, 0x00, `@` or space |
//! | length prefixed      | `len` (counts itself), then `len - 1` bytes |
//! | length + control     | `len`, control (0 UTF-16LE, 1 ASCII), text |
//! | start / stop         | 0x02, text, 0x01                         |
use crate::core::{FieldKind, FieldValue};
use tracing::warn;

const START_BYTE: u8 = 0x02;
const STOP_BYTE: u8 = 0x01;
const CONTROL_UNICODE: u8 = 0;
const CONTROL_ASCII: u8 = 1;

fn is_padding(byte: u8) -> bool {
    matches!(byte, 0x00 | 0xFF | b'@' | b' ')
}

fn ascii(bytes: &[u8]) -> String {
    bytes.iter().map(|&byte| byte as char).collect()
}

fn text_or_null(text: String) -> FieldValue {
    if text.is_empty() {
        FieldValue::Null
    } else {
        FieldValue::Text(text)
    }
}

//==================================================================================REGION
/// Header bytes preceding the text of a variable-length kind.
pub fn header_len(kind: &FieldKind) -> usize {
    match kind {
        FieldKind::VariableLengthText {
            length_prefixed: true,
            control_byte: true,
        } => 2,
        FieldKind::VariableLengthText { .. } => 1,
        _ => 0,
    }
}

/// Byte length of the variable-length region starting at `byte_offset`,
/// clipped to the buffer. A declared length shorter than the header still
/// consumes the header.
pub fn region_len(buffer: &[u8], byte_offset: usize, kind: &FieldKind) -> usize {
    let Some(rest) = buffer.get(byte_offset..).filter(|rest| !rest.is_empty()) else {
        return 0;
    };
    let declared = match kind {
        FieldKind::VariableLengthText {
            length_prefixed: true,
            ..
        } => (rest[0] as usize).max(header_len(kind)),
        FieldKind::VariableLengthText {
            length_prefixed: false,
            ..
        } => {
            if rest[0] != START_BYTE {
                1
            } else {
                rest.iter()
                    .skip(1)
                    .position(|&byte| byte == STOP_BYTE)
                    .map_or(rest.len(), |stop| stop + 2)
            }
        }
        _ => 0,
    };
    declared.min(rest.len())
}

//==================================================================================DECODE
/// Fixed-width ASCII, trailing padding removed.
pub fn decode_fixed(bytes: &[u8]) -> FieldValue {
    let end = bytes
        .iter()
        .rposition(|&byte| !is_padding(byte))
        .map_or(0, |last| last + 1);
    text_or_null(ascii(&bytes[..end]))
}

/// Decode a whole variable-length region (header included).
pub fn decode_variable(region: &[u8], kind: &FieldKind) -> FieldValue {
    match kind {
        FieldKind::VariableLengthText {
            length_prefixed: true,
            control_byte: true,
        } => decode_with_control(region),
        FieldKind::VariableLengthText {
            length_prefixed: true,
            control_byte: false,
        } => {
            let body = region.get(1..).unwrap_or_default();
            let end = body.iter().position(|&byte| byte == 0x00).unwrap_or(body.len());
            text_or_null(ascii(&body[..end]))
        }
        FieldKind::VariableLengthText {
            length_prefixed: false,
            ..
        } => {
            let body = match region {
                [START_BYTE, body @ .., STOP_BYTE] => body,
                [START_BYTE, body @ ..] => body,
                _ => &[],
            };
            text_or_null(ascii(body))
        }
        _ => decode_fixed(region),
    }
}

fn decode_with_control(region: &[u8]) -> FieldValue {
    let [_, control, body @ ..] = region else {
        return FieldValue::Null;
    };
    match *control {
        CONTROL_ASCII => text_or_null(ascii(body)),
        CONTROL_UNICODE => {
            if body.len() % 2 != 0 {
                warn!(len = body.len(), "Odd UTF-16 byte count, last byte dropped");
            }
            let units: Vec<u16> = body
                .chunks_exact(2)
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                .collect();
            text_or_null(String::from_utf16_lossy(&units))
        }
        other => {
            warn!(control = other, "Unknown string encoding, keeping raw bytes");
            FieldValue::Bytes(body.to_vec())
        }
    }
}

//==================================================================================ENCODE
/// Fixed-width ASCII padded with 0xFF (truncated when too long).
pub fn encode_fixed(text: &str, byte_length: usize) -> Vec<u8> {
    let mut bytes: Vec<u8> = text.bytes().take(byte_length).collect();
    bytes.resize(byte_length, 0xFF);
    bytes
}

/// Full variable-length region (header included) for `text`.
pub fn encode_variable(text: &str, kind: &FieldKind) -> Vec<u8> {
    match kind {
        FieldKind::VariableLengthText {
            length_prefixed: true,
            control_byte: true,
        } => {
            let (control, body): (u8, Vec<u8>) = if text.is_ascii() {
                (CONTROL_ASCII, text.as_bytes().to_vec())
            } else {
                (
                    CONTROL_UNICODE,
                    text.encode_utf16().flat_map(u16::to_le_bytes).collect(),
                )
            };
            let body = &body[..body.len().min(u8::MAX as usize - 2)];
            let mut region = Vec::with_capacity(body.len() + 2);
            region.push((body.len() + 2) as u8);
            region.push(control);
            region.extend_from_slice(body);
            region
        }
        FieldKind::VariableLengthText {
            length_prefixed: true,
            control_byte: false,
        } => {
            let body = &text.as_bytes()[..text.len().min(u8::MAX as usize - 1)];
            let mut region = Vec::with_capacity(body.len() + 1);
            region.push((body.len() + 1) as u8);
            region.extend_from_slice(body);
            region
        }
        FieldKind::VariableLengthText { .. } => {
            let mut region = Vec::with_capacity(text.len() + 2);
            region.push(START_BYTE);
            region.extend_from_slice(text.as_bytes());
            region.push(STOP_BYTE);
            region
        }
        _ => text.as_bytes().to_vec(),
    }
}
