//! Schema-driven extraction and injection engine.
//!
//! `extract` walks a `MessageSchema` over a payload and produces one value
//! per field. `resolve` does the same for an option group, picking the
//! first variant whose match fields agree with the payload. `inject` is the
//! inverse of `extract`.
use super::bits::{BitReader, BitWriter};
use super::numbers::{self, apply_resolution, read_number};
use super::text;
use super::traits::FieldAccess;
use crate::core::{FieldKind, FieldSchema, FieldValue, MessageSchema, SchemaEntry};
use crate::error::EncodeError;
use crate::infra::codec::numbers::Resolution;
use std::borrow::Cow;
use std::sync::Arc;
use tracing::{debug, trace};

/// Id of the synthetic field holding bytes past the last declared field.
pub const UNKNOWN_DATA_ID: &str = "unknownData";

/// Result of an extraction: the field layout resolved against the payload
/// and the value of every field, index-aligned.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub layout: Vec<FieldSchema>,
    pub values: Vec<FieldValue>,
}

//==================================================================================LAYOUT
/// Field positions for a payload containing variable-length text: each
/// field starts where the previous one actually ended.
fn stream_layout(buffer: &[u8], fields: &[FieldSchema]) -> Vec<FieldSchema> {
    let mut cursor = 0u32;
    fields
        .iter()
        .map(|field| {
            let bit_length = if field.kind.is_variable() {
                text::region_len(buffer, (cursor / 8) as usize, &field.kind) as u32 * 8
            } else {
                field.bit_length
            };
            let placed = field.positioned(cursor, bit_length);
            cursor += bit_length;
            placed
        })
        .collect()
}

fn unknown_data(bit_offset: u32, bit_length: u32) -> FieldSchema {
    FieldSchema {
        id: UNKNOWN_DATA_ID.to_string(),
        name: "Unknown Binary Data".to_string(),
        description: None,
        unit: None,
        kind: FieldKind::BinaryBlob,
        bit_length,
        bit_offset,
        byte_length: (bit_length % 8 == 0).then_some(bit_length / 8),
        signed: false,
        resolution: Resolution::ONE,
        match_value: None,
        is_differentiator: false,
        default: None,
    }
}

/// Fields of `schema` positioned for `buffer`, followed by an
/// `unknownData` field when the payload outlasts the declared byte length.
/// Padding bits up to the next byte boundary are not unknown data.
pub fn layout(buffer: &[u8], schema: &MessageSchema) -> Vec<FieldSchema> {
    let mut fields = if schema.is_variable_length {
        stream_layout(buffer, &schema.fields)
    } else {
        schema.fields.clone()
    };
    let last_bit = fields.iter().map(FieldSchema::bit_end).max().unwrap_or(0);
    let mut end = last_bit.div_ceil(8) * 8;
    if !schema.is_variable_length {
        end = end.max(schema.byte_length as u32 * 8);
    }
    let buffer_bits = (buffer.len() * 8) as u32;
    if buffer_bits > end {
        fields.push(unknown_data(end, buffer_bits - end));
    }
    fields
}

//==================================================================================EXTRACT
/// Value of a single positioned field.
pub fn extract_field(buffer: &[u8], field: &FieldSchema) -> FieldValue {
    let read_raw = || {
        BitReader::at(buffer, field.bit_offset as usize)
            .read_bytes(field.bit_length as usize)
            .ok()
    };
    match &field.kind {
        FieldKind::FixedText => read_raw().map_or(FieldValue::Null, |bytes| text::decode_fixed(&bytes)),
        FieldKind::VariableLengthText { .. } => {
            if field.bit_length == 0 {
                return FieldValue::Null;
            }
            read_raw().map_or(FieldValue::Null, |region| {
                text::decode_variable(&region, &field.kind)
            })
        }
        FieldKind::BinaryBlob if field.bit_length > 64 || field.id == UNKNOWN_DATA_ID => {
            read_raw().map_or(FieldValue::Null, FieldValue::Bytes)
        }
        FieldKind::Integer | FieldKind::ScaledDecimal => apply_resolution(
            read_number(buffer, field.bit_offset, field.bit_length, field.signed),
            field.resolution,
        ),
        _ => read_number(buffer, field.bit_offset, field.bit_length, field.signed),
    }
}

/// Extract every field of `schema` from `buffer`.
///
/// Never fails: fields past the end of a truncated payload are `Null`.
pub fn extract(buffer: &[u8], schema: &MessageSchema) -> Extraction {
    let layout = layout(buffer, schema);
    let values = layout
        .iter()
        .map(|field| extract_field(buffer, field))
        .collect::<Vec<_>>();
    trace!(pgn = schema.pgn, id = %schema.id, fields = values.len(), "Payload extracted");
    Extraction { layout, values }
}

/// Whether every match field of `schema` holds its expected value in `buffer`.
pub fn matches_candidate(buffer: &[u8], schema: &MessageSchema) -> bool {
    if schema.match_fields.is_empty() {
        return true;
    }
    let fields: Cow<'_, [FieldSchema]> = if schema.is_variable_length {
        Cow::Owned(stream_layout(buffer, &schema.fields))
    } else {
        Cow::Borrowed(&schema.fields)
    };
    schema.match_fields.iter().all(|m| {
        fields
            .get(m.index)
            .and_then(|field| extract_field(buffer, field).as_i64())
            == Some(m.expected)
    })
}

/// Pick the schema of `entry` that describes `buffer` and extract it.
///
/// Options are tried in catalog order; the group fallback applies when
/// none matches.
pub fn resolve(buffer: &[u8], entry: &SchemaEntry) -> (Arc<MessageSchema>, Extraction) {
    let schema = match entry {
        SchemaEntry::Single(schema) => Arc::clone(schema),
        SchemaEntry::Options(group) => match group
            .options
            .iter()
            .find(|option| matches_candidate(buffer, option))
        {
            Some(option) => Arc::clone(option),
            None => {
                debug!(pgn = group.pgn, fallback = %group.fallback.id, "No option matched");
                Arc::clone(&group.fallback)
            }
        },
    };
    let extraction = extract(buffer, &schema);
    (schema, extraction)
}

//==================================================================================INJECT
/// Value written for `field`: its match value, else the supplied value
/// (lookup labels translated), else its default.
fn value_for<V: FieldAccess + ?Sized>(
    field: &FieldSchema,
    values: &V,
) -> Result<Option<FieldValue>, EncodeError> {
    if let Some(expected) = field.match_value {
        return Ok(Some(FieldValue::I64(expected)));
    }
    match (values.field(&field.id), &field.kind) {
        (Some(FieldValue::Text(label)), FieldKind::Lookup(table)) => table
            .value_of(label)
            .map(|value| Some(FieldValue::U64(value)))
            .ok_or_else(|| EncodeError::UnknownLabel {
                field: field.id.clone(),
                label: label.clone(),
            }),
        (Some(value), _) => Ok(Some(value.clone())),
        (None, _) => Ok(field.default.clone()),
    }
}

fn write_field(buffer: &mut [u8], field: &FieldSchema, value: &FieldValue) -> Result<(), EncodeError> {
    let mismatch = || EncodeError::TypeMismatch {
        field: field.id.clone(),
        value: value.clone(),
    };
    let bytes: Cow<'_, [u8]> = match (&field.kind, value) {
        (FieldKind::FixedText, FieldValue::Text(text)) => {
            Cow::Owned(text::encode_fixed(text, (field.bit_length / 8) as usize))
        }
        (FieldKind::FixedText | FieldKind::BinaryBlob, FieldValue::Bytes(bytes)) => {
            Cow::Borrowed(bytes.as_slice())
        }
        (FieldKind::FixedText, FieldValue::Null) => Cow::Borrowed(&[]),
        (FieldKind::FixedText | FieldKind::VariableLengthText { .. }, _) => return Err(mismatch()),
        _ => return numbers::encode(buffer, field.bit_offset, value, field),
    };
    BitWriter::at(buffer, field.bit_offset as usize)
        .write_bytes(&bytes, field.bit_length as usize)
        .map_err(|source| EncodeError::Write {
            field: field.id.clone(),
            source,
        })
}

/// Build the payload of `schema` from `values`.
///
/// The buffer starts zeroed; absent fields without a default stay zero.
/// Variable-length text is laid out in stream order, so the payload length
/// follows the text actually supplied.
pub fn inject<V: FieldAccess + ?Sized>(
    schema: &MessageSchema,
    values: &V,
) -> Result<Vec<u8>, EncodeError> {
    let mut cursor = 0u32;
    let mut planned: Vec<(FieldSchema, Option<FieldValue>)> = Vec::with_capacity(schema.fields.len());

    for field in &schema.fields {
        let value = value_for(field, values)?;
        if field.kind.is_variable() {
            let text = match &value {
                Some(FieldValue::Text(text)) => text.as_str(),
                Some(FieldValue::Null) | None => "",
                Some(other) => {
                    return Err(EncodeError::TypeMismatch {
                        field: field.id.clone(),
                        value: other.clone(),
                    })
                }
            };
            let region = text::encode_variable(text, &field.kind);
            let placed = field.positioned(cursor, region.len() as u32 * 8);
            cursor += placed.bit_length;
            planned.push((placed, Some(FieldValue::Bytes(region))));
        } else {
            let placed = field.positioned(cursor, field.bit_length);
            cursor += field.bit_length;
            planned.push((placed, value));
        }
    }

    let mut buffer = vec![0u8; (cursor.div_ceil(8) as usize).max(schema.byte_length)];
    for (field, value) in &planned {
        match (value, &field.kind) {
            (Some(FieldValue::Bytes(region)), FieldKind::VariableLengthText { .. }) => {
                BitWriter::at(&mut buffer, field.bit_offset as usize)
                    .write_bytes(region, field.bit_length as usize)
                    .map_err(|source| EncodeError::Write {
                        field: field.id.clone(),
                        source,
                    })?
            }
            (Some(value), _) => write_field(&mut buffer, field, value)?,
            (None, _) => {}
        }
    }
    trace!(pgn = schema.pgn, id = %schema.id, len = buffer.len(), "Payload injected");
    Ok(buffer)
}
