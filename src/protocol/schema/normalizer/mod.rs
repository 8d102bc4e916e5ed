//! Catalog normalization: raw definitions in, ready-to-use schemas out.
//!
//! Per field: defaults, id/name repair, duplicate id suffixes, kind
//! classification and bit offsets. Per message: byte length, frame mode,
//! priority and match fields. Per PGN: a single schema or an option group
//! with its fallback.
use crate::conf::{CodecConfig, DIFFERENTIATOR_IDS};
use crate::core::{
    EnumTable, FieldKind, FieldSchema, FieldValue, MatchField, MessageSchema, OptionGroup,
    SchemaEntry,
};
use crate::infra::codec::numbers::Resolution;
use crate::protocol::schema::catalog::{Catalog, RawField, RawMessage};
use crate::protocol::schema::naming::{to_camel_case, upper_first};
use crate::protocol::schema::proprietary;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

const DEFAULT_BIT_LENGTH: u32 = 8;

//==================================================================================FIELDS
/// Declared width: `bitLength`, else `byteLength * 8`, else one byte.
fn declared_bits(raw: &RawField) -> u32 {
    raw.bit_length
        .or(raw.byte_length.map(|bytes| bytes * 8))
        .unwrap_or(DEFAULT_BIT_LENGTH)
}

/// Repaired `(id, name)` pair.
fn id_and_name(raw: &RawField) -> (String, String) {
    let id = raw.id.as_deref().filter(|id| !id.is_empty());
    let name = raw.name.as_deref().filter(|name| !name.is_empty());
    match (id, name) {
        (Some(id), Some(name)) => (id.to_string(), upper_first(name)),
        (Some(id), None) => (id.to_string(), upper_first(id)),
        (None, Some(name)) => (to_camel_case(name), upper_first(name)),
        (None, None) => ("unknown".to_string(), "Unknown".to_string()),
    }
}

fn classify(raw: &RawField, id: &str, resolution: Resolution) -> FieldKind {
    let label = raw
        .field_type
        .as_deref()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    let lookup = || {
        let table: EnumTable = raw
            .enum_values
            .iter()
            .flatten()
            .filter_map(|entry| entry.entry())
            .collect();
        FieldKind::Lookup(Arc::new(table))
    };
    match label.as_str() {
        "ascii or unicode string starting with length and control byte" | "string_lau" => {
            FieldKind::VariableLengthText {
                length_prefixed: true,
                control_byte: true,
            }
        }
        "ascii string starting with length byte" | "string_lz" => FieldKind::VariableLengthText {
            length_prefixed: true,
            control_byte: false,
        },
        "string with start/stop byte" => FieldKind::VariableLengthText {
            length_prefixed: false,
            control_byte: false,
        },
        "ascii text" | "string_fix" => FieldKind::FixedText,
        "manufacturer code" => FieldKind::ManufacturerCode,
        "binary data" | "binary" | "reserved" | "spare" => FieldKind::BinaryBlob,
        _ if id == "manufacturerCode" && raw.enum_values.is_none() => FieldKind::ManufacturerCode,
        "lookup table" | "lookup" | "bitlookup" | "indirect_lookup" => lookup(),
        _ if raw.enum_values.is_some() => lookup(),
        _ if !resolution.is_one() => FieldKind::ScaledDecimal,
        _ => FieldKind::Integer,
    }
}

fn json_to_value(value: &serde_json::Value) -> Option<FieldValue> {
    match value {
        serde_json::Value::Null => Some(FieldValue::Null),
        serde_json::Value::Bool(flag) => Some(FieldValue::U64(*flag as u64)),
        serde_json::Value::Number(number) => number
            .as_u64()
            .map(FieldValue::U64)
            .or_else(|| number.as_i64().map(FieldValue::I64))
            .or_else(|| number.as_f64().map(FieldValue::F64)),
        serde_json::Value::String(text) => Some(FieldValue::Text(text.clone())),
        _ => None,
    }
}

/// Normalize one field placed at `bit_offset`. `id` is already unique.
fn normalize_field(raw: &RawField, id: String, name: String, bit_offset: u32) -> FieldSchema {
    let bit_length = declared_bits(raw);
    let resolution = raw
        .resolution
        .as_ref()
        .and_then(|value| Resolution::parse(&value.literal()))
        .unwrap_or(Resolution::ONE);
    let kind = classify(raw, &id, resolution);
    let is_reserved = id.starts_with("reserved")
        || raw
            .field_type
            .as_deref()
            .is_some_and(|label| label.eq_ignore_ascii_case("reserved"));
    let default = match raw.default.as_ref() {
        Some(value) => json_to_value(value),
        None if is_reserved => Some(FieldValue::Null),
        None => None,
    };
    FieldSchema {
        is_differentiator: DIFFERENTIATOR_IDS.contains(&id.as_str()),
        match_value: raw.match_value.as_ref().and_then(|value| value.as_i64()),
        id,
        name,
        description: raw.description.clone(),
        unit: raw.unit.clone(),
        kind,
        bit_length,
        bit_offset,
        byte_length: (bit_length % 8 == 0).then_some(bit_length / 8),
        signed: raw.signed.unwrap_or(false),
        resolution,
        default,
    }
}

/// Normalize every field of a message, in order.
///
/// The first occurrence of an id keeps it; later duplicates become
/// `id1`, `id2`, ... skipping any suffix already taken.
pub fn normalize_fields(raw_fields: &[RawField]) -> Vec<FieldSchema> {
    let mut used: HashSet<String> = HashSet::new();
    let mut counters: HashMap<String, u32> = HashMap::new();
    let mut bit_offset = 0;

    raw_fields
        .iter()
        .map(|raw| {
            let (mut id, name) = id_and_name(raw);
            if used.contains(&id) {
                let counter = counters.entry(id.clone()).or_insert(1);
                let mut candidate = format!("{id}{counter}");
                while used.contains(&candidate) {
                    *counter += 1;
                    candidate = format!("{id}{counter}");
                }
                *counter += 1;
                id = candidate;
            }
            used.insert(id.clone());
            let field = normalize_field(raw, id, name, bit_offset);
            bit_offset += field.bit_length;
            field
        })
        .collect()
}

//==================================================================================MESSAGES
/// Frame mode when the catalog does not state it.
fn infer_single_frame(
    pgn: u32,
    byte_length: usize,
    repeating_fields: u32,
    is_variable_length: bool,
    is_proprietary: bool,
) -> bool {
    let fits = byte_length <= 8;
    proprietary::is_proprietary_single(pgn)
        || (fits && repeating_fields == 0 && !is_variable_length && !is_proprietary)
        || (fits && repeating_fields > 0 && pgn < 0xFFFF)
}

/// Normalize one message definition.
pub fn normalize_message(raw: &RawMessage, config: &CodecConfig) -> MessageSchema {
    let fields = normalize_fields(&raw.fields);
    let total_bits: u32 = fields.iter().map(|field| field.bit_length).sum();
    let byte_length = total_bits.div_ceil(8) as usize;
    let is_variable_length = fields.iter().any(|field| field.kind.is_variable());
    let is_proprietary = proprietary::is_proprietary(raw.pgn);

    let is_single_frame = match raw.declared_single_frame() {
        Some(single) => single,
        None => infer_single_frame(
            raw.pgn,
            byte_length,
            raw.repeating_fields,
            is_variable_length,
            is_proprietary,
        ),
    };

    let category = raw
        .category
        .clone()
        .or_else(|| is_proprietary.then(|| "Proprietary".to_string()));
    let priority = raw
        .priority
        .unwrap_or_else(|| config.priority_for(category.as_deref()));

    let label = raw.name.as_deref().or(raw.description.as_deref());
    let id = raw
        .id
        .clone()
        .filter(|id| !id.is_empty())
        .or_else(|| label.map(to_camel_case).filter(|id| !id.is_empty()))
        .unwrap_or_else(|| format!("pgn{}", raw.pgn));
    let name = label.map(str::to_string).unwrap_or_else(|| id.clone());
    let description = raw.description.clone().unwrap_or_else(|| name.clone());

    let match_fields = fields
        .iter()
        .enumerate()
        .filter_map(|(index, field)| {
            field
                .match_value
                .map(|expected| MatchField { index, expected })
        })
        .collect();

    MessageSchema {
        pgn: raw.pgn,
        id,
        name,
        description,
        category,
        fields,
        byte_length,
        is_variable_length,
        is_single_frame,
        is_proprietary,
        priority,
        repeating_fields: raw.repeating_fields,
        match_fields,
    }
}

//==================================================================================ENTRIES
/// Build the entry of one PGN from its variants, in catalog order.
pub fn build_entry(pgn: u32, variants: Vec<MessageSchema>, config: &CodecConfig) -> SchemaEntry {
    let needs_group = variants.len() > 1 || variants.iter().any(|v| !v.match_fields.is_empty());
    let mut variants: Vec<Arc<MessageSchema>> = variants.into_iter().map(Arc::new).collect();
    if !needs_group {
        if let Some(schema) = variants.pop() {
            return SchemaEntry::Single(schema);
        }
    }
    let fallback = Arc::new(proprietary::fallback_for(pgn, config.default_priority));
    let is_single_frame = variants
        .first()
        .map_or(fallback.is_single_frame, |first| first.is_single_frame);
    debug!(pgn, options = variants.len(), "Option group built");
    SchemaEntry::Options(OptionGroup {
        pgn,
        is_single_frame,
        options: variants,
        fallback,
    })
}

/// Normalize a whole catalog, grouping variants by PGN.
pub fn normalize(catalog: &Catalog, config: &CodecConfig) -> Vec<SchemaEntry> {
    let mut order: Vec<u32> = Vec::new();
    let mut groups: HashMap<u32, Vec<MessageSchema>> = HashMap::new();

    for raw in &catalog.messages {
        if raw.pgn == 0 {
            warn!(id = ?raw.id, "Skipping catalog entry without PGN");
            continue;
        }
        let schema = normalize_message(raw, config);
        groups
            .entry(raw.pgn)
            .or_insert_with(|| {
                order.push(raw.pgn);
                Vec::new()
            })
            .push(schema);
    }

    order
        .into_iter()
        .filter_map(|pgn| groups.remove(&pgn).map(|variants| (pgn, variants)))
        .map(|(pgn, variants)| build_entry(pgn, variants, config))
        .collect()
}
