//! Proprietary PGN ranges and the synthesized schemas used when the catalog
//! has nothing better to offer.
use crate::conf::DEFAULT_MESSAGE_PRIORITY;
use crate::core::{EnumTable, FieldKind, FieldSchema, FieldValue, MessageSchema};
use crate::infra::codec::numbers::Resolution;
use std::sync::Arc;

/// Catalog id of the generic proprietary schema.
pub const UNKNOWN_PROPRIETARY_ID: &str = "unknownProprietary";
/// Catalog id of the schema returned for PGNs missing from the catalog.
pub const NOT_FOUND_ID: &str = "notFound";

const INDUSTRY_CODES: [&str; 6] = [
    "Global",
    "Highway",
    "Agriculture",
    "Construction",
    "Marine",
    "Industrial",
];

//==================================================================================RANGES
/// Single-frame proprietary PGNs: 0xEF00 (addressed) and 0xFF00..=0xFFFF.
pub fn is_proprietary_single(pgn: u32) -> bool {
    pgn == 0xEF00 || (0xFF00..=0xFFFF).contains(&pgn)
}

/// Fast Packet proprietary PGNs: 0x1EF00 (addressed) and 0x1FF00..=0x1FFFF.
pub fn is_proprietary_multi(pgn: u32) -> bool {
    pgn == 0x1EF00 || (0x1FF00..=0x1FFFF).contains(&pgn)
}

pub fn is_proprietary(pgn: u32) -> bool {
    is_proprietary_single(pgn) || is_proprietary_multi(pgn)
}

//==================================================================================SCHEMAS
fn field(id: &str, name: &str, kind: FieldKind, bit_offset: u32, bit_length: u32) -> FieldSchema {
    FieldSchema {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        unit: None,
        kind,
        bit_length,
        bit_offset,
        byte_length: None,
        signed: false,
        resolution: Resolution::ONE,
        match_value: None,
        is_differentiator: false,
        default: None,
    }
}

/// Manufacturer code, two reserved bits and the industry group, the header
/// every proprietary message starts with.
pub fn generic_proprietary(pgn: u32) -> MessageSchema {
    let industry_table: EnumTable = INDUSTRY_CODES
        .iter()
        .enumerate()
        .map(|(code, name)| (code as u64, name.to_string()))
        .collect();
    let mut reserved = field("reserved", "Reserved", FieldKind::BinaryBlob, 11, 2);
    reserved.default = Some(FieldValue::Null);
    MessageSchema {
        pgn,
        id: UNKNOWN_PROPRIETARY_ID.to_string(),
        name: "Unknown Proprietary".to_string(),
        description: "Proprietary message without a catalog definition".to_string(),
        category: Some("Proprietary".to_string()),
        fields: vec![
            field(
                "manufacturerCode",
                "Manufacturer Code",
                FieldKind::ManufacturerCode,
                0,
                11,
            ),
            reserved,
            field(
                "industryCode",
                "Industry Code",
                FieldKind::Lookup(Arc::new(industry_table)),
                13,
                3,
            ),
        ],
        byte_length: 2,
        is_variable_length: false,
        is_single_frame: is_proprietary_single(pgn),
        is_proprietary: true,
        priority: DEFAULT_MESSAGE_PRIORITY,
        repeating_fields: 0,
        match_fields: Vec::new(),
    }
}

/// Field-less schema for a PGN absent from the catalog. The payload ends up
/// entirely in the trailing `unknownData` field.
pub fn not_found(pgn: u32, default_priority: u8) -> MessageSchema {
    MessageSchema {
        pgn,
        id: NOT_FOUND_ID.to_string(),
        name: "Unknown".to_string(),
        description: format!("PGN {pgn} is not in the catalog"),
        category: None,
        fields: Vec::new(),
        byte_length: 0,
        is_variable_length: false,
        is_single_frame: true,
        is_proprietary: false,
        priority: default_priority,
        repeating_fields: 0,
        match_fields: Vec::new(),
    }
}

/// Schema used when nothing in the catalog applies to `pgn`.
pub fn fallback_for(pgn: u32, default_priority: u8) -> MessageSchema {
    if is_proprietary(pgn) {
        generic_proprietary(pgn)
    } else {
        not_found(pgn, default_priority)
    }
}
