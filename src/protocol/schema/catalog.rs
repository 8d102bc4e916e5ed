//! Raw catalog structures, deserialized as-is before normalization.
//!
//! Both the camelCase layout (`pgn`, `bitLength`, `type`) and the CANboat
//! PascalCase layout (`PGN`, `BitLength`, `FieldType`) are accepted.
use crate::error::CatalogError;
use serde::Deserialize;
use std::path::Path;

//==================================================================================CATALOG
/// A list of raw message definitions, possibly several per PGN.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub messages: Vec<RawMessage>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    Wrapped {
        #[serde(alias = "PGNs", alias = "pgns")]
        messages: Vec<RawMessage>,
    },
    Bare(Vec<RawMessage>),
}

impl<'de> Deserialize<'de> for Catalog {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let messages = match CatalogDocument::deserialize(deserializer)? {
            CatalogDocument::Wrapped { messages } | CatalogDocument::Bare(messages) => messages,
        };
        Ok(Self { messages })
    }
}

impl Catalog {
    pub fn from_json(document: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(document)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let document = std::fs::read_to_string(path).map_err(|source| CatalogError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&document)
    }
}

//==================================================================================RAW_MESSAGE
/// One message definition.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawMessage {
    #[serde(alias = "PGN")]
    pub pgn: u32,
    #[serde(alias = "Id")]
    pub id: Option<String>,
    #[serde(alias = "Name")]
    pub name: Option<String>,
    #[serde(alias = "Description")]
    pub description: Option<String>,
    #[serde(alias = "Category")]
    pub category: Option<String>,
    #[serde(alias = "Priority")]
    pub priority: Option<u8>,
    #[serde(alias = "Complete")]
    pub complete: bool,
    #[serde(alias = "SingleFrame")]
    pub single_frame: Option<bool>,
    /// CANboat transport type: `Single`, `Fast` or `ISO`.
    #[serde(rename = "Type", alias = "transport")]
    pub transport: Option<String>,
    #[serde(alias = "RepeatingFields", alias = "RepeatingFieldSet1Size")]
    pub repeating_fields: u32,
    #[serde(alias = "Fields")]
    pub fields: Vec<RawField>,
}

impl RawMessage {
    /// Frame mode stated by the catalog, if it states one.
    pub fn declared_single_frame(&self) -> Option<bool> {
        if let Some(transport) = &self.transport {
            return Some(transport.eq_ignore_ascii_case("single"));
        }
        if self.complete {
            self.single_frame
        } else {
            None
        }
    }
}

//==================================================================================RAW_FIELD
/// One field definition.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawField {
    #[serde(alias = "Id")]
    pub id: Option<String>,
    #[serde(alias = "Name")]
    pub name: Option<String>,
    #[serde(alias = "Description")]
    pub description: Option<String>,
    #[serde(alias = "BitLength")]
    pub bit_length: Option<u32>,
    #[serde(alias = "ByteLength")]
    pub byte_length: Option<u32>,
    #[serde(alias = "Signed")]
    pub signed: Option<bool>,
    #[serde(alias = "Resolution")]
    pub resolution: Option<RawNumber>,
    /// Legacy type label ("Lookup table") or CANboat `FieldType` ("LOOKUP").
    #[serde(rename = "type", alias = "Type", alias = "FieldType")]
    pub field_type: Option<String>,
    #[serde(alias = "Units", alias = "Unit", alias = "units")]
    pub unit: Option<String>,
    #[serde(rename = "match", alias = "Match")]
    pub match_value: Option<RawNumber>,
    #[serde(alias = "EnumValues")]
    pub enum_values: Option<Vec<RawEnumValue>>,
    #[serde(alias = "Default")]
    pub default: Option<serde_json::Value>,
}

/// JSON number or numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(f64),
    Text(String),
}

impl RawNumber {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawNumber::Number(value) => Some(*value),
            RawNumber::Text(text) => text.trim().parse().ok(),
        }
    }

    /// Integral value, `None` for fractions.
    pub fn as_i64(&self) -> Option<i64> {
        self.as_f64()
            .filter(|value| value.fract() == 0.0 && value.abs() < 9.0e15)
            .map(|value| value as i64)
    }

    /// Decimal literal as written (strings) or in shortest form (numbers).
    pub fn literal(&self) -> String {
        match self {
            RawNumber::Number(value) => format!("{value}"),
            RawNumber::Text(text) => text.trim().to_string(),
        }
    }
}

/// Lookup entry: `{ "name": .., "value": .. }` or a `[value, name]` pair.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawEnumValue {
    Named {
        #[serde(alias = "Name")]
        name: String,
        #[serde(alias = "Value")]
        value: RawNumber,
    },
    Pair(RawNumber, String),
}

impl RawEnumValue {
    pub fn entry(&self) -> Option<(u64, String)> {
        let (value, name) = match self {
            RawEnumValue::Named { name, value } | RawEnumValue::Pair(value, name) => (value, name),
        };
        value
            .as_i64()
            .and_then(|value| u64::try_from(value).ok())
            .map(|value| (value, name.clone()))
    }
}
