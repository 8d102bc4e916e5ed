//! Constants and runtime configuration of the codec.
use crate::error::CatalogError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

//==================================================================================CONF
/// Environment variable naming the catalog loaded by `SchemaRegistry::from_env`.
pub const CATALOG_PATH_ENV: &str = "KORRI_CATALOG_PATH";
/// CAN priority used when an identifier is built without one.
pub const DEFAULT_CAN_PRIORITY: u8 = 6;
/// Message priority when neither the catalog nor the category table provides one.
pub const DEFAULT_MESSAGE_PRIORITY: u8 = 7;
/// First Fast Packet sequence identifier handed out by an `Encoder`.
pub const DEFAULT_SEQUENCE_ID: u8 = 5;
/// Broadcast destination address.
pub const GLOBAL_ADDRESS: u8 = 0xFF;
/// Payload bytes of a classic CAN frame.
pub const CAN_FRAME_PAYLOAD: usize = 8;
/// Field ids that contribute to a message's identity.
pub const DIFFERENTIATOR_IDS: &[&str] = &["source", "instance", "pgn"];
/// Priority inferred from a message category.
pub const CATEGORY_PRIORITIES: &[(&str, u8)] = &[
    ("Steering", 2),
    ("Propulsion", 2),
    ("Navigation", 2),
    ("Power", 3),
    ("AIS", 4),
    ("Environmental", 5),
    ("General & or Mandatory", 6),
];

//==================================================================================CODEC_CONFIG
/// Tunables read from a JSON document. Every key is optional.
///
/// ```json
/// { "defaultPriority": 7, "firstSequenceId": 5, "categoryPriorities": { "AIS": 3 } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CodecConfig {
    /// Message priority fallback.
    pub default_priority: u8,
    /// Sequence id of the first Fast Packet message an encoder emits.
    pub first_sequence_id: u8,
    /// Overrides and additions to `CATEGORY_PRIORITIES`.
    pub category_priorities: BTreeMap<String, u8>,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            default_priority: DEFAULT_MESSAGE_PRIORITY,
            first_sequence_id: DEFAULT_SEQUENCE_ID,
            category_priorities: BTreeMap::new(),
        }
    }
}

impl CodecConfig {
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

    /// Priority for a message of `category`, falling back to `default_priority`.
    pub fn priority_for(&self, category: Option<&str>) -> u8 {
        let Some(category) = category else {
            return self.default_priority;
        };
        self.category_priorities
            .get(category)
            .copied()
            .or_else(|| {
                CATEGORY_PRIORITIES
                    .iter()
                    .find(|(name, _)| *name == category)
                    .map(|(_, priority)| *priority)
            })
            .unwrap_or(self.default_priority)
    }
}

/// Catalog path advertised through `CATALOG_PATH_ENV`, if any.
pub fn catalog_path_from_env() -> Option<PathBuf> {
    std::env::var_os(CATALOG_PATH_ENV).map(PathBuf::from)
}
