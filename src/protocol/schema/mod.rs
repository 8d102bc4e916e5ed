//! Message schemas: raw catalog loading, normalization and the immutable
//! registry queried by the parser and the encoder.
pub mod catalog;
mod naming;
pub mod normalizer;
pub mod proprietary;

use crate::conf::{catalog_path_from_env, CodecConfig, CATALOG_PATH_ENV};
use crate::core::{MessageSchema, SchemaEntry};
use crate::error::CatalogError;
use catalog::Catalog;
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

//==================================================================================REGISTRY
/// Read-only PGN to schema table, built once from a catalog and shared
/// (behind an `Arc`) by any number of parsers and encoders.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    entries: HashMap<u32, SchemaEntry>,
    by_id: HashMap<String, Arc<MessageSchema>>,
    config: CodecConfig,
}

impl SchemaRegistry {
    /// Normalize `catalog` with the default configuration.
    pub fn new(catalog: &Catalog) -> Self {
        Self::with_config(catalog, CodecConfig::default())
    }

    pub fn with_config(catalog: &Catalog, config: CodecConfig) -> Self {
        let mut entries = HashMap::new();
        let mut by_id = HashMap::new();

        for entry in normalizer::normalize(catalog, &config) {
            let options = match &entry {
                SchemaEntry::Single(schema) => std::slice::from_ref(schema),
                SchemaEntry::Options(group) => group.options.as_slice(),
            };
            for schema in options {
                if by_id.contains_key(&schema.id) {
                    warn!(id = %schema.id, pgn = schema.pgn, "Duplicate message id, keeping the first");
                } else {
                    by_id.insert(schema.id.clone(), Arc::clone(schema));
                }
            }
            entries.insert(entry.pgn(), entry);
        }

        info!(pgns = entries.len(), messages = by_id.len(), "Schema registry ready");
        Self {
            entries,
            by_id,
            config,
        }
    }

    /// Parse a JSON catalog document.
    pub fn from_json(document: &str) -> Result<Self, CatalogError> {
        Self::from_json_with_config(document, CodecConfig::default())
    }

    pub fn from_json_with_config(document: &str, config: CodecConfig) -> Result<Self, CatalogError> {
        Ok(Self::with_config(&Catalog::from_json(document)?, config))
    }

    /// Load a JSON catalog file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        Self::from_path_with_config(path, CodecConfig::default())
    }

    pub fn from_path_with_config(
        path: impl AsRef<Path>,
        config: CodecConfig,
    ) -> Result<Self, CatalogError> {
        Ok(Self::with_config(&Catalog::from_path(path)?, config))
    }

    /// Load the catalog named by `KORRI_CATALOG_PATH`; an empty registry
    /// when the variable is unset.
    pub fn from_env() -> Result<Self, CatalogError> {
        Self::from_env_with_config(CodecConfig::default())
    }

    pub fn from_env_with_config(config: CodecConfig) -> Result<Self, CatalogError> {
        match catalog_path_from_env() {
            Some(path) => Self::from_path_with_config(path, config),
            None => {
                warn!(var = CATALOG_PATH_ENV, "No catalog configured, every PGN will be unknown");
                Ok(Self {
                    config,
                    ..Self::default()
                })
            }
        }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Entry for `pgn`, or the synthesized fallback (generic proprietary
    /// or not-found) when the catalog has none. Never fails.
    pub fn lookup(&self, pgn: u32) -> Cow<'_, SchemaEntry> {
        match self.entries.get(&pgn) {
            Some(entry) => Cow::Borrowed(entry),
            None => Cow::Owned(SchemaEntry::Single(Arc::new(proprietary::fallback_for(
                pgn,
                self.config.default_priority,
            )))),
        }
    }

    /// Catalog entry for `pgn`, without fallback.
    pub fn get(&self, pgn: u32) -> Option<&SchemaEntry> {
        self.entries.get(&pgn)
    }

    /// Schema carrying the catalog id `id`.
    pub fn find_by_id(&self, id: &str) -> Option<Arc<MessageSchema>> {
        self.by_id.get(id).cloned()
    }

    pub fn pgns(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
