//! Configuration types for Drishti.

use crate::{DrishtiError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Engine configuration: storage location and encoder model selection.
///
/// Model identifiers:
/// - `hashing` or `hashing:<dim>` — deterministic local hashing encoder
/// - `ollama:<model>` — text embeddings via an Ollama server
/// - `http(s)://...` (cross-modal only) — a CLIP-style embedding gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Storage root for partition snapshots
    pub persist_directory: PathBuf,
    /// Prefix for partition names under the storage root
    pub collection_name: String,
    /// Identifier for the text encoder
    pub text_embedding_model: String,
    /// Identifier for the optional cross-modal encoder; `None` disables
    /// image indexing and image search entirely
    pub cross_modal_model: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            persist_directory: PathBuf::from("./drishti_db"),
            collection_name: "articles".to_string(),
            text_embedding_model: "hashing:384".to_string(),
            cross_modal_model: Some("hashing:512".to_string()),
        }
    }
}

impl EngineConfig {
    /// Validate the configuration.
    ///
    /// # Returns
    ///
    /// Returns `Ok(())` if valid, otherwise returns an error.
    pub fn validate(&self) -> Result<()> {
        if self.collection_name.trim().is_empty() {
            return Err(DrishtiError::Config(
                "Collection name cannot be empty".to_string(),
            ));
        }

        if self.persist_directory.as_os_str().is_empty() {
            return Err(DrishtiError::Config(
                "Persist directory cannot be empty".to_string(),
            ));
        }

        if self.text_embedding_model.trim().is_empty() {
            return Err(DrishtiError::Config(
                "Text embedding model cannot be empty".to_string(),
            ));
        }

        if let Some(model) = &self.cross_modal_model {
            if model.trim().is_empty() {
                return Err(DrishtiError::Config(
                    "Cross-modal model cannot be empty (use None to disable)".to_string(),
                ));
            }
        }

        Ok(())
    }
}
