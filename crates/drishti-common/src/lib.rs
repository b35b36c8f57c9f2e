//! Common types, errors, configuration and encoder traits shared across
//! the Drishti workspace.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::EngineConfig;
pub use error::{DrishtiError, Result};
pub use traits::{CrossModalEncoder, TextEncoder};
pub use types::{
    Document, EngineStats, IngestReport, Modality, QueryHit, SearchResult, Vector,
};
