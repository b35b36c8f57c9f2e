//! Core API for the Drishti multimodal search engine.
//!
//! Provides the `IngestionPipeline`, `QueryEngine` and the
//! `MultimodalEngine` facade consumed by serving collaborators.

pub mod engine;
pub mod pipeline;
pub mod query;

pub use engine::MultimodalEngine;
pub use pipeline::IngestionPipeline;
pub use query::QueryEngine;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::engine::MultimodalEngine;
    pub use crate::pipeline::IngestionPipeline;
    pub use crate::query::QueryEngine;
    pub use drishti_common::{
        Document, DrishtiError, EngineConfig, EngineStats, IngestReport, Modality, Result,
        SearchResult,
    };
}
