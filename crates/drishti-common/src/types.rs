//! Common types used throughout Drishti.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Vector type alias
pub type Vector = Vec<f32>;

/// Result modality: which partition a search hit came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    /// Hit from the text partition
    Text,
    /// Hit from the image partition
    Image,
}

/// A crawled article handed to the ingestion pipeline.
///
/// Optional fields are explicit: a document with no images carries an empty
/// vector, one with no extra metadata an empty map. Title and body are
/// required; a document where either is empty is rejected before embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Article title
    pub title: String,
    /// Article body text
    pub body: String,
    /// URL the article was crawled from
    #[serde(default)]
    pub source_url: String,
    /// Image references (local paths) linked from the article, in order
    #[serde(default)]
    pub images: Vec<String>,
    /// Arbitrary crawler-supplied metadata
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Document {
    /// Create a document with just the required fields.
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            source_url: String::new(),
            images: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    /// Whether the required fields are present and non-empty.
    pub fn has_required_fields(&self) -> bool {
        !self.title.trim().is_empty() && !self.body.trim().is_empty()
    }
}

/// Raw nearest-neighbor hit returned by a vector partition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryHit {
    /// Record ID within the partition
    pub id: String,
    /// Cosine distance to the query vector, in [0, 2]
    pub distance: f32,
    /// Flattened scalar metadata stored with the record
    pub metadata: HashMap<String, serde_json::Value>,
    /// Stored document text (or image label)
    pub document: String,
}

/// Ranked search result produced by the query engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Which partition the result came from
    pub modality: Modality,
    /// `1 - cosine_distance`; not clamped
    pub similarity: f32,
    /// Document text for text hits, a short label for image hits
    pub content: String,
    /// Metadata stored with the record
    pub metadata: HashMap<String, serde_json::Value>,
    /// Image references attached to the parent document (text hits only)
    pub image_refs: Vec<String>,
}

/// Partition counts reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStats {
    /// Sum of both partition counts
    pub total_documents: usize,
    /// Records in the text partition
    pub text_documents: usize,
    /// Records in the image partition
    pub image_documents: usize,
}

/// Per-run outcome of an ingestion pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    /// Documents that produced a text record
    pub documents_indexed: usize,
    /// Documents dropped (missing fields or text embedding failure)
    pub documents_skipped: usize,
    /// Images that produced an image record
    pub images_indexed: usize,
    /// Images dropped (unreadable, embedding failure, or degraded encoder)
    pub images_skipped: usize,
}
