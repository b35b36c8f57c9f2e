//! Error types for Drishti.

/// Main error type for Drishti operations.
#[derive(Debug, thiserror::Error)]
pub enum DrishtiError {
    /// An optional model (cross-modal encoder) failed to initialize
    #[error("Model load error: {0}")]
    ModelLoad(String),

    /// Malformed input item or mismatched batch shape
    #[error("Validation error: {0}")]
    Validation(String),

    /// A single text or image failed to embed
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// A batch write to a vector partition failed
    #[error("Store write error: {0}")]
    StoreWrite(String),

    /// A nearest-neighbor query against a partition failed
    #[error("Store query error: {0}")]
    StoreQuery(String),

    /// Storage/IO error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<String> for DrishtiError {
    fn from(s: String) -> Self {
        DrishtiError::InvalidInput(s)
    }
}

impl From<&str> for DrishtiError {
    fn from(s: &str) -> Self {
        DrishtiError::InvalidInput(s.to_string())
    }
}

/// Result type alias using DrishtiError.
pub type Result<T> = std::result::Result<T, DrishtiError>;
