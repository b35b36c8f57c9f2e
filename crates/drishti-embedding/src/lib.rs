//! Embedding computation layer for Drishti.
//!
//! Supports multiple encoder backends:
//! - Deterministic local hashing encoders (offline default)
//! - Ollama text embeddings
//! - CLIP-style HTTP gateways for cross-modal (image + text) embeddings

pub mod bridge;
pub mod providers;

pub use bridge::EmbeddingBridge;
pub use providers::*;
