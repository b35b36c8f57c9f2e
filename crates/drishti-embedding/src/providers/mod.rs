//! Encoder implementations and model-identifier resolution.

pub mod hashing;
pub mod remote;

pub use hashing::{HashingCrossModalEncoder, HashingTextEncoder};
pub use remote::{
    ClipGatewayConfig, ClipGatewayEncoder, OllamaConfig, OllamaTextEncoder,
};

use drishti_common::{CrossModalEncoder, DrishtiError, Result, TextEncoder};
use std::sync::Arc;

const DEFAULT_TEXT_DIMENSION: usize = 384;
const DEFAULT_IMAGE_DIMENSION: usize = 512;

/// Resolve a text encoder from a model identifier.
///
/// Recognized forms: `hashing`, `hashing:<dim>`, `ollama:<model>`.
pub fn text_encoder_from_model(model: &str) -> Result<Arc<dyn TextEncoder>> {
    match model.split_once(':') {
        None if model == "hashing" => {
            Ok(Arc::new(HashingTextEncoder::new(DEFAULT_TEXT_DIMENSION)))
        }
        Some(("hashing", dim)) => {
            let dimension = parse_dimension(dim)?;
            Ok(Arc::new(HashingTextEncoder::new(dimension)))
        }
        Some(("ollama", name)) => {
            let config = OllamaConfig {
                model: name.to_string(),
                ..Default::default()
            };
            Ok(Arc::new(OllamaTextEncoder::new(config)?))
        }
        _ => Err(DrishtiError::Config(format!(
            "Unknown text embedding model: '{}'",
            model
        ))),
    }
}

/// Resolve a cross-modal encoder from a model identifier.
///
/// Recognized forms: `hashing`, `hashing:<dim>`, or an `http(s)://` URL of
/// a CLIP-style embedding gateway. Failures here are model-load errors:
/// callers are expected to degrade rather than abort.
pub fn cross_modal_encoder_from_model(model: &str) -> Result<Arc<dyn CrossModalEncoder>> {
    if model == "hashing" {
        return Ok(Arc::new(HashingCrossModalEncoder::new(
            DEFAULT_IMAGE_DIMENSION,
        )));
    }
    if let Some(dim) = model.strip_prefix("hashing:") {
        let dimension = parse_dimension(dim)?;
        return Ok(Arc::new(HashingCrossModalEncoder::new(dimension)));
    }
    if model.starts_with("http://") || model.starts_with("https://") {
        let config = ClipGatewayConfig {
            base_url: model.trim_end_matches('/').to_string(),
            ..Default::default()
        };
        return Ok(Arc::new(ClipGatewayEncoder::new(config)?));
    }
    Err(DrishtiError::ModelLoad(format!(
        "Unknown cross-modal model: '{}'",
        model
    )))
}

fn parse_dimension(raw: &str) -> Result<usize> {
    let dimension: usize = raw
        .parse()
        .map_err(|_| DrishtiError::Config(format!("Invalid embedding dimension: '{}'", raw)))?;
    if dimension == 0 {
        return Err(DrishtiError::Config(
            "Embedding dimension must be greater than 0".to_string(),
        ));
    }
    Ok(dimension)
}
