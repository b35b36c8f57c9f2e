//! The embedding bridge: one text encoder plus an optional cross-modal
//! encoder behind a single provider surface.

use crate::providers;
use drishti_common::{
    CrossModalEncoder, DrishtiError, EngineConfig, Result, TextEncoder, Vector,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Embedding provider for the engine.
///
/// The text encoder is always present. The cross-modal encoder is optional:
/// if it fails to initialize, the bridge degrades (`cross_modal_available()
/// == false`) and downstream components branch on that flag instead of
/// assuming presence.
pub struct EmbeddingBridge {
    text: Arc<dyn TextEncoder>,
    cross_modal: Option<Arc<dyn CrossModalEncoder>>,
}

impl std::fmt::Debug for EmbeddingBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingBridge")
            .field("text", &self.text.name())
            .field(
                "cross_modal",
                &self.cross_modal.as_ref().map(|e| e.name()),
            )
            .finish()
    }
}

impl EmbeddingBridge {
    /// Create a bridge from already-constructed encoders.
    pub fn new(
        text: Arc<dyn TextEncoder>,
        cross_modal: Option<Arc<dyn CrossModalEncoder>>,
    ) -> Self {
        Self { text, cross_modal }
    }

    /// Build a bridge from engine configuration.
    ///
    /// A text-encoder failure is fatal; a cross-modal failure is logged and
    /// the bridge starts in degraded (text-only) mode.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let text = providers::text_encoder_from_model(&config.text_embedding_model)?;

        let cross_modal = match &config.cross_modal_model {
            Some(model) => match providers::cross_modal_encoder_from_model(model) {
                Ok(encoder) => {
                    info!(
                        model = %model,
                        dimension = encoder.dimension(),
                        "cross-modal encoder initialized"
                    );
                    Some(encoder)
                }
                Err(e) => {
                    warn!(
                        model = %model,
                        error = %e,
                        "failed to load cross-modal encoder, image search disabled"
                    );
                    None
                }
            },
            None => None,
        };

        Ok(Self::new(text, cross_modal))
    }

    /// Embed a single text into the text space.
    pub async fn embed_text(&self, text: &str) -> Result<Vector> {
        let mut vectors = self.text.embed(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| DrishtiError::Embedding("Text encoder returned no vector".to_string()))
    }

    /// Embed a batch of texts into the text space.
    pub async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>> {
        self.text.embed(texts).await
    }

    /// Dimension of the text partition's vectors.
    pub fn text_dimension(&self) -> usize {
        self.text.dimension()
    }

    /// Dimension of the image partition's vectors, if the cross-modal
    /// encoder is available.
    pub fn image_dimension(&self) -> Option<usize> {
        self.cross_modal.as_ref().map(|e| e.dimension())
    }

    /// Whether image embedding and image-space queries are possible.
    pub fn cross_modal_available(&self) -> bool {
        self.cross_modal.is_some()
    }

    /// Embed image bytes into the shared image space, unit-normalized.
    pub async fn embed_image(&self, bytes: &[u8]) -> Result<Vector> {
        let encoder = self.cross_modal.as_ref().ok_or_else(|| {
            DrishtiError::Embedding("Cross-modal encoder unavailable".to_string())
        })?;
        let vector = encoder.embed_image(bytes).await?;
        Ok(unit_normalize(vector))
    }

    /// Embed a text query into the shared image space, unit-normalized,
    /// so it can be compared against image vectors.
    pub async fn embed_query_for_image_space(&self, query: &str) -> Result<Vector> {
        let encoder = self.cross_modal.as_ref().ok_or_else(|| {
            DrishtiError::Embedding("Cross-modal encoder unavailable".to_string())
        })?;
        let vector = encoder.embed_text(query).await?;
        Ok(unit_normalize(vector))
    }
}

fn unit_normalize(mut vector: Vector) -> Vector {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
    vector
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{HashingCrossModalEncoder, HashingTextEncoder};

    fn full_bridge() -> EmbeddingBridge {
        EmbeddingBridge::new(
            Arc::new(HashingTextEncoder::new(64)),
            Some(Arc::new(HashingCrossModalEncoder::new(32))),
        )
    }

    fn degraded_bridge() -> EmbeddingBridge {
        EmbeddingBridge::new(Arc::new(HashingTextEncoder::new(64)), None)
    }

    #[tokio::test]
    async fn test_embed_text() {
        let bridge = full_bridge();
        let vector = bridge.embed_text("hello world").await.unwrap();
        assert_eq!(vector.len(), 64);
        assert_eq!(bridge.text_dimension(), 64);
    }

    #[tokio::test]
    async fn test_cross_modal_available() {
        assert!(full_bridge().cross_modal_available());
        assert!(!degraded_bridge().cross_modal_available());
    }

    #[tokio::test]
    async fn test_image_dimension() {
        assert_eq!(full_bridge().image_dimension(), Some(32));
        assert_eq!(degraded_bridge().image_dimension(), None);
    }

    #[tokio::test]
    async fn test_embed_image_normalized() {
        let bridge = full_bridge();
        let vector = bridge.embed_image(&[1, 2, 3, 4, 5, 6, 7, 8]).await.unwrap();
        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_embed_image_degraded_fails() {
        let bridge = degraded_bridge();
        let result = bridge.embed_image(&[1, 2, 3]).await;
        assert!(matches!(result.unwrap_err(), DrishtiError::Embedding(_)));
    }

    #[tokio::test]
    async fn test_embed_query_for_image_space() {
        let bridge = full_bridge();
        let vector = bridge
            .embed_query_for_image_space("a red car")
            .await
            .unwrap();
        assert_eq!(vector.len(), 32);

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_from_config_degrades_on_bad_cross_modal() {
        let config = EngineConfig {
            cross_modal_model: Some("no-such-model".to_string()),
            ..Default::default()
        };
        let bridge = EmbeddingBridge::from_config(&config).unwrap();
        assert!(!bridge.cross_modal_available());
    }

    #[tokio::test]
    async fn test_from_config_bad_text_model_is_fatal() {
        let config = EngineConfig {
            text_embedding_model: "no-such-model".to_string(),
            ..Default::default()
        };
        assert!(EmbeddingBridge::from_config(&config).is_err());
    }

    #[tokio::test]
    async fn test_from_config_default() {
        let bridge = EmbeddingBridge::from_config(&EngineConfig::default()).unwrap();
        assert_eq!(bridge.text_dimension(), 384);
        assert_eq!(bridge.image_dimension(), Some(512));
    }

    #[test]
    fn test_unit_normalize_zero_vector() {
        let vector = unit_normalize(vec![0.0, 0.0, 0.0]);
        assert_eq!(vector, vec![0.0, 0.0, 0.0]);
    }
}
