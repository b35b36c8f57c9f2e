//! Encoder traits for Drishti components.

use crate::{Result, Vector};
use async_trait::async_trait;

/// Text encoder trait for embedding documents and queries.
///
/// Implementations must be deterministic: the same input string always
/// produces the same vector, with a fixed dimension for the encoder's
/// lifetime.
#[async_trait]
pub trait TextEncoder: Send + Sync {
    /// Embed a batch of texts into vectors
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vector>>;

    /// Get embedding dimension
    fn dimension(&self) -> usize;

    /// Get encoder name
    fn name(&self) -> &str;
}

/// Cross-modal encoder trait: embeds images and text queries into one
/// shared vector space so a text query can retrieve image results.
#[async_trait]
pub trait CrossModalEncoder: Send + Sync {
    /// Embed raw image bytes into the shared space.
    ///
    /// Fails with an embedding error for unreadable or corrupt image data.
    async fn embed_image(&self, bytes: &[u8]) -> Result<Vector>;

    /// Embed a text query into the shared image space.
    async fn embed_text(&self, text: &str) -> Result<Vector>;

    /// Get embedding dimension of the shared space
    fn dimension(&self) -> usize;

    /// Get encoder name
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockTextEncoder {
        dimension: usize,
    }

    #[async_trait]
    impl TextEncoder for MockTextEncoder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vector>> {
            Ok(texts.iter().map(|_| vec![0.0; self.dimension]).collect())
        }

        fn dimension(&self) -> usize {
            self.dimension
        }

        fn name(&self) -> &str {
            "mock-text"
        }
    }

    struct MockCrossModalEncoder {
        dimension: usize,
    }

    #[async_trait]
    impl CrossModalEncoder for MockCrossModalEncoder {
        async fn embed_image(&self, bytes: &[u8]) -> Result<Vector> {
            if bytes.is_empty() {
                return Err(crate::DrishtiError::Embedding(
                    "empty image payload".to_string(),
                ));
            }
            Ok(vec![1.0; self.dimension])
        }

        async fn embed_text(&self, _text: &str) -> Result<Vector> {
            Ok(vec![0.5; self.dimension])
        }

        fn dimension(&self) -> usize {
            self.dimension
        }

        fn name(&self) -> &str {
            "mock-cross-modal"
        }
    }

    #[tokio::test]
    async fn test_mock_text_encoder() {
        let encoder = MockTextEncoder { dimension: 384 };

        assert_eq!(encoder.name(), "mock-text");
        assert_eq!(encoder.dimension(), 384);

        let texts = vec!["hello".to_string(), "world".to_string()];
        let embeddings = encoder.embed(&texts).await.unwrap();

        assert_eq!(embeddings.len(), 2);
        assert_eq!(embeddings[0].len(), 384);
    }

    #[tokio::test]
    async fn test_mock_cross_modal_encoder() {
        let encoder = MockCrossModalEncoder { dimension: 512 };

        assert_eq!(encoder.name(), "mock-cross-modal");
        assert_eq!(encoder.dimension(), 512);

        let image_vec = encoder.embed_image(&[1, 2, 3]).await.unwrap();
        assert_eq!(image_vec.len(), 512);

        let text_vec = encoder.embed_text("a red car").await.unwrap();
        assert_eq!(text_vec.len(), 512);
    }

    #[tokio::test]
    async fn test_mock_cross_modal_rejects_empty_image() {
        let encoder = MockCrossModalEncoder { dimension: 512 };
        let result = encoder.embed_image(&[]).await;
        assert!(result.is_err());
    }
}
