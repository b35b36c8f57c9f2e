//! Query engine: dual-partition fan-out and stable ranked merge.

use drishti_common::{DrishtiError, Modality, QueryHit, Result, SearchResult};
use drishti_embedding::EmbeddingBridge;
use drishti_store::{VectorStore, IMAGE_PARTITION, TEXT_PARTITION};
use std::sync::Arc;
use tracing::{debug, warn};

/// Embeds a query, searches both partitions, and merges the result sets
/// into one ranked list.
///
/// The text partition is mandatory: its failure is the search failure.
/// The image partition is best-effort: any failure there degrades the
/// response to text-only results.
pub struct QueryEngine {
    bridge: Arc<EmbeddingBridge>,
    store: Arc<VectorStore>,
}

impl QueryEngine {
    /// Create a query engine over the given bridge and store.
    pub fn new(bridge: Arc<EmbeddingBridge>, store: Arc<VectorStore>) -> Self {
        Self { bridge, store }
    }

    /// Search for the top `k` results.
    ///
    /// # Arguments
    ///
    /// * `query` - Natural-language query text
    /// * `k` - Desired result count, `k >= 1`
    /// * `include_images` - Whether to fan out to the image partition
    ///   (`k/2` image candidates); ignored when the cross-modal encoder is
    ///   unavailable
    pub async fn search(
        &self,
        query: &str,
        k: usize,
        include_images: bool,
    ) -> Result<Vec<SearchResult>> {
        if k == 0 {
            return Err(DrishtiError::Validation(
                "Result count k must be at least 1".to_string(),
            ));
        }

        let query_vector = self.bridge.embed_text(query).await?;
        let text_hits = self.store.query(TEXT_PARTITION, &query_vector, k)?;
        debug!(hits = text_hits.len(), "text partition searched");

        let text_results: Vec<SearchResult> =
            text_hits.into_iter().map(text_hit_to_result).collect();

        let image_results = if include_images && self.bridge.cross_modal_available() {
            match self.image_fan_out(query, k / 2).await {
                Ok(results) => results,
                Err(e) => {
                    warn!(error = %e, "image search failed, returning text-only results");
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        Ok(merge_ranked(text_results, image_results, k))
    }

    async fn image_fan_out(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let query_vector = self.bridge.embed_query_for_image_space(query).await?;
        let hits = self.store.query(IMAGE_PARTITION, &query_vector, k)?;
        debug!(hits = hits.len(), "image partition searched");

        Ok(hits.into_iter().map(image_hit_to_result).collect())
    }
}

/// Merge two individually-ordered result lists into one ranked list.
///
/// Concatenating text-then-image and stable-sorting by similarity
/// descending keeps the relative order of each source list and places
/// text items before image items of equal score, so the interleaving is
/// deterministic.
fn merge_ranked(
    text_results: Vec<SearchResult>,
    image_results: Vec<SearchResult>,
    k: usize,
) -> Vec<SearchResult> {
    let mut merged = text_results;
    merged.extend(image_results);
    merged.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    merged.truncate(k);
    merged
}

fn text_hit_to_result(hit: QueryHit) -> SearchResult {
    let image_refs = hit
        .metadata
        .get("images")
        .and_then(|v| v.as_str())
        .map(|raw| match serde_json::from_str::<Vec<String>>(raw) {
            Ok(refs) => refs,
            Err(e) => {
                warn!(id = %hit.id, error = %e, "undecodable image list in metadata");
                Vec::new()
            }
        })
        .unwrap_or_default();

    SearchResult {
        modality: Modality::Text,
        similarity: 1.0 - hit.distance,
        content: hit.document,
        metadata: hit.metadata,
        image_refs,
    }
}

fn image_hit_to_result(hit: QueryHit) -> SearchResult {
    SearchResult {
        modality: Modality::Image,
        similarity: 1.0 - hit.distance,
        content: hit.document,
        metadata: hit.metadata,
        image_refs: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn result(modality: Modality, similarity: f32, content: &str) -> SearchResult {
        SearchResult {
            modality,
            similarity,
            content: content.to_string(),
            metadata: HashMap::new(),
            image_refs: Vec::new(),
        }
    }

    #[test]
    fn test_merge_tie_keeps_text_before_image() {
        let text = vec![
            result(Modality::Text, 0.9, "t-high"),
            result(Modality::Text, 0.7, "t-low"),
        ];
        let image = vec![result(Modality::Image, 0.9, "i-high")];

        let merged = merge_ranked(text, image, 10);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].content, "t-high");
        assert_eq!(merged[0].modality, Modality::Text);
        assert_eq!(merged[1].content, "i-high");
        assert_eq!(merged[1].modality, Modality::Image);
        assert_eq!(merged[2].content, "t-low");
    }

    #[test]
    fn test_merge_preserves_source_order_on_equal_scores() {
        let text = vec![
            result(Modality::Text, 0.5, "first"),
            result(Modality::Text, 0.5, "second"),
        ];
        let merged = merge_ranked(text, Vec::new(), 10);
        assert_eq!(merged[0].content, "first");
        assert_eq!(merged[1].content, "second");
    }

    #[test]
    fn test_merge_truncates_to_k() {
        let text = vec![
            result(Modality::Text, 0.9, "a"),
            result(Modality::Text, 0.8, "b"),
        ];
        let image = vec![result(Modality::Image, 0.85, "c")];

        let merged = merge_ranked(text, image, 2);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].content, "a");
        assert_eq!(merged[1].content, "c");
    }

    #[test]
    fn test_merge_does_not_clamp_similarity() {
        let text = vec![result(Modality::Text, -0.4, "anti")];
        let merged = merge_ranked(text, Vec::new(), 5);
        assert_eq!(merged[0].similarity, -0.4);
    }

    #[test]
    fn test_text_hit_decodes_image_refs() {
        let mut metadata = HashMap::new();
        metadata.insert(
            "images".to_string(),
            serde_json::json!("[\"img1.jpg\",\"img2.jpg\"]"),
        );
        let hit = QueryHit {
            id: "doc_0".to_string(),
            distance: 0.2,
            metadata,
            document: "Title\n\nbody".to_string(),
        };

        let result = text_hit_to_result(hit);
        assert_eq!(result.modality, Modality::Text);
        assert!((result.similarity - 0.8).abs() < 1e-6);
        assert_eq!(result.image_refs, vec!["img1.jpg", "img2.jpg"]);
    }

    #[test]
    fn test_text_hit_tolerates_bad_image_refs() {
        let mut metadata = HashMap::new();
        metadata.insert("images".to_string(), serde_json::json!("not json"));
        let hit = QueryHit {
            id: "doc_0".to_string(),
            distance: 0.1,
            metadata,
            document: "text".to_string(),
        };

        let result = text_hit_to_result(hit);
        assert!(result.image_refs.is_empty());
    }

    #[test]
    fn test_image_hit_has_no_image_refs() {
        let hit = QueryHit {
            id: "img_0_0".to_string(),
            distance: 0.3,
            metadata: HashMap::new(),
            document: "Image from: Car Engines".to_string(),
        };

        let result = image_hit_to_result(hit);
        assert_eq!(result.modality, Modality::Image);
        assert_eq!(result.content, "Image from: Car Engines");
        assert!(result.image_refs.is_empty());
    }
}
