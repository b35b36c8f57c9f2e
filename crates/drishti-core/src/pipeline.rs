//! Ingestion pipeline: documents in, two batch writes out.

use drishti_common::{Document, IngestReport, Result};
use drishti_embedding::EmbeddingBridge;
use drishti_store::{RecordBatch, VectorStore, IMAGE_PARTITION, TEXT_PARTITION};
use serde_json::json;
use std::collections::HashMap;
use std::fs;
use std::sync::Arc;
use tracing::{info, warn};

/// Converts a sequence of documents into embedding records and writes them
/// to the vector store.
///
/// The whole run is buffered in memory and flushed in at most two batch
/// adds (text, then image) after the full pass; there is no partial flush.
/// IDs are assigned by input position (`doc_{i}`, `img_{i}_{j}`), so
/// re-running the same sequence overwrites in place.
pub struct IngestionPipeline {
    bridge: Arc<EmbeddingBridge>,
    store: Arc<VectorStore>,
}

impl IngestionPipeline {
    /// Create a pipeline over the given bridge and store.
    pub fn new(bridge: Arc<EmbeddingBridge>, store: Arc<VectorStore>) -> Self {
        Self { bridge, store }
    }

    /// Run the pipeline over an ordered document sequence.
    ///
    /// Per-item failures (a malformed document, an unreadable image) are
    /// logged and skipped; a failed batch write fails the whole run.
    pub async fn run(&self, documents: &[Document]) -> Result<IngestReport> {
        let mut report = IngestReport::default();
        let mut text_batch = RecordBatch::default();
        let mut image_batch = RecordBatch::default();

        for (i, doc) in documents.iter().enumerate() {
            if !doc.has_required_fields() {
                warn!(document = i, "skipping document without title or body");
                report.documents_skipped += 1;
                continue;
            }

            let doc_text = format!("{}\n\n{}", doc.title, doc.body);
            let vector = match self.bridge.embed_text(&doc_text).await {
                Ok(v) => v,
                Err(e) => {
                    warn!(
                        document = i,
                        title = %doc.title,
                        error = %e,
                        "text embedding failed, dropping document"
                    );
                    report.documents_skipped += 1;
                    continue;
                }
            };

            let text_id = format!("doc_{}", i);
            let metadata = text_metadata(doc)?;
            text_batch.push(text_id.clone(), vector, metadata.clone(), doc_text);
            report.documents_indexed += 1;

            if doc.images.is_empty() {
                continue;
            }

            if !self.bridge.cross_modal_available() {
                warn!(
                    document = i,
                    images = doc.images.len(),
                    "cross-modal encoder unavailable, skipping images"
                );
                report.images_skipped += doc.images.len();
                continue;
            }

            for (j, image_ref) in doc.images.iter().enumerate() {
                let bytes = match fs::read(image_ref) {
                    Ok(b) => b,
                    Err(e) => {
                        warn!(
                            document = i,
                            image = j,
                            path = %image_ref,
                            error = %e,
                            "failed to read image, skipping"
                        );
                        report.images_skipped += 1;
                        continue;
                    }
                };

                match self.bridge.embed_image(&bytes).await {
                    Ok(vector) => {
                        let mut image_metadata = metadata.clone();
                        image_metadata.insert("type".to_string(), json!("image"));
                        image_metadata.insert("image_path".to_string(), json!(image_ref));
                        image_metadata
                            .insert("parent_text_id".to_string(), json!(text_id.clone()));

                        image_batch.push(
                            format!("img_{}_{}", i, j),
                            vector,
                            image_metadata,
                            format!("Image from: {}", doc.title),
                        );
                        report.images_indexed += 1;
                    }
                    Err(e) => {
                        warn!(
                            document = i,
                            image = j,
                            path = %image_ref,
                            error = %e,
                            "image embedding failed, skipping"
                        );
                        report.images_skipped += 1;
                    }
                }
            }
        }

        if !text_batch.is_empty() {
            let written = self.store.add(TEXT_PARTITION, &text_batch)?;
            info!(records = written, "indexed text records");
        }
        if !image_batch.is_empty() {
            let written = self.store.add(IMAGE_PARTITION, &image_batch)?;
            info!(records = written, "indexed image records");
        }

        Ok(report)
    }
}

/// Per-document metadata for the text record. Structured sub-fields (the
/// image list and crawler metadata) are JSON-encoded strings because the
/// partitions accept scalar values only.
fn text_metadata(doc: &Document) -> Result<HashMap<String, serde_json::Value>> {
    let mut metadata = HashMap::new();
    metadata.insert("title".to_string(), json!(doc.title));
    metadata.insert("url".to_string(), json!(doc.source_url));
    metadata.insert(
        "images".to_string(),
        json!(serde_json::to_string(&doc.images)?),
    );
    metadata.insert(
        "metadata".to_string(),
        json!(serde_json::to_string(&doc.metadata)?),
    );
    metadata.insert("type".to_string(), json!("text"));
    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use drishti_embedding::providers::{HashingCrossModalEncoder, HashingTextEncoder};
    use tempfile::tempdir;

    fn pipeline_with(dir: &std::path::Path, cross_modal: bool) -> IngestionPipeline {
        let bridge = EmbeddingBridge::new(
            Arc::new(HashingTextEncoder::new(64)),
            cross_modal.then(|| {
                Arc::new(HashingCrossModalEncoder::new(32))
                    as Arc<dyn drishti_common::CrossModalEncoder>
            }),
        );
        let store = VectorStore::open(dir, "articles").unwrap();
        IngestionPipeline::new(Arc::new(bridge), Arc::new(store))
    }

    #[tokio::test]
    async fn test_ingest_text_only_documents() {
        let dir = tempdir().unwrap();
        let pipeline = pipeline_with(dir.path(), true);

        let docs = vec![
            Document::new("Apple Harvest", "apple banana fruit"),
            Document::new("Car Engines", "car truck engine"),
        ];
        let report = pipeline.run(&docs).await.unwrap();

        assert_eq!(report.documents_indexed, 2);
        assert_eq!(report.documents_skipped, 0);
        assert_eq!(report.images_indexed, 0);
        assert_eq!(pipeline.store.count(TEXT_PARTITION).unwrap(), 2);
    }

    #[tokio::test]
    async fn test_ingest_skips_invalid_documents() {
        let dir = tempdir().unwrap();
        let pipeline = pipeline_with(dir.path(), true);

        let docs = vec![
            Document::new("", "body without title"),
            Document::new("Title without body", ""),
            Document::new("Valid", "valid body"),
        ];
        let report = pipeline.run(&docs).await.unwrap();

        assert_eq!(report.documents_indexed, 1);
        assert_eq!(report.documents_skipped, 2);
        assert_eq!(pipeline.store.count(TEXT_PARTITION).unwrap(), 1);
    }

    #[tokio::test]
    async fn test_positional_ids() {
        let dir = tempdir().unwrap();
        let pipeline = pipeline_with(dir.path(), true);

        let docs = vec![
            Document::new("First", "first body"),
            Document::new("Second", "second body"),
        ];
        pipeline.run(&docs).await.unwrap();

        let query = pipeline.bridge.embed_text("First\n\nfirst body").await.unwrap();
        let hits = pipeline.store.query(TEXT_PARTITION, &query, 1).unwrap();
        assert_eq!(hits[0].id, "doc_0");
    }

    #[tokio::test]
    async fn test_image_ingestion_with_valid_file() {
        let dir = tempdir().unwrap();
        let image_path = dir.path().join("img1.jpg");
        std::fs::write(&image_path, vec![0xFFu8, 0xD8, 0xFF, 0xE0, 1, 2, 3, 4]).unwrap();

        let pipeline = pipeline_with(dir.path(), true);
        let mut doc = Document::new("Car Engines", "car truck engine");
        doc.images = vec![image_path.to_string_lossy().to_string()];

        let report = pipeline.run(&[doc]).await.unwrap();
        assert_eq!(report.images_indexed, 1);
        assert_eq!(report.images_skipped, 0);
        assert_eq!(pipeline.store.count(IMAGE_PARTITION).unwrap(), 1);

        // Image record carries the parent linkage.
        let image_query = pipeline
            .bridge
            .embed_query_for_image_space("car")
            .await
            .unwrap();
        let hits = pipeline
            .store
            .query(IMAGE_PARTITION, &image_query, 1)
            .unwrap();
        assert_eq!(hits[0].id, "img_0_0");
        assert_eq!(
            hits[0].metadata.get("parent_text_id").unwrap(),
            &json!("doc_0")
        );
        assert_eq!(hits[0].document, "Image from: Car Engines");
    }

    #[tokio::test]
    async fn test_partial_image_failure_isolated() {
        let dir = tempdir().unwrap();
        let good_path = dir.path().join("good.jpg");
        std::fs::write(&good_path, vec![9u8; 32]).unwrap();

        let pipeline = pipeline_with(dir.path(), true);
        let mut doc = Document::new("Mixed", "one good one bad image");
        doc.images = vec![
            dir.path().join("missing.jpg").to_string_lossy().to_string(),
            good_path.to_string_lossy().to_string(),
        ];

        let report = pipeline.run(&[doc]).await.unwrap();
        assert_eq!(report.documents_indexed, 1);
        assert_eq!(report.images_indexed, 1);
        assert_eq!(report.images_skipped, 1);
        assert_eq!(pipeline.store.count(TEXT_PARTITION).unwrap(), 1);
        assert_eq!(pipeline.store.count(IMAGE_PARTITION).unwrap(), 1);
    }

    #[tokio::test]
    async fn test_degraded_bridge_skips_all_images() {
        let dir = tempdir().unwrap();
        let image_path = dir.path().join("img1.jpg");
        std::fs::write(&image_path, vec![1u8; 16]).unwrap();

        let pipeline = pipeline_with(dir.path(), false);
        let mut doc = Document::new("Title", "body");
        doc.images = vec![image_path.to_string_lossy().to_string()];

        let report = pipeline.run(&[doc]).await.unwrap();
        assert_eq!(report.documents_indexed, 1);
        assert_eq!(report.images_skipped, 1);
        assert_eq!(pipeline.store.count(IMAGE_PARTITION).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_reingest_is_idempotent() {
        let dir = tempdir().unwrap();
        let pipeline = pipeline_with(dir.path(), true);

        let docs = vec![
            Document::new("Apple Harvest", "apple banana fruit"),
            Document::new("Car Engines", "car truck engine"),
        ];
        pipeline.run(&docs).await.unwrap();
        pipeline.run(&docs).await.unwrap();

        assert_eq!(pipeline.store.count(TEXT_PARTITION).unwrap(), 2);
    }

    #[test]
    fn test_text_metadata_encodes_structured_fields() {
        let mut doc = Document::new("Title", "Body");
        doc.source_url = "https://example.com/a".to_string();
        doc.images = vec!["img1.jpg".to_string()];
        doc.metadata
            .insert("category".to_string(), json!("nature"));

        let metadata = text_metadata(&doc).unwrap();
        assert_eq!(metadata.get("title").unwrap(), &json!("Title"));
        assert_eq!(metadata.get("type").unwrap(), &json!("text"));

        // Structured fields are JSON strings, not arrays/objects.
        let images_value = metadata.get("images").unwrap();
        assert!(images_value.is_string());
        let decoded: Vec<String> =
            serde_json::from_str(images_value.as_str().unwrap()).unwrap();
        assert_eq!(decoded, vec!["img1.jpg"]);
    }
}
