//! Engine facade exposed to serving collaborators.

use crate::pipeline::IngestionPipeline;
use crate::query::QueryEngine;
use drishti_common::{
    Document, EngineConfig, EngineStats, IngestReport, Result, SearchResult,
};
use drishti_embedding::EmbeddingBridge;
use drishti_store::{VectorStore, IMAGE_PARTITION, TEXT_PARTITION};
use std::sync::Arc;
use tracing::info;

/// The multimodal ingestion-and-retrieval engine.
///
/// Owns the embedding bridge and vector store and exposes the three
/// operations collaborators consume: `ingest`, `search`, `stats`.
pub struct MultimodalEngine {
    bridge: Arc<EmbeddingBridge>,
    store: Arc<VectorStore>,
    pipeline: IngestionPipeline,
    query: QueryEngine,
}

impl std::fmt::Debug for MultimodalEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultimodalEngine")
            .field("bridge", &self.bridge)
            .field("store", &self.store)
            .finish()
    }
}

impl MultimodalEngine {
    /// Open an engine from configuration: build the embedding bridge
    /// (degrading if the cross-modal encoder fails to load) and open the
    /// disk-backed store.
    pub fn open(config: &EngineConfig) -> Result<Self> {
        config.validate()?;

        let bridge = Arc::new(EmbeddingBridge::from_config(config)?);
        let store = Arc::new(VectorStore::open(
            &config.persist_directory,
            &config.collection_name,
        )?);

        info!(
            collection = %config.collection_name,
            text_dimension = bridge.text_dimension(),
            cross_modal = bridge.cross_modal_available(),
            "engine opened"
        );

        Ok(Self::with_parts(bridge, store))
    }

    /// Assemble an engine from already-constructed parts. The bridge and
    /// store lifecycles are owned by the composing process.
    pub fn with_parts(bridge: Arc<EmbeddingBridge>, store: Arc<VectorStore>) -> Self {
        let pipeline = IngestionPipeline::new(Arc::clone(&bridge), Arc::clone(&store));
        let query = QueryEngine::new(Arc::clone(&bridge), Arc::clone(&store));
        Self {
            bridge,
            store,
            pipeline,
            query,
        }
    }

    /// Ingest a document sequence (see [`IngestionPipeline`]).
    pub async fn ingest(&self, documents: &[Document]) -> Result<IngestReport> {
        self.pipeline.run(documents).await
    }

    /// Search both partitions for the top `k` results (see [`QueryEngine`]).
    pub async fn search(
        &self,
        query: &str,
        k: usize,
        include_images: bool,
    ) -> Result<Vec<SearchResult>> {
        self.query.search(query, k, include_images).await
    }

    /// Partition counts. `total_documents` is the sum of both partitions.
    pub fn stats(&self) -> Result<EngineStats> {
        let text_documents = self.store.count(TEXT_PARTITION)?;
        let image_documents = self.store.count(IMAGE_PARTITION)?;
        Ok(EngineStats {
            total_documents: text_documents + image_documents,
            text_documents,
            image_documents,
        })
    }

    /// Whether image indexing and image-space queries are possible.
    pub fn cross_modal_available(&self) -> bool {
        self.bridge.cross_modal_available()
    }
}
