//! Disk-backed dual-partition vector store for Drishti.
//!
//! Two independent nearest-neighbor partitions ("text", "image") live under
//! one storage root. Each partition is persisted as a versioned JSON
//! snapshot named `<collection>_<partition>.json` and rewritten after every
//! successful batch add, so the store survives process restarts and the
//! same collection name resolves to the same data.

pub mod partition;
pub mod persistence;

pub use partition::{cosine_distance, Partition, RecordBatch};
pub use persistence::{load_partition, save_partition, PartitionSnapshot, StoredRecord};

use drishti_common::{DrishtiError, QueryHit, Result};
use parking_lot::RwLock;
use partition::Record;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Name of the text partition.
pub const TEXT_PARTITION: &str = "text";
/// Name of the image partition.
pub const IMAGE_PARTITION: &str = "image";

// The image partition persists under the historical "images" suffix.
fn snapshot_suffix(partition: &str) -> &str {
    match partition {
        IMAGE_PARTITION => "images",
        other => other,
    }
}

/// Dual-partition vector store.
///
/// Safe for many concurrent readers; writes are expected to come from a
/// single logical writer (ingestion runs) and are serialized internally.
pub struct VectorStore {
    root: PathBuf,
    collection: String,
    partitions: RwLock<HashMap<String, Partition>>,
}

impl std::fmt::Debug for VectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorStore")
            .field("root", &self.root)
            .field("collection", &self.collection)
            .finish()
    }
}

impl VectorStore {
    /// Open (or create) a store under `root` for the given collection,
    /// loading any existing partition snapshots.
    pub fn open<P: AsRef<Path>>(root: P, collection: &str) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|e| {
            DrishtiError::Storage(format!("Failed to create storage root: {}", e))
        })?;

        let mut partitions = HashMap::new();
        for name in [TEXT_PARTITION, IMAGE_PARTITION] {
            let path = snapshot_path(&root, collection, name);
            let partition = if path.exists() {
                let snapshot = persistence::load_partition(&path)?;
                let records = snapshot
                    .records
                    .into_iter()
                    .map(|r| Record {
                        id: r.id,
                        vector: r.vector,
                        metadata: r.metadata,
                        document: r.document,
                    })
                    .collect::<Vec<_>>();
                info!(
                    partition = name,
                    records = records.len(),
                    "loaded partition snapshot"
                );
                Partition::from_records(name.to_string(), snapshot.dimension, records)
            } else {
                debug!(partition = name, "starting empty partition");
                Partition::new(name)
            };
            partitions.insert(name.to_string(), partition);
        }

        Ok(Self {
            root,
            collection: collection.to_string(),
            partitions: RwLock::new(partitions),
        })
    }

    /// Batch upsert into a partition, then persist its snapshot.
    ///
    /// The batch is applied to a staged copy of the partition and committed
    /// to memory only after the snapshot persists, so a validation or
    /// persistence failure (`StoreWrite`) leaves both the live partition and
    /// the on-disk state unchanged.
    pub fn add(&self, partition: &str, batch: &RecordBatch) -> Result<usize> {
        let mut partitions = self.partitions.write();
        let part = partitions.get_mut(partition).ok_or_else(|| {
            DrishtiError::InvalidInput(format!("Unknown partition: '{}'", partition))
        })?;

        if batch.is_empty() {
            return Ok(0);
        }

        let mut staged = part.clone();
        let written = staged.add(batch)?;

        let snapshot = PartitionSnapshot {
            version: PartitionSnapshot::VERSION,
            name: staged.name().to_string(),
            dimension: staged.dimension(),
            records: staged
                .records()
                .iter()
                .map(|r| StoredRecord {
                    id: r.id.clone(),
                    vector: r.vector.clone(),
                    metadata: r.metadata.clone(),
                    document: r.document.clone(),
                })
                .collect(),
        };
        let path = snapshot_path(&self.root, &self.collection, partition);
        persistence::save_partition(&path, &snapshot)
            .map_err(|e| DrishtiError::StoreWrite(format!("Failed to persist batch: {}", e)))?;

        *part = staged;

        debug!(
            partition = partition,
            written = written,
            total = part.count(),
            "batch persisted"
        );
        Ok(written)
    }

    /// Nearest-neighbor query: up to `k` hits ascending by cosine distance.
    pub fn query(&self, partition: &str, query: &[f32], k: usize) -> Result<Vec<QueryHit>> {
        let partitions = self.partitions.read();
        let part = partitions.get(partition).ok_or_else(|| {
            DrishtiError::StoreQuery(format!("Unknown partition: '{}'", partition))
        })?;
        part.query(query, k)
    }

    /// Number of live records in a partition.
    pub fn count(&self, partition: &str) -> Result<usize> {
        let partitions = self.partitions.read();
        let part = partitions.get(partition).ok_or_else(|| {
            DrishtiError::StoreQuery(format!("Unknown partition: '{}'", partition))
        })?;
        Ok(part.count())
    }
}

fn snapshot_path(root: &Path, collection: &str, partition: &str) -> PathBuf {
    root.join(format!(
        "{}_{}.json",
        collection,
        snapshot_suffix(partition)
    ))
}
