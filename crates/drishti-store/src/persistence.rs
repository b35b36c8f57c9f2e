//! Partition snapshot persistence.

use drishti_common::{DrishtiError, Result, Vector};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

/// One persisted record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Record ID
    pub id: String,
    /// Embedding vector
    pub vector: Vector,
    /// Scalar metadata
    pub metadata: HashMap<String, Value>,
    /// Stored document text
    pub document: String,
}

/// On-disk snapshot of a partition.
#[derive(Debug, Serialize, Deserialize)]
pub struct PartitionSnapshot {
    /// Snapshot format version
    pub version: u32,
    /// Partition name
    pub name: String,
    /// Fixed vector dimension, if any records exist
    pub dimension: Option<usize>,
    /// All live records
    pub records: Vec<StoredRecord>,
}

impl PartitionSnapshot {
    /// Current snapshot format version
    pub const VERSION: u32 = 1;
}

/// Save a partition snapshot to disk.
///
/// The snapshot is written to a temporary sibling and renamed into place,
/// so an interrupted write never clobbers the previous snapshot.
pub fn save_partition<P: AsRef<Path>>(path: P, snapshot: &PartitionSnapshot) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            DrishtiError::Storage(format!("Failed to create storage directory: {}", e))
        })?;
    }

    let json = serde_json::to_string(snapshot)
        .map_err(|e| DrishtiError::Serialization(format!("Failed to serialize partition: {}", e)))?;

    let tmp_path = path.with_extension("json.tmp");
    let mut file = File::create(&tmp_path)
        .map_err(|e| DrishtiError::Storage(format!("Failed to create snapshot file: {}", e)))?;

    file.write_all(json.as_bytes())
        .map_err(|e| DrishtiError::Storage(format!("Failed to write snapshot: {}", e)))?;

    file.sync_all()
        .map_err(|e| DrishtiError::Storage(format!("Failed to sync snapshot: {}", e)))?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        DrishtiError::Storage(format!("Failed to replace snapshot: {}", e))
    })?;

    Ok(())
}

/// Load a partition snapshot from disk.
pub fn load_partition<P: AsRef<Path>>(path: P) -> Result<PartitionSnapshot> {
    let path = path.as_ref();

    let mut file = File::open(path)
        .map_err(|e| DrishtiError::Storage(format!("Failed to open snapshot file: {}", e)))?;

    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| DrishtiError::Storage(format!("Failed to read snapshot: {}", e)))?;

    let snapshot: PartitionSnapshot = serde_json::from_str(&contents).map_err(|e| {
        DrishtiError::Serialization(format!("Failed to deserialize partition: {}", e))
    })?;

    if snapshot.version != PartitionSnapshot::VERSION {
        return Err(DrishtiError::Storage(format!(
            "Unsupported snapshot version: {} (expected {})",
            snapshot.version,
            PartitionSnapshot::VERSION
        )));
    }

    Ok(snapshot)
}
