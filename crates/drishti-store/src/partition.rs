//! A single in-memory vector partition with upsert and flat cosine scan.

use drishti_common::{DrishtiError, QueryHit, Result, Vector};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// One record batch for `add`: parallel arrays of ids, vectors, metadata
/// maps and document texts.
#[derive(Debug, Clone, Default)]
pub struct RecordBatch {
    /// Record identifiers, unique within the call and the partition
    pub ids: Vec<String>,
    /// Embedding vectors, one per id
    pub vectors: Vec<Vector>,
    /// Scalar metadata maps, one per id
    pub metadatas: Vec<HashMap<String, Value>>,
    /// Stored document texts, one per id
    pub documents: Vec<String>,
}

impl RecordBatch {
    /// Number of records in the batch.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Append one record.
    pub fn push(
        &mut self,
        id: String,
        vector: Vector,
        metadata: HashMap<String, Value>,
        document: String,
    ) {
        self.ids.push(id);
        self.vectors.push(vector);
        self.metadatas.push(metadata);
        self.documents.push(document);
    }

    fn validate(&self) -> Result<()> {
        if self.vectors.len() != self.ids.len()
            || self.metadatas.len() != self.ids.len()
            || self.documents.len() != self.ids.len()
        {
            return Err(DrishtiError::Validation(format!(
                "Batch length mismatch: {} ids, {} vectors, {} metadatas, {} documents",
                self.ids.len(),
                self.vectors.len(),
                self.metadatas.len(),
                self.documents.len()
            )));
        }

        let mut seen = HashSet::with_capacity(self.ids.len());
        for id in &self.ids {
            if !seen.insert(id) {
                return Err(DrishtiError::Validation(format!(
                    "Duplicate id within batch: '{}'",
                    id
                )));
            }
        }

        for (id, metadata) in self.ids.iter().zip(self.metadatas.iter()) {
            for (key, value) in metadata {
                if matches!(value, Value::Array(_) | Value::Object(_)) {
                    return Err(DrishtiError::Validation(format!(
                        "Non-scalar metadata value for key '{}' on id '{}'; \
                         encode structured fields as JSON strings",
                        key, id
                    )));
                }
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Record {
    pub id: String,
    pub vector: Vector,
    pub metadata: HashMap<String, Value>,
    pub document: String,
}

/// An independently indexed, independently queried collection of vectors
/// of one modality.
#[derive(Debug, Clone)]
pub struct Partition {
    name: String,
    dimension: Option<usize>,
    records: Vec<Record>,
    index: HashMap<String, usize>,
}

impl Partition {
    /// Create an empty partition. Dimension is fixed by the first add.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dimension: None,
            records: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Partition name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fixed vector dimension, once the first record has been added.
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// Number of live records.
    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// Batch upsert. An existing id has its vector, metadata and document
    /// replaced; a new id appends a record.
    ///
    /// # Returns
    ///
    /// Number of records written (inserts plus overwrites).
    pub fn add(&mut self, batch: &RecordBatch) -> Result<usize> {
        batch.validate()?;

        let mut dimension = self.dimension;
        for (id, vector) in batch.ids.iter().zip(batch.vectors.iter()) {
            if vector.is_empty() {
                return Err(DrishtiError::Validation(format!(
                    "Empty vector for id '{}'",
                    id
                )));
            }
            let expected = *dimension.get_or_insert(vector.len());
            if vector.len() != expected {
                return Err(DrishtiError::Validation(format!(
                    "Vector for id '{}' has dimension {} but partition '{}' is fixed at {}",
                    id,
                    vector.len(),
                    self.name,
                    expected
                )));
            }
        }
        self.dimension = dimension;

        for i in 0..batch.ids.len() {
            let record = Record {
                id: batch.ids[i].clone(),
                vector: batch.vectors[i].clone(),
                metadata: batch.metadatas[i].clone(),
                document: batch.documents[i].clone(),
            };
            match self.index.get(&record.id) {
                Some(&slot) => self.records[slot] = record,
                None => {
                    self.index.insert(record.id.clone(), self.records.len());
                    self.records.push(record);
                }
            }
        }

        Ok(batch.len())
    }

    /// Nearest-neighbor scan: up to `k` hits ascending by cosine distance.
    pub fn query(&self, query: &[f32], k: usize) -> Result<Vec<QueryHit>> {
        if self.records.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        if let Some(dimension) = self.dimension {
            if query.len() != dimension {
                return Err(DrishtiError::StoreQuery(format!(
                    "Query dimension {} does not match partition '{}' dimension {}",
                    query.len(),
                    self.name,
                    dimension
                )));
            }
        }

        let mut hits: Vec<QueryHit> = self
            .records
            .iter()
            .map(|record| QueryHit {
                id: record.id.clone(),
                distance: cosine_distance(query, &record.vector),
                metadata: record.metadata.clone(),
                document: record.document.clone(),
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(k);
        Ok(hits)
    }

    pub(crate) fn records(&self) -> &[Record] {
        &self.records
    }

    pub(crate) fn from_records(
        name: String,
        dimension: Option<usize>,
        records: Vec<Record>,
    ) -> Self {
        let index = records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id.clone(), i))
            .collect();
        Self {
            name,
            dimension,
            records,
            index,
        }
    }
}

/// Cosine distance in [0, 2]: `1 - cos(a, b)`. Zero-norm inputs are
/// treated as orthogonal (distance 1).
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a.sqrt() * norm_b.sqrt())
}
