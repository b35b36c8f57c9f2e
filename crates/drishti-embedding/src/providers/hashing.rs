//! Deterministic hashing encoders.
//!
//! These run fully offline: each token (or byte window) is hashed into a
//! signed bucket of a fixed-dimension vector, then the vector is
//! L2-normalized. Texts sharing tokens land close under cosine distance,
//! which is enough for offline runs and for exercising the full pipeline
//! in tests without a model server.

use async_trait::async_trait;
use drishti_common::{CrossModalEncoder, DrishtiError, Result, TextEncoder, Vector};

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

fn l2_normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}

/// Project lowercase alphanumeric tokens into signed hash buckets.
fn token_projection(text: &str, dimension: usize) -> Vector {
    let mut vector = vec![0.0f32; dimension];
    let lowered = text.to_lowercase();
    for token in lowered.split(|c: char| !c.is_alphanumeric()) {
        if token.is_empty() {
            continue;
        }
        let hash = fnv1a(token.as_bytes());
        let bucket = (hash % dimension as u64) as usize;
        let sign = if hash & (1 << 63) == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign;
    }
    l2_normalize(&mut vector);
    vector
}

/// Deterministic text encoder over token hash buckets.
#[derive(Debug, Clone)]
pub struct HashingTextEncoder {
    dimension: usize,
}

impl HashingTextEncoder {
    /// Create a new hashing text encoder with the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

#[async_trait]
impl TextEncoder for HashingTextEncoder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vector>> {
        Ok(texts
            .iter()
            .map(|text| token_projection(text, self.dimension))
            .collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "hashing"
    }
}

/// Deterministic cross-modal encoder: image bytes and text queries are
/// projected into one shared hash-bucket space.
#[derive(Debug, Clone)]
pub struct HashingCrossModalEncoder {
    dimension: usize,
}

impl HashingCrossModalEncoder {
    /// Create a new hashing cross-modal encoder with the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

#[async_trait]
impl CrossModalEncoder for HashingCrossModalEncoder {
    async fn embed_image(&self, bytes: &[u8]) -> Result<Vector> {
        if bytes.is_empty() {
            return Err(DrishtiError::Embedding(
                "empty or unreadable image payload".to_string(),
            ));
        }

        // Overlapping 4-byte windows approximate local image structure.
        let mut vector = vec![0.0f32; self.dimension];
        let step = 4.min(bytes.len());
        for window in bytes.windows(step) {
            let hash = fnv1a(window);
            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if hash & (1 << 63) == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }
        l2_normalize(&mut vector);
        Ok(vector)
    }

    async fn embed_text(&self, text: &str) -> Result<Vector> {
        Ok(token_projection(text, self.dimension))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "hashing"
    }
}
