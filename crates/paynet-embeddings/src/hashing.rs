//! Feature-hashing embedder.
//!
//! Bag-of-words vectors with no model download: each lower-cased
//! alphanumeric token adds 1.0 to bucket `fnv1a(token) % dimension`, then
//! the vector is normalized to unit length. Texts sharing words land close
//! together, which is all the offline path and the tests need.

use tracing::debug;

use crate::candle::EMBEDDING_DIM;
use crate::error::EmbeddingError;
use crate::model::{Embedding, EmbeddingModel, ModelInfo};

/// Deterministic bag-of-words embedder.
pub struct HashingEmbedder {
    info: ModelInfo,
}

impl HashingEmbedder {
    /// Create an embedder producing vectors of `dimension` components.
    pub fn new(dimension: usize) -> Result<Self, EmbeddingError> {
        if dimension == 0 {
            return Err(EmbeddingError::InvalidInput(
                "hashing dimension must be > 0".to_string(),
            ));
        }
        Ok(Self {
            info: ModelInfo {
                name: "feature-hashing".to_string(),
                dimension,
                max_sequence_length: usize::MAX,
            },
        })
    }

    /// Bucket index for a token.
    pub fn bucket(&self, token: &str) -> usize {
        fnv1a(token.as_bytes()) as usize % self.info.dimension
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self {
            info: ModelInfo {
                name: "feature-hashing".to_string(),
                dimension: EMBEDDING_DIM,
                max_sequence_length: usize::MAX,
            },
        }
    }
}

impl EmbeddingModel for HashingEmbedder {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        let mut values = vec![0.0f32; self.info.dimension];
        let lowered = text.to_lowercase();
        let mut tokens = 0usize;

        for token in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            values[self.bucket(token)] += 1.0;
            tokens += 1;
        }

        debug!(tokens = tokens, "Hashed text");
        Ok(Embedding::new(values))
    }
}

/// 32-bit FNV-1a.
fn fnv1a(data: &[u8]) -> u32 {
    let mut hash: u32 = 0x811c_9dc5;
    for &byte in data {
        hash ^= byte as u32;
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}
