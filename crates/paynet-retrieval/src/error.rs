//! Retrieval error types.

use paynet_embeddings::EmbeddingError;
use paynet_vector::VectorError;
use thiserror::Error;

/// Errors from the embed (write) and retrieve (read) paths.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// Embedding model failed to load or encode
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    /// Vector index rejected a batch or query
    #[error("Vector index error: {0}")]
    Vector(#[from] VectorError),

    /// Model returned a different number of vectors than it was given texts
    #[error("Batch size mismatch: sent {expected} texts, got {actual} vectors")]
    BatchSizeMismatch { expected: usize, actual: usize },

    /// Loaded model does not produce vectors of the index dimension
    #[error("Model dimension {actual} does not match index dimension {expected}")]
    ModelDimension { expected: usize, actual: usize },

    /// A thread panicked while holding shared state
    #[error("Lock poisoned: {0}")]
    LockPoisoned(&'static str),
}
