//! Vector index error types.

use thiserror::Error;

/// Errors that can occur during vector operations.
#[derive(Debug, Error)]
pub enum VectorError {
    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Vector with a NaN or infinite component
    #[error("Invalid vector at batch offset {0}: contains NaN or infinity")]
    InvalidVector(usize),

    /// Index constructed with a zero dimension
    #[error("Invalid index dimension: {0}")]
    InvalidDimension(usize),
}
