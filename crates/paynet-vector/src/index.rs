//! Vector index trait and types.
//!
//! Defines the interface for appending tagged vectors and running
//! nearest-neighbour queries against them.

use std::collections::BTreeMap;
use std::ops::Range;

use paynet_embeddings::Embedding;
use serde::Serialize;

use crate::error::VectorError;
use crate::record::{TaggedDocument, VectorRecord};

/// Result of a vector search
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    /// Insertion position of the matched record
    pub position: usize,
    /// Euclidean distance to the query (lower = more similar)
    pub distance: f32,
}

impl SearchResult {
    pub fn new(position: usize, distance: f32) -> Self {
        Self { position, distance }
    }
}

/// Index statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct IndexStats {
    /// Number of vectors in the index
    pub vector_count: usize,
    /// Embedding dimension
    pub dimension: usize,
    /// Record count per document tag
    pub tags: BTreeMap<String, usize>,
}

/// Trait for append-only vector indexes.
pub trait VectorIndex: Send + Sync {
    /// Get the embedding dimension
    fn dimension(&self) -> usize;

    /// Get the number of vectors in the index
    fn len(&self) -> usize;

    /// Check if the index is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a batch of (vector, document) pairs in order.
    ///
    /// Either every pair is appended or none is. Returns the positions
    /// assigned to the batch.
    fn add_batch(
        &mut self,
        batch: Vec<(Embedding, TaggedDocument)>,
    ) -> Result<Range<usize>, VectorError>;

    /// Search for the k nearest neighbours, nearest first.
    /// An empty index yields an empty result.
    fn search(&self, query: &Embedding, k: usize) -> Result<Vec<SearchResult>, VectorError>;

    /// Record at an insertion position.
    fn get(&self, position: usize) -> Option<&VectorRecord>;

    /// Get index statistics
    fn stats(&self) -> IndexStats;
}
