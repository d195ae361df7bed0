//! # paynet-vector
//!
//! In-memory vector index for report retrieval.
//!
//! Every indexed vector is stored together with the tagged document it was
//! computed from, so a search hit resolves straight to its source text.
//!
//! ## Features
//! - Append-only: a record keeps its position for the life of the index
//! - Brute-force k-nearest-neighbour search by Euclidean (L2) distance
//! - Deterministic ordering: nearest first, ties go to the earlier insert
//! - Whole-batch validation: one bad vector rejects the batch

pub mod error;
pub mod flat;
pub mod index;
pub mod record;

pub use error::VectorError;
pub use flat::{squared_l2, FlatIndex};
pub use index::{IndexStats, SearchResult, VectorIndex};
pub use record::{TaggedDocument, VectorRecord};
