//! # paynet-embeddings
//!
//! Local embedding generation for report retrieval.
//!
//! Turns report summaries and chat queries into fixed-length vectors so
//! they can be compared by distance.
//!
//! ## Backends
//! - [`CandleEmbedder`]: all-MiniLM-L6-v2 via Candle (384 dimensions),
//!   model files fetched from the HuggingFace Hub once and cached
//! - [`HashingEmbedder`]: deterministic bag-of-words feature hashing,
//!   no download, used for offline runs and tests

pub mod cache;
pub mod candle;
pub mod error;
pub mod hashing;
pub mod model;

pub use crate::candle::{CandleEmbedder, EMBEDDING_DIM};
pub use cache::{get_or_download_model, ModelCache, ModelPaths, DEFAULT_MODEL_REPO, MODEL_FILES};
pub use error::EmbeddingError;
pub use hashing::HashingEmbedder;
pub use model::{Embedding, EmbeddingModel, ModelInfo};
