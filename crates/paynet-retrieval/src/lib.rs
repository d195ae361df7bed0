//! # paynet-retrieval
//!
//! Report retrieval for paynet-insight.
//!
//! Uploaded report summaries are tagged with their report type, embedded
//! and appended to a flat L2 index. Chat questions are classified by
//! intent and answered with the newline-joined text of their nearest
//! indexed reports.
//!
//! ## Core Concepts
//!
//! - **Context**: [`RagContext`] owns the lazily loaded model and the index
//! - **Write path**: [`DocumentEmbedder`] tags, encodes and appends whole batches
//! - **Read path**: [`Retriever`] encodes a query and joins its neighbours
//! - **Query Intent**: keyword classification of chat questions
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use paynet_retrieval::{DocumentEmbedder, IntentClassifier, RagContext, Retriever};
//!
//! let context = Arc::new(RagContext::from_settings(&settings)?);
//! let embedder = DocumentEmbedder::new(context.clone());
//! embedder.embed_texts(&["Declines rose 12% in EMEA"], Some("AUTHORIZATION"))?;
//!
//! let question = "Why are authorization declines up?";
//! let intent = IntentClassifier::new().classify(question).intent;
//! let context_text = Retriever::new(context).retrieve_for_intent(intent, question)?;
//! ```
//!
//! ## Modules
//!
//! - [`context`]: Shared model handle and index
//! - [`embedder`]: Write path
//! - [`retriever`]: Read path
//! - [`classifier`]: Intent classification using keyword rules
//!
//! [`QueryIntent`] lives in `paynet-types` and is re-exported here.

pub mod classifier;
pub mod context;
pub mod embedder;
pub mod error;
pub mod retriever;

// Re-export main types at crate root
pub use classifier::{ClassificationResult, ClassifierConfig, IntentClassifier, IntentRule};
pub use context::{ModelLoader, RagContext, DEFAULT_TAG};
pub use embedder::DocumentEmbedder;
pub use error::RetrievalError;
pub use retriever::{RetrievedDocument, Retriever, DEFAULT_TOP_K, NO_CONTEXT};
pub use paynet_types::QueryIntent;
