//! Indexed records.
//!
//! A record pairs an embedding with the document it was computed from.
//! The tag is kept as its own field; the `[TAG] text` string the model saw
//! is rebuilt on demand.

use std::fmt;

use chrono::{DateTime, Utc};
use paynet_embeddings::Embedding;
use serde::{Deserialize, Serialize};

/// Document text plus its semantic category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedDocument {
    /// Category label, e.g. AUTHORIZATION or SETTLEMENT
    pub tag: String,
    /// Raw text as supplied by the caller
    pub text: String,
}

impl TaggedDocument {
    pub fn new(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            text: text.into(),
        }
    }

    /// The string handed to the embedding model: `[TAG] text`.
    pub fn model_input(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TaggedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.tag, self.text)
    }
}

/// One indexed vector and its source document.
#[derive(Debug, Clone)]
pub struct VectorRecord {
    /// Insertion position; never changes once assigned
    pub position: usize,
    pub embedding: Embedding,
    pub document: TaggedDocument,
    pub indexed_at: DateTime<Utc>,
}
