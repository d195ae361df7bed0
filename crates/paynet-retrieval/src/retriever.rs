//! Read path: nearest report text for a question.
//!
//! Reads never append to the index. The query vector is computed, used for
//! one search and dropped.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use paynet_types::QueryIntent;
use paynet_vector::{TaggedDocument, VectorIndex};
use serde::Serialize;
use tracing::{debug, warn};

use crate::context::RagContext;
use crate::error::RetrievalError;

/// Context string returned when nothing has been indexed yet.
pub const NO_CONTEXT: &str = "No indexed report context available.";

/// Default number of neighbours per query.
pub const DEFAULT_TOP_K: usize = 2;

/// One retrieved neighbour.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievedDocument {
    pub position: usize,
    /// Euclidean distance to the query
    pub distance: f32,
    pub document: TaggedDocument,
    /// When the batch holding this document was appended
    pub indexed_at: DateTime<Utc>,
}

/// Looks up indexed report text nearest to a query.
pub struct Retriever {
    context: Arc<RagContext>,
    top_k: usize,
}

impl Retriever {
    pub fn new(context: Arc<RagContext>) -> Self {
        Self {
            context,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Override the neighbour count used by [`Retriever::retrieve_for_intent`].
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// The `k` nearest documents, nearest first.
    ///
    /// Empty when the index is empty; the model is not touched in that case.
    pub fn retrieve(&self, query: &str, k: usize) -> Result<Vec<RetrievedDocument>, RetrievalError> {
        if self.context.is_empty()? {
            debug!("Index empty, skipping query encoding");
            return Ok(Vec::new());
        }

        let model = self.context.model()?;
        let query_embedding = model.embed(query)?;

        let index = self.context.read_index()?;
        let hits = index.search(&query_embedding, k)?;

        let mut documents = Vec::with_capacity(hits.len());
        for hit in hits {
            match index.get(hit.position) {
                Some(record) => documents.push(RetrievedDocument {
                    position: hit.position,
                    distance: hit.distance,
                    document: record.document.clone(),
                    indexed_at: record.indexed_at,
                }),
                None => warn!(position = hit.position, "Search hit has no record, skipping"),
            }
        }

        debug!(k = k, found = documents.len(), "Retrieved documents");
        Ok(documents)
    }

    /// Newline-joined `[TAG] text` of the `k` nearest documents.
    ///
    /// Returns [`NO_CONTEXT`] when the index is empty.
    pub fn retrieve_context(&self, query: &str, k: usize) -> Result<String, RetrievalError> {
        if self.context.is_empty()? {
            return Ok(NO_CONTEXT.to_string());
        }

        let context = self
            .retrieve(query, k)?
            .iter()
            .map(|hit| hit.document.model_input())
            .collect::<Vec<_>>()
            .join("\n");
        Ok(context)
    }

    /// Context for a classified chat question, queried as `INTENT: question`
    /// with the configured `top_k`.
    pub fn retrieve_for_intent(
        &self,
        intent: QueryIntent,
        query: &str,
    ) -> Result<String, RetrievalError> {
        self.retrieve_context(&intent.compose_query(query), self.top_k)
    }
}
