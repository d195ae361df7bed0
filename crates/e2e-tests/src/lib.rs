//! End-to-end test infrastructure for paynet-insight.
//!
//! Provides a shared TestHarness and helper functions for E2E tests
//! covering report summary, indexing, retrieval and anomaly checks.

use std::sync::Arc;

use paynet_analysis::{summarize_report, ReportTable};
use paynet_embeddings::{EmbeddingModel, HashingEmbedder};
use paynet_retrieval::{DocumentEmbedder, RagContext, Retriever};
use paynet_types::ReportSummary;

/// One retrieval context with its write and read paths.
///
/// Each harness owns a fresh index, so tests never see each other's
/// documents.
pub struct TestHarness {
    pub context: Arc<RagContext>,
    pub embedder: DocumentEmbedder,
    pub retriever: Retriever,
}

impl TestHarness {
    /// Harness over the offline hashing embedder (384 dims).
    pub fn new() -> Self {
        Self::with_model(Arc::new(HashingEmbedder::default()))
    }

    /// Harness over any embedding model.
    pub fn with_model(model: Arc<dyn EmbeddingModel>) -> Self {
        let context =
            Arc::new(RagContext::with_model(model).expect("Failed to build retrieval context"));
        Self::from_context(context)
    }

    pub fn from_context(context: Arc<RagContext>) -> Self {
        Self {
            embedder: DocumentEmbedder::new(context.clone()),
            retriever: Retriever::new(context.clone()),
            context,
        }
    }

    /// Number of indexed documents.
    pub fn indexed(&self) -> usize {
        self.context.len().expect("Failed to read index length")
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Create N distinct texts from a template (appending index).
pub fn create_test_texts(count: usize, base_text: &str) -> Vec<String> {
    (0..count)
        .map(|i| format!("{} (entry {})", base_text, i))
        .collect()
}

/// Authorization report with per-region decline counts.
pub fn authorization_report(path: &str, declines: &[i64]) -> ReportSummary {
    let table = ReportTable::new(
        vec!["region".to_string(), "declined_txns".to_string()],
        declines.len(),
    )
    .with_integer("declined_txns", declines.to_vec());
    summarize_report(path, &table)
}

/// Settlement report with per-batch delays in hours.
pub fn settlement_report(path: &str, delays: &[f64]) -> ReportSummary {
    let table = ReportTable::new(
        vec!["batch_id".to_string(), "delay_hours".to_string()],
        delays.len(),
    )
    .with_numeric("delay_hours", delays.to_vec());
    summarize_report(path, &table)
}
