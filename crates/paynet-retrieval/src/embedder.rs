//! Write path: tag, encode and index report text.

use std::sync::Arc;

use paynet_embeddings::Embedding;
use paynet_types::ReportSummary;
use paynet_vector::{TaggedDocument, VectorIndex};
use tracing::{debug, info};

use crate::context::RagContext;
use crate::error::RetrievalError;

/// Embeds text batches into the shared index.
///
/// Each input is stored as a [`TaggedDocument`]; the model sees
/// `[TAG] text`. Encoding happens before the index lock is taken, and the
/// whole batch is appended under one write lock, so concurrent batches
/// never interleave and a failed batch leaves no trace.
pub struct DocumentEmbedder {
    context: Arc<RagContext>,
}

impl DocumentEmbedder {
    pub fn new(context: Arc<RagContext>) -> Self {
        Self { context }
    }

    /// Embed one text under `tag` (or the context's default tag).
    pub fn embed_text(&self, text: &str, tag: Option<&str>) -> Result<Embedding, RetrievalError> {
        let mut embeddings = self.embed_texts(&[text], tag)?;
        embeddings
            .pop()
            .ok_or(RetrievalError::BatchSizeMismatch {
                expected: 1,
                actual: 0,
            })
    }

    /// Embed a batch of texts under one tag and append them to the index
    /// in input order.
    ///
    /// Returns one embedding per input. An empty batch is a no-op and does
    /// not load the model.
    pub fn embed_texts<S: AsRef<str>>(
        &self,
        texts: &[S],
        tag: Option<&str>,
    ) -> Result<Vec<Embedding>, RetrievalError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let tag = tag.unwrap_or_else(|| self.context.default_tag());
        let documents: Vec<TaggedDocument> = texts
            .iter()
            .map(|t| TaggedDocument::new(tag, t.as_ref()))
            .collect();
        let inputs: Vec<String> = documents.iter().map(TaggedDocument::model_input).collect();

        let model = self.context.model()?;
        let embeddings = model.embed_texts(&inputs)?;
        if embeddings.len() != documents.len() {
            return Err(RetrievalError::BatchSizeMismatch {
                expected: documents.len(),
                actual: embeddings.len(),
            });
        }

        let batch: Vec<(Embedding, TaggedDocument)> =
            embeddings.iter().cloned().zip(documents).collect();
        let positions = {
            let mut index = self.context.write_index()?;
            index.add_batch(batch)?
        };

        info!(
            tag = tag,
            count = embeddings.len(),
            start = positions.start,
            "Indexed documents"
        );
        Ok(embeddings)
    }

    /// Embed a report's text summary under its report-type tag.
    pub fn index_report(&self, summary: &ReportSummary) -> Result<Embedding, RetrievalError> {
        let tag = summary.tag();
        debug!(report_type = %summary.report_type, rows = summary.rows, "Indexing report summary");
        self.embed_text(&summary.text_summary, Some(tag.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paynet_embeddings::{EmbeddingError, EmbeddingModel, HashingEmbedder, ModelInfo};
    use paynet_types::ReportType;
    use std::collections::BTreeMap;
    use std::thread;

    fn hashing_context() -> Arc<RagContext> {
        Arc::new(RagContext::with_model(Arc::new(HashingEmbedder::default())).unwrap())
    }

    /// Fails on any input containing "poison".
    struct FailingModel {
        info: ModelInfo,
    }

    impl FailingModel {
        fn new() -> Self {
            Self {
                info: ModelInfo {
                    name: "failing".to_string(),
                    dimension: 4,
                    max_sequence_length: 16,
                },
            }
        }
    }

    impl EmbeddingModel for FailingModel {
        fn info(&self) -> &ModelInfo {
            &self.info
        }

        fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
            if text.contains("poison") {
                return Err(EmbeddingError::InvalidInput(text.to_string()));
            }
            Ok(Embedding::new(vec![1.0, 0.0, 0.0, 0.0]))
        }
    }

    /// Always returns one vector fewer than requested.
    struct ShortModel {
        info: ModelInfo,
    }

    impl EmbeddingModel for ShortModel {
        fn info(&self) -> &ModelInfo {
            &self.info
        }

        fn embed(&self, _text: &str) -> Result<Embedding, EmbeddingError> {
            Ok(Embedding::new(vec![0.0, 1.0]))
        }

        fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
            Ok(texts
                .iter()
                .skip(1)
                .map(|_| Embedding::new(vec![0.0, 1.0]))
                .collect())
        }
    }

    #[test]
    fn test_registry_grows_with_tagged_text_in_order() {
        let context = hashing_context();
        let embedder = DocumentEmbedder::new(context.clone());

        let texts = ["first line", "second line", "third line"];
        let embeddings = embedder.embed_texts(&texts, Some("AUTHORIZATION")).unwrap();
        assert_eq!(embeddings.len(), 3);
        assert!(embeddings.iter().all(|e| e.dimension() == 384));

        let documents = context.documents().unwrap();
        assert_eq!(documents.len(), 3);
        for (doc, text) in documents.iter().zip(texts) {
            assert_eq!(doc.model_input(), format!("[AUTHORIZATION] {}", text));
            assert_eq!(doc.text, text);
        }
    }

    #[test]
    fn test_default_tag_when_omitted() {
        let context = hashing_context();
        let embedder = DocumentEmbedder::new(context.clone());

        embedder.embed_text("volume steady", None).unwrap();
        let documents = context.documents().unwrap();
        assert_eq!(documents[0].model_input(), "[GENERAL] volume steady");
    }

    #[test]
    fn test_returned_vectors_match_model_on_tagged_input() {
        let context = hashing_context();
        let embedder = DocumentEmbedder::new(context.clone());

        let embedding = embedder.embed_text("Declines rose", Some("AUTHORIZATION")).unwrap();
        let direct = HashingEmbedder::default()
            .embed("[AUTHORIZATION] Declines rose")
            .unwrap();
        assert_eq!(embedding, direct);
    }

    #[test]
    fn test_empty_batch_does_not_load_model() {
        let context = Arc::new(
            RagContext::new(4, || Err(EmbeddingError::ModelNotFound("unused".to_string())))
                .unwrap(),
        );
        let embedder = DocumentEmbedder::new(context.clone());

        let embeddings = embedder.embed_texts::<&str>(&[], Some("T")).unwrap();
        assert!(embeddings.is_empty());
        assert!(!context.is_model_loaded());
    }

    #[test]
    fn test_model_failure_commits_nothing() {
        let context = Arc::new(RagContext::with_model(Arc::new(FailingModel::new())).unwrap());
        let embedder = DocumentEmbedder::new(context.clone());

        embedder.embed_texts(&["fine"], Some("T")).unwrap();
        let result = embedder.embed_texts(&["also fine", "poison pill"], Some("T"));
        assert!(matches!(result, Err(RetrievalError::Embedding(_))));

        assert_eq!(context.len().unwrap(), 1);
        assert_eq!(context.documents().unwrap()[0].text, "fine");
    }

    #[test]
    fn test_short_model_output_rejected() {
        let model = ShortModel {
            info: ModelInfo {
                name: "short".to_string(),
                dimension: 2,
                max_sequence_length: 16,
            },
        };
        let context = Arc::new(RagContext::with_model(Arc::new(model)).unwrap());
        let embedder = DocumentEmbedder::new(context.clone());

        let result = embedder.embed_texts(&["a", "b", "c"], None);
        assert!(matches!(
            result,
            Err(RetrievalError::BatchSizeMismatch {
                expected: 3,
                actual: 2
            })
        ));
        assert!(context.is_empty().unwrap());
    }

    #[test]
    fn test_concurrent_batches_stay_contiguous() {
        let context = hashing_context();

        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let embedder = DocumentEmbedder::new(context.clone());
                thread::spawn(move || {
                    let tag = format!("W{}", worker);
                    let texts: Vec<String> =
                        (0..5).map(|i| format!("worker {} item {}", worker, i)).collect();
                    embedder.embed_texts(&texts, Some(tag.as_str())).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let documents = context.documents().unwrap();
        assert_eq!(documents.len(), 20);
        for chunk in documents.chunks(5) {
            let tag = &chunk[0].tag;
            assert!(chunk.iter().all(|d| &d.tag == tag));
            for (i, doc) in chunk.iter().enumerate() {
                assert!(doc.text.ends_with(&format!("item {}", i)));
            }
        }
    }

    #[test]
    fn test_index_report_uses_report_tag() {
        let context = hashing_context();
        let embedder = DocumentEmbedder::new(context.clone());

        let summary = ReportSummary {
            report_type: ReportType::Settlement,
            rows: 2,
            columns: vec!["delay_hours".to_string()],
            key_metrics: BTreeMap::new(),
            text_summary: "Report file: settlement.csv | Total rows: 2".to_string(),
        };
        embedder.index_report(&summary).unwrap();

        let documents = context.documents().unwrap();
        assert_eq!(documents[0].tag, "SETTLEMENT");
        assert_eq!(documents[0].text, summary.text_summary);
        assert_eq!(context.stats().unwrap().tags.get("SETTLEMENT"), Some(&1));
    }
}
