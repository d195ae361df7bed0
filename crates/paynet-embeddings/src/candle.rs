//! Candle-based embedding implementation.
//!
//! Runs all-MiniLM-L6-v2 on CPU: BERT forward pass, mean pooling over the
//! attention mask, then L2 normalization. Output is 384 `f32` values.

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::cache::{get_or_download_model, ModelCache};
use crate::error::EmbeddingError;
use crate::model::{Embedding, EmbeddingModel, ModelInfo};

/// Embedding dimension for all-MiniLM-L6-v2
pub const EMBEDDING_DIM: usize = 384;

/// Maximum sequence length
pub const MAX_SEQ_LENGTH: usize = 256;

/// Candle-based embedder using all-MiniLM-L6-v2.
pub struct CandleEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    info: ModelInfo,
}

impl CandleEmbedder {
    /// Load the embedding model from cache (downloading if needed).
    pub fn load(cache: &ModelCache) -> Result<Self, EmbeddingError> {
        let paths = get_or_download_model(cache)?;
        let mut embedder =
            Self::load_from_paths(&paths.config, &paths.tokenizer, &paths.weights)?;
        embedder.info.name = cache.model_name().to_string();
        Ok(embedder)
    }

    /// Load with default cache settings
    pub fn load_default() -> Result<Self, EmbeddingError> {
        let cache = ModelCache::default();
        Self::load(&cache)
    }

    /// Load from explicit file paths
    pub fn load_from_paths(
        config_path: &std::path::Path,
        tokenizer_path: &std::path::Path,
        weights_path: &std::path::Path,
    ) -> Result<Self, EmbeddingError> {
        info!(weights = ?weights_path, "Loading embedding model...");

        let device = Device::Cpu;

        // Load config
        let config_str = std::fs::read_to_string(config_path)?;
        let config: BertConfig = serde_json::from_str(&config_str)
            .map_err(|e| EmbeddingError::ModelNotFound(format!("Invalid config: {}", e)))?;

        // Load tokenizer
        let tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| EmbeddingError::Tokenizer(e.to_string()))?;

        // Load model weights
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path.to_path_buf()], DType::F32, &device)?
        };

        let model = BertModel::load(vb, &config)?;

        info!(
            dim = EMBEDDING_DIM,
            max_seq = MAX_SEQ_LENGTH,
            "Model loaded successfully"
        );

        Ok(Self {
            model,
            tokenizer,
            device,
            info: ModelInfo {
                name: "all-MiniLM-L6-v2".to_string(),
                dimension: EMBEDDING_DIM,
                max_sequence_length: MAX_SEQ_LENGTH,
            },
        })
    }
}

/// Token ids and attention masks padded to a common length, row-major.
#[derive(Debug, PartialEq)]
struct PaddedBatch {
    ids: Vec<u32>,
    mask: Vec<u32>,
    rows: usize,
    seq_len: usize,
}

/// Truncate every sequence to `max_seq` tokens and right-pad with zeros to
/// the longest remaining length.
fn pad_batch(sequences: &[(&[u32], &[u32])], max_seq: usize) -> PaddedBatch {
    let seq_len = sequences
        .iter()
        .map(|(ids, _)| ids.len())
        .max()
        .unwrap_or(0)
        .min(max_seq);

    let mut ids = Vec::with_capacity(sequences.len() * seq_len);
    let mut mask = Vec::with_capacity(sequences.len() * seq_len);
    for (seq_ids, seq_mask) in sequences {
        let keep = seq_ids.len().min(seq_len);
        ids.extend_from_slice(&seq_ids[..keep]);
        ids.resize(ids.len() + seq_len - keep, 0);
        mask.extend_from_slice(&seq_mask[..keep]);
        mask.resize(mask.len() + seq_len - keep, 0);
    }

    PaddedBatch {
        ids,
        mask,
        rows: sequences.len(),
        seq_len,
    }
}

/// Average token vectors over real (unmasked) tokens.
fn mean_pool(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor, EmbeddingError> {
    let mask = attention_mask
        .unsqueeze(2)?
        .broadcast_as(hidden.shape())?
        .to_dtype(DType::F32)?;

    let summed = hidden.broadcast_mul(&mask)?.sum(1)?;
    // clamp keeps all-padding rows finite
    let counts = mask.sum(1)?.clamp(1e-9, f64::MAX)?;

    Ok(summed.broadcast_div(&counts)?)
}

impl EmbeddingModel for CandleEmbedder {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        self.embed_batch(&[text])?
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::InvalidInput("model returned no embedding".into()))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        debug!(count = texts.len(), "Embedding batch");

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| EmbeddingError::Tokenizer(e.to_string()))?;

        let sequences: Vec<(&[u32], &[u32])> = encodings
            .iter()
            .map(|e| (e.get_ids(), e.get_attention_mask()))
            .collect();
        let batch = pad_batch(&sequences, self.info.max_sequence_length);
        let shape = (batch.rows, batch.seq_len);

        let input_ids = Tensor::from_vec(batch.ids, shape, &self.device)?;
        let attention_mask = Tensor::from_vec(batch.mask, shape, &self.device)?;
        let token_type_ids = Tensor::zeros_like(&input_ids)?;

        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled: Vec<Vec<f32>> = mean_pool(&hidden, &attention_mask)?.to_vec2()?;

        let embeddings = pooled
            .into_iter()
            .map(|values| {
                if values.len() != self.info.dimension {
                    return Err(EmbeddingError::DimensionMismatch {
                        expected: self.info.dimension,
                        actual: values.len(),
                    });
                }
                Ok(Embedding::new(values))
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(count = embeddings.len(), dim = self.info.dimension, "Batch complete");
        Ok(embeddings)
    }
}
