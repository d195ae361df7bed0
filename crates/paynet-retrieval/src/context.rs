//! Shared retrieval state.
//!
//! `RagContext` owns the embedding model handle and the vector index that
//! the write path ([`DocumentEmbedder`](crate::DocumentEmbedder)) and read
//! path ([`Retriever`](crate::Retriever)) share. Construct one per
//! process (or per test) and hand it to both as an `Arc`.
//!
//! Initialization order:
//! 1. The index is created empty at construction, sized to the configured
//!    dimension.
//! 2. The model is loaded on first use by whichever caller needs it first.
//!    The loader runs under a mutex, so concurrent first callers share one
//!    load. A model whose dimension differs from the index is rejected.
//!
//! Reading an empty index never loads the model.

use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use paynet_embeddings::{CandleEmbedder, EmbeddingError, EmbeddingModel, HashingEmbedder, ModelCache};
use paynet_types::{EmbeddingBackend, Settings};
use paynet_vector::{FlatIndex, IndexStats, TaggedDocument, VectorIndex};
use tracing::info;

use crate::error::RetrievalError;

/// Deferred model constructor.
pub type ModelLoader =
    Box<dyn Fn() -> Result<Arc<dyn EmbeddingModel>, EmbeddingError> + Send + Sync>;

/// Default tag for callers that do not name one.
pub const DEFAULT_TAG: &str = "GENERAL";

/// Embedding model handle plus the index of everything embedded so far.
pub struct RagContext {
    loader: ModelLoader,
    model: Mutex<Option<Arc<dyn EmbeddingModel>>>,
    index: RwLock<FlatIndex>,
    default_tag: String,
}

impl RagContext {
    /// Context whose model is built by `loader` on first use.
    pub fn new<F>(dimension: usize, loader: F) -> Result<Self, RetrievalError>
    where
        F: Fn() -> Result<Arc<dyn EmbeddingModel>, EmbeddingError> + Send + Sync + 'static,
    {
        Ok(Self {
            loader: Box::new(loader),
            model: Mutex::new(None),
            index: RwLock::new(FlatIndex::new(dimension)?),
            default_tag: DEFAULT_TAG.to_string(),
        })
    }

    /// Context around an already-constructed model.
    pub fn with_model(model: Arc<dyn EmbeddingModel>) -> Result<Self, RetrievalError> {
        let dimension = model.info().dimension;
        let loader_model = model.clone();
        let context = Self::new(dimension, move || Ok(loader_model.clone()))?;
        *context
            .model
            .lock()
            .map_err(|_| RetrievalError::LockPoisoned("model"))? = Some(model);
        Ok(context)
    }

    /// Context that loads all-MiniLM-L6-v2 from `cache` on first use.
    pub fn candle(cache: ModelCache, dimension: usize) -> Result<Self, RetrievalError> {
        Self::new(dimension, move || {
            let model: Arc<dyn EmbeddingModel> = Arc::new(CandleEmbedder::load(&cache)?);
            Ok(model)
        })
    }

    /// Context configured from settings (backend, model repo, cache dir,
    /// dimension, default tag).
    pub fn from_settings(settings: &Settings) -> Result<Self, RetrievalError> {
        let dimension = settings.embedding.dimension;
        let context = match settings.embedding.backend {
            EmbeddingBackend::Candle => {
                let cache = match settings.expanded_cache_dir() {
                    Some(dir) => ModelCache::new(dir, settings.embedding.model_repo.clone()),
                    None => ModelCache::for_repo(settings.embedding.model_repo.clone()),
                };
                Self::candle(cache, dimension)?
            }
            EmbeddingBackend::Hashing => {
                Self::with_model(Arc::new(HashingEmbedder::new(dimension)?))?
            }
        };

        info!(
            backend = %settings.embedding.backend,
            dim = dimension,
            "Retrieval context ready"
        );
        Ok(context.with_default_tag(settings.retrieval.default_tag.clone()))
    }

    /// Override the tag used when callers pass none.
    pub fn with_default_tag(mut self, tag: impl Into<String>) -> Self {
        self.default_tag = tag.into();
        self
    }

    pub fn default_tag(&self) -> &str {
        &self.default_tag
    }

    /// The embedding model, loading it on first call.
    pub fn model(&self) -> Result<Arc<dyn EmbeddingModel>, RetrievalError> {
        let mut slot = self
            .model
            .lock()
            .map_err(|_| RetrievalError::LockPoisoned("model"))?;

        if let Some(model) = slot.as_ref() {
            return Ok(model.clone());
        }

        let model = (self.loader)()?;
        let expected = self.dimension()?;
        let actual = model.info().dimension;
        if actual != expected {
            return Err(RetrievalError::ModelDimension { expected, actual });
        }

        info!(model = %model.info().name, dim = actual, "Embedding model loaded");
        *slot = Some(model.clone());
        Ok(model)
    }

    /// Whether the model has been loaded yet.
    pub fn is_model_loaded(&self) -> bool {
        self.model.lock().map(|slot| slot.is_some()).unwrap_or(false)
    }

    pub fn dimension(&self) -> Result<usize, RetrievalError> {
        Ok(self.read_index()?.dimension())
    }

    /// Number of indexed documents.
    pub fn len(&self) -> Result<usize, RetrievalError> {
        Ok(self.read_index()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, RetrievalError> {
        Ok(self.read_index()?.is_empty())
    }

    pub fn stats(&self) -> Result<IndexStats, RetrievalError> {
        Ok(self.read_index()?.stats())
    }

    /// Indexed documents in insertion order.
    pub fn documents(&self) -> Result<Vec<TaggedDocument>, RetrievalError> {
        Ok(self
            .read_index()?
            .records()
            .iter()
            .map(|r| r.document.clone())
            .collect())
    }

    pub(crate) fn read_index(&self) -> Result<RwLockReadGuard<'_, FlatIndex>, RetrievalError> {
        self.index
            .read()
            .map_err(|_| RetrievalError::LockPoisoned("index"))
    }

    pub(crate) fn write_index(&self) -> Result<RwLockWriteGuard<'_, FlatIndex>, RetrievalError> {
        self.index
            .write()
            .map_err(|_| RetrievalError::LockPoisoned("index"))
    }
}
