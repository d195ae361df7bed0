//! Model file caching.
//!
//! Downloads sentence-transformer files from the HuggingFace Hub once and
//! keeps them under the user cache directory.

use std::path::PathBuf;
use tracing::{debug, info};

use crate::error::EmbeddingError;

/// Default model repository on HuggingFace
pub const DEFAULT_MODEL_REPO: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Required model files
pub const MODEL_FILES: &[&str] = &["config.json", "tokenizer.json", "model.safetensors"];

/// Model cache configuration
#[derive(Debug, Clone)]
pub struct ModelCache {
    /// Cache directory path
    pub cache_dir: PathBuf,
    /// Model repository ID
    pub repo_id: String,
}

impl Default for ModelCache {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            repo_id: DEFAULT_MODEL_REPO.to_string(),
        }
    }
}

fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("paynet-insight")
        .join("models")
}

impl ModelCache {
    /// Create a new model cache with custom settings
    pub fn new(cache_dir: impl Into<PathBuf>, repo_id: impl Into<String>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            repo_id: repo_id.into(),
        }
    }

    /// Default cache directory for a non-default repository.
    pub fn for_repo(repo_id: impl Into<String>) -> Self {
        Self::new(default_cache_dir(), repo_id)
    }

    /// Get the model directory path
    pub fn model_dir(&self) -> PathBuf {
        self.cache_dir.join(self.repo_id.replace('/', "_"))
    }

    /// Model name without the organisation prefix.
    pub fn model_name(&self) -> &str {
        self.repo_id
            .rsplit('/')
            .next()
            .unwrap_or(self.repo_id.as_str())
    }

    /// Check if all model files are cached
    pub fn is_cached(&self) -> bool {
        self.missing_files().is_empty()
    }

    /// Model files not yet present in the cache.
    pub fn missing_files(&self) -> Vec<&'static str> {
        let model_dir = self.model_dir();
        MODEL_FILES
            .iter()
            .copied()
            .filter(|f| !model_dir.join(f).exists())
            .collect()
    }

    /// Get path to a specific model file
    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.model_dir().join(filename)
    }
}

/// Paths to model files
#[derive(Debug, Clone)]
pub struct ModelPaths {
    pub config: PathBuf,
    pub tokenizer: PathBuf,
    pub weights: PathBuf,
}

/// Get or download model files.
///
/// Returns paths to config.json, tokenizer.json, and model.safetensors.
pub fn get_or_download_model(cache: &ModelCache) -> Result<ModelPaths, EmbeddingError> {
    let model_dir = cache.model_dir();

    if cache.is_cached() {
        debug!(path = ?model_dir, "Using cached model");
    } else {
        info!(repo = %cache.repo_id, "Downloading model files...");
        download_model_files(cache)?;
    }

    Ok(ModelPaths {
        config: model_dir.join("config.json"),
        tokenizer: model_dir.join("tokenizer.json"),
        weights: model_dir.join("model.safetensors"),
    })
}

/// Download missing model files from HuggingFace Hub
fn download_model_files(cache: &ModelCache) -> Result<(), EmbeddingError> {
    use hf_hub::api::sync::Api;

    let api = Api::new().map_err(|e| EmbeddingError::Download(e.to_string()))?;
    let repo = api.model(cache.repo_id.clone());

    std::fs::create_dir_all(cache.model_dir())?;

    for filename in cache.missing_files() {
        info!(file = filename, "Downloading...");
        let source_path = repo
            .get(filename)
            .map_err(|e| EmbeddingError::Download(format!("{}: {}", filename, e)))?;

        let dest_path = cache.file_path(filename);
        std::fs::copy(&source_path, &dest_path)?;
        debug!(file = filename, "Downloaded to {:?}", dest_path);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cache_default() {
        let cache = ModelCache::default();
        assert!(cache.cache_dir.to_string_lossy().contains("paynet-insight"));
        assert_eq!(cache.repo_id, DEFAULT_MODEL_REPO);
        assert_eq!(cache.model_name(), "all-MiniLM-L6-v2");
    }

    #[test]
    fn test_is_cached_empty() {
        let temp = TempDir::new().unwrap();
        let cache = ModelCache::new(temp.path(), "test/model");
        assert!(!cache.is_cached());
        assert_eq!(cache.missing_files(), MODEL_FILES.to_vec());
    }

    #[test]
    fn test_partial_cache_reports_missing_files() {
        let temp = TempDir::new().unwrap();
        let cache = ModelCache::new(temp.path(), "test/model");
        std::fs::create_dir_all(cache.model_dir()).unwrap();
        std::fs::write(cache.file_path("config.json"), "{}").unwrap();
        std::fs::write(cache.file_path("tokenizer.json"), "{}").unwrap();

        assert!(!cache.is_cached());
        assert_eq!(cache.missing_files(), vec!["model.safetensors"]);

        std::fs::write(cache.file_path("model.safetensors"), b"").unwrap();
        assert!(cache.is_cached());
    }

    #[test]
    fn test_model_dir_flattens_repo_id() {
        let cache = ModelCache::new("/tmp/cache", "org/name");
        assert_eq!(cache.model_dir(), PathBuf::from("/tmp/cache/org_name"));
        assert_eq!(cache.model_name(), "name");
    }
}
