//! Configuration loading for paynet-insight.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at `<config dir>/paynet-insight/config.{toml,json,yaml}`.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::PaynetError;

/// Which embedding backend encodes text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// all-MiniLM-L6-v2 via Candle (downloads model files on first use)
    #[default]
    Candle,
    /// Deterministic feature hashing, no model download
    Hashing,
}

impl EmbeddingBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbeddingBackend::Candle => "candle",
            EmbeddingBackend::Hashing => "hashing",
        }
    }
}

impl fmt::Display for EmbeddingBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmbeddingBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "candle" => Ok(EmbeddingBackend::Candle),
            "hashing" => Ok(EmbeddingBackend::Hashing),
            other => Err(format!(
                "unknown embedding backend '{}' (expected candle or hashing)",
                other
            )),
        }
    }
}

/// Embedding model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    #[serde(default)]
    pub backend: EmbeddingBackend,

    /// HuggingFace repository holding the sentence-transformer weights
    #[serde(default = "default_model_repo")]
    pub model_repo: String,

    /// Model cache directory (platform cache dir when unset)
    #[serde(default)]
    pub cache_dir: Option<String>,

    /// Embedding dimension; must match the model
    #[serde(default = "default_dimension")]
    pub dimension: usize,
}

fn default_model_repo() -> String {
    "sentence-transformers/all-MiniLM-L6-v2".to_string()
}

fn default_dimension() -> usize {
    384
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::default(),
            model_repo: default_model_repo(),
            cache_dir: None,
            dimension: default_dimension(),
        }
    }
}

/// Retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalSettings {
    /// Number of neighbours joined into the chat context
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Tag applied when a caller does not name one
    #[serde(default = "default_tag")]
    pub default_tag: String,
}

fn default_top_k() -> usize {
    2
}

fn default_tag() -> String {
    "GENERAL".to_string()
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            default_tag: default_tag(),
        }
    }
}

/// Thresholds for report anomaly flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalySettings {
    /// Mean `declined_txns` above this raises AUTH_DECLINE_SPIKE
    #[serde(default = "default_decline_threshold")]
    pub decline_threshold: f64,

    /// Mean `delay_hours` above this raises SETTLEMENT_DELAY
    #[serde(default = "default_delay_threshold_hours")]
    pub delay_threshold_hours: f64,
}

fn default_decline_threshold() -> f64 {
    500.0
}

fn default_delay_threshold_hours() -> f64 {
    5.0
}

impl Default for AnomalySettings {
    fn default() -> Self {
        Self {
            decline_threshold: default_decline_threshold(),
            delay_threshold_hours: default_delay_threshold_hours(),
        }
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub embedding: EmbeddingSettings,

    #[serde(default)]
    pub retrieval: RetrievalSettings,

    #[serde(default)]
    pub anomaly: AnomalySettings,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            embedding: EmbeddingSettings::default(),
            retrieval: RetrievalSettings::default(),
            anomaly: AnomalySettings::default(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (`<config dir>/paynet-insight/config`)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (`PAYNET__SECTION__KEY`)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, PaynetError> {
        let config_dir = ProjectDirs::from("", "", "paynet-insight")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("log_level", default_log_level())
            .map_err(|e| PaynetError::Config(e.to_string()))?
            .set_default("embedding.backend", EmbeddingBackend::default().as_str())
            .map_err(|e| PaynetError::Config(e.to_string()))?
            .set_default("embedding.model_repo", default_model_repo())
            .map_err(|e| PaynetError::Config(e.to_string()))?
            .set_default("embedding.dimension", default_dimension() as i64)
            .map_err(|e| PaynetError::Config(e.to_string()))?
            .set_default("retrieval.top_k", default_top_k() as i64)
            .map_err(|e| PaynetError::Config(e.to_string()))?
            .set_default("retrieval.default_tag", default_tag())
            .map_err(|e| PaynetError::Config(e.to_string()))?
            .set_default("anomaly.decline_threshold", default_decline_threshold())
            .map_err(|e| PaynetError::Config(e.to_string()))?
            .set_default(
                "anomaly.delay_threshold_hours",
                default_delay_threshold_hours(),
            )
            .map_err(|e| PaynetError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // PAYNET__EMBEDDING__BACKEND=hashing, PAYNET__RETRIEVAL__TOP_K=3, ...
        builder = builder.add_source(
            Environment::with_prefix("PAYNET")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Settings = builder
            .build()
            .map_err(|e| PaynetError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| PaynetError::Config(e.to_string()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), PaynetError> {
        if self.embedding.dimension == 0 {
            return Err(PaynetError::Config(
                "embedding.dimension must be > 0".to_string(),
            ));
        }
        if self.retrieval.top_k == 0 {
            return Err(PaynetError::Config("retrieval.top_k must be > 0".to_string()));
        }
        if self.retrieval.default_tag.trim().is_empty() {
            return Err(PaynetError::Config(
                "retrieval.default_tag must not be empty".to_string(),
            ));
        }
        if self.anomaly.decline_threshold < 0.0 || self.anomaly.delay_threshold_hours < 0.0 {
            return Err(PaynetError::Config(
                "anomaly thresholds must be >= 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Model cache directory with `~` expanded, if one is configured.
    pub fn expanded_cache_dir(&self) -> Option<PathBuf> {
        let raw = self.embedding.cache_dir.as_deref()?;
        if let Some(rest) = raw.strip_prefix("~/") {
            if let Some(home) = directories::BaseDirs::new() {
                return Some(home.home_dir().join(rest));
            }
        }
        Some(PathBuf::from(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.embedding.backend, EmbeddingBackend::Candle);
        assert_eq!(settings.embedding.dimension, 384);
        assert_eq!(settings.retrieval.top_k, 2);
        assert_eq!(settings.retrieval.default_tag, "GENERAL");
        assert!((settings.anomaly.decline_threshold - 500.0).abs() < f64::EPSILON);
        assert!((settings.anomaly.delay_threshold_hours - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_load_with_defaults() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.embedding.dimension, 384);
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("paynet.toml");
        std::fs::write(
            &path,
            "log_level = \"debug\"\n[embedding]\nbackend = \"hashing\"\n[retrieval]\ntop_k = 5\n",
        )
        .unwrap();

        let settings = Settings::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.embedding.backend, EmbeddingBackend::Hashing);
        assert_eq!(settings.retrieval.top_k, 5);
        // Untouched keys keep their defaults
        assert_eq!(settings.retrieval.default_tag, "GENERAL");
    }

    #[test]
    fn test_missing_cli_config_file_is_an_error() {
        let result = Settings::load(Some("/definitely/not/here/paynet.toml"));
        assert!(matches!(result, Err(PaynetError::Config(_))));
    }

    #[test]
    fn test_validation() {
        let mut settings = Settings::default();
        assert!(settings.validate().is_ok());

        settings.retrieval.top_k = 0;
        assert!(settings.validate().is_err());

        settings.retrieval.top_k = 2;
        settings.embedding.dimension = 0;
        assert!(settings.validate().is_err());

        settings.embedding.dimension = 384;
        settings.retrieval.default_tag = "  ".to_string();
        assert!(settings.validate().is_err());

        settings.retrieval.default_tag = "GENERAL".to_string();
        settings.anomaly.decline_threshold = -1.0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!(
            "Hashing".parse::<EmbeddingBackend>().unwrap(),
            EmbeddingBackend::Hashing
        );
        assert_eq!(
            "candle".parse::<EmbeddingBackend>().unwrap(),
            EmbeddingBackend::Candle
        );
        assert!("faiss".parse::<EmbeddingBackend>().is_err());
    }

    #[test]
    fn test_expanded_cache_dir() {
        let mut settings = Settings::default();
        assert!(settings.expanded_cache_dir().is_none());

        settings.embedding.cache_dir = Some("/tmp/models".to_string());
        assert_eq!(
            settings.expanded_cache_dir(),
            Some(PathBuf::from("/tmp/models"))
        );
    }
}
