//! # paynet-types
//!
//! Shared domain types for the payment-network insight pipeline.
//!
//! This crate defines the data structures passed between the other crates:
//! - Reports: report type, per-column metric stats and the report summary
//! - Intents: what a chat question is about
//! - Settings: layered configuration (defaults, file, env, CLI)
//! - Errors: the unified error for configuration and input problems
//!
//! ## Usage
//!
//! ```rust
//! use paynet_types::{ReportType, Settings};
//!
//! let settings = Settings::default();
//! assert_eq!(settings.retrieval.top_k, 2);
//! assert_eq!(ReportType::Authorization.tag(), "AUTHORIZATION");
//! ```

pub mod config;
pub mod error;
pub mod intent;
pub mod report;

pub use config::{
    AnomalySettings, EmbeddingBackend, EmbeddingSettings, RetrievalSettings, Settings,
};
pub use error::PaynetError;
pub use intent::QueryIntent;
pub use report::{MetricStats, ReportSummary, ReportType};
