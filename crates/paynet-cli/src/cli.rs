//! CLI argument parsing for `paynet`.
//!
//! Global flags override every other configuration source.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use paynet_types::EmbeddingBackend;

/// Payment-network report insight
///
/// Ask questions grounded in uploaded report summaries, classify chat
/// intent and flag report anomalies.
#[derive(Parser, Debug)]
#[command(name = "paynet")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default <config dir>/paynet-insight/config)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Answer a question with context from indexed reports
    Ask {
        /// The question
        query: String,

        /// Report summary JSON to index first (repeatable)
        #[arg(short, long = "report")]
        reports: Vec<PathBuf>,

        /// Free-text document to index first, as TAG=TEXT (repeatable)
        #[arg(short, long = "note")]
        notes: Vec<String>,

        /// Number of neighbours to retrieve (default from config)
        #[arg(short)]
        k: Option<usize>,

        /// Embedding backend override (candle, hashing)
        #[arg(short, long)]
        backend: Option<EmbeddingBackend>,
    },

    /// Classify the intent of a question
    Classify {
        /// The question
        query: String,
    },

    /// Detect anomalies in report summaries and aggregate their metrics
    Analyze {
        /// Report summary JSON files
        #[arg(required = true)]
        summaries: Vec<PathBuf>,
    },

    /// Embedding model management
    Model {
        #[command(subcommand)]
        command: ModelCommands,
    },
}

/// Model subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ModelCommands {
    /// Download the model files into the cache
    Fetch,

    /// Show where the model is cached and which files are missing
    Status,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
