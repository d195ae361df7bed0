//! paynet CLI library exports.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (ask, classify, analyze, model)

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands, ModelCommands};
pub use commands::{
    handle_analyze, handle_ask, handle_classify, handle_model, init_logging, load_settings,
    load_summary, model_status, parse_note, run_analyze, run_ask, AnalyzeOutput, AskOutput,
    ModelStatus, ReportAnalysis,
};
