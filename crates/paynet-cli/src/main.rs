//! paynet
//!
//! Questions and anomaly checks over payment-network report summaries.
//!
//! # Usage
//!
//! ```bash
//! paynet ask "Why are authorization declines up?" --report auth_march.json
//! paynet classify "Any clearing backlog?"
//! paynet analyze auth_march.json settlement_march.json
//! paynet model fetch
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (<config dir>/paynet-insight/config.toml)
//! 3. File given with --config
//! 4. Environment variables (PAYNET__SECTION__KEY)
//! 5. CLI flags

use anyhow::Result;
use clap::Parser;

use paynet_cli::{
    handle_analyze, handle_ask, handle_classify, handle_model, init_logging, load_settings, Cli,
    Commands,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = load_settings(cli.config.as_deref(), cli.log_level.as_deref())?;
    init_logging(&settings)?;

    match cli.command {
        Commands::Ask {
            query,
            reports,
            notes,
            k,
            backend,
        } => {
            handle_ask(settings, query, reports, notes, k, backend).await?;
        }
        Commands::Classify { query } => {
            handle_classify(&query)?;
        }
        Commands::Analyze { summaries } => {
            handle_analyze(&settings, &summaries)?;
        }
        Commands::Model { command } => {
            handle_model(settings, command).await?;
        }
    }

    Ok(())
}
