//! Command implementations for `paynet`.
//!
//! Every command loads [`Settings`], applies CLI overrides, installs the
//! tracing subscriber and prints its result as pretty JSON on stdout.
//! Logs go to stderr so output stays pipeable.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use paynet_analysis::{
    detect_anomalies, explain, recommend_actions, Anomaly, DashboardStats, RecommendedAction,
};
use paynet_embeddings::{get_or_download_model, ModelCache};
use paynet_retrieval::{
    ClassificationResult, DocumentEmbedder, IntentClassifier, QueryIntent, RagContext, Retriever,
};
use paynet_types::{EmbeddingBackend, ReportSummary, ReportType, Settings};

use crate::cli::ModelCommands;

/// Load configuration and apply global CLI overrides.
pub fn load_settings(config_path: Option<&str>, log_level_override: Option<&str>) -> Result<Settings> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;
    if let Some(log_level) = log_level_override {
        settings.log_level = log_level.to_string();
    }
    Ok(settings)
}

/// Install the global tracing subscriber. `RUST_LOG` wins over the
/// configured level.
pub fn init_logging(settings: &Settings) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

/// Read a report summary written by the upload pipeline.
pub fn load_summary(path: &Path) -> Result<ReportSummary> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read report summary {:?}", path))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid report summary {:?}", path))
}

/// Split a `TAG=TEXT` note.
pub fn parse_note(note: &str) -> Result<(String, String)> {
    let (tag, text) = note
        .split_once('=')
        .ok_or_else(|| anyhow!("Note must be TAG=TEXT, got {:?}", note))?;
    let tag = tag.trim();
    if tag.is_empty() {
        return Err(anyhow!("Note tag is empty in {:?}", note));
    }
    Ok((tag.to_string(), text.to_string()))
}

/// Result of `paynet ask`.
#[derive(Debug, Clone, Serialize)]
pub struct AskOutput {
    pub intent: QueryIntent,
    pub reason: String,
    /// The query actually sent to the retriever
    pub retrieval_query: String,
    pub indexed_documents: usize,
    pub context: String,
    /// Explanation of the retrieved context for this intent
    pub analysis: String,
    pub actions: Vec<RecommendedAction>,
}

/// Index the given reports and notes into a fresh context, then answer
/// `query` from it. Blocking: may load the model.
pub fn run_ask(
    settings: &Settings,
    query: &str,
    reports: &[PathBuf],
    notes: &[String],
    k: Option<usize>,
) -> Result<AskOutput> {
    let top_k = k.unwrap_or(settings.retrieval.top_k);
    if top_k == 0 {
        bail!("k must be at least 1");
    }

    let summaries = reports
        .iter()
        .map(|p| load_summary(p))
        .collect::<Result<Vec<_>>>()?;
    let notes = notes
        .iter()
        .map(|n| parse_note(n))
        .collect::<Result<Vec<_>>>()?;

    let context = Arc::new(
        RagContext::from_settings(settings).context("Failed to build retrieval context")?,
    );
    let embedder = DocumentEmbedder::new(context.clone());

    for summary in &summaries {
        if let Err(e) = embedder.index_report(summary) {
            // Upload pipeline treats indexing failures as non-fatal
            warn!(report_type = %summary.report_type, error = %e, "Report not indexed");
        }
    }
    for (tag, text) in &notes {
        embedder
            .embed_text(text, Some(tag.as_str()))
            .with_context(|| format!("Failed to index note tagged {}", tag))?;
    }

    let classification = IntentClassifier::new().classify(query);
    let retriever = Retriever::new(context.clone()).with_top_k(top_k);
    let retrieval_query = classification.intent.compose_query(query);
    let context_text = retriever
        .retrieve_for_intent(classification.intent, query)
        .context("Retrieval failed")?;
    let analysis = explain(classification.intent, &context_text);
    let actions = recommend_actions(&analysis);

    let indexed_documents = context.len().context("Failed to read index")?;
    info!(
        intent = %classification.intent,
        indexed = indexed_documents,
        "Answered query"
    );

    Ok(AskOutput {
        intent: classification.intent,
        reason: classification.reason,
        retrieval_query,
        indexed_documents,
        context: context_text,
        analysis,
        actions,
    })
}

/// `paynet ask`
pub async fn handle_ask(
    mut settings: Settings,
    query: String,
    reports: Vec<PathBuf>,
    notes: Vec<String>,
    k: Option<usize>,
    backend: Option<EmbeddingBackend>,
) -> Result<()> {
    if let Some(backend) = backend {
        settings.embedding.backend = backend;
    }

    // Model load and encoding are CPU-bound
    let output = tokio::task::spawn_blocking(move || run_ask(&settings, &query, &reports, &notes, k))
        .await
        .context("Ask task panicked")??;
    print_json(&output)
}

/// `paynet classify`
pub fn handle_classify(query: &str) -> Result<()> {
    let result: ClassificationResult = IntentClassifier::new().classify(query);
    print_json(&result)
}

/// Anomalies for one report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportAnalysis {
    pub path: PathBuf,
    pub report_type: ReportType,
    pub anomalies: Vec<Anomaly>,
}

/// Result of `paynet analyze`.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeOutput {
    pub reports: Vec<ReportAnalysis>,
    pub dashboard: DashboardStats,
}

pub fn run_analyze(settings: &Settings, paths: &[PathBuf]) -> Result<AnalyzeOutput> {
    let mut summaries = Vec::with_capacity(paths.len());
    let mut reports = Vec::with_capacity(paths.len());

    for path in paths {
        let summary = load_summary(path)?;
        reports.push(ReportAnalysis {
            path: path.clone(),
            report_type: summary.report_type,
            anomalies: detect_anomalies(&summary, &settings.anomaly),
        });
        summaries.push(summary);
    }

    Ok(AnalyzeOutput {
        reports,
        dashboard: DashboardStats::from_summaries(&summaries),
    })
}

/// `paynet analyze`
pub fn handle_analyze(settings: &Settings, paths: &[PathBuf]) -> Result<()> {
    print_json(&run_analyze(settings, paths)?)
}

/// Cache state reported by `paynet model status`.
#[derive(Debug, Clone, Serialize)]
pub struct ModelStatus {
    pub repo: String,
    pub dir: PathBuf,
    pub cached: bool,
    pub missing: Vec<String>,
}

fn model_cache(settings: &Settings) -> ModelCache {
    match settings.expanded_cache_dir() {
        Some(dir) => ModelCache::new(dir, settings.embedding.model_repo.clone()),
        None => ModelCache::for_repo(settings.embedding.model_repo.clone()),
    }
}

pub fn model_status(settings: &Settings) -> ModelStatus {
    let cache = model_cache(settings);
    ModelStatus {
        repo: settings.embedding.model_repo.clone(),
        dir: cache.model_dir(),
        cached: cache.is_cached(),
        missing: cache.missing_files().into_iter().map(String::from).collect(),
    }
}

/// `paynet model`
pub async fn handle_model(settings: Settings, command: ModelCommands) -> Result<()> {
    match command {
        ModelCommands::Status => print_json(&model_status(&settings)),
        ModelCommands::Fetch => {
            let cache = model_cache(&settings);
            info!(repo = %settings.embedding.model_repo, "Fetching model files");
            tokio::task::spawn_blocking(move || get_or_download_model(&cache))
                .await
                .context("Download task panicked")?
                .context("Failed to download model")?;
            print_json(&model_status(&settings))
        }
    }
}
