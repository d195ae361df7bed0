//! Report summary types.
//!
//! A summary is what the upload path keeps for each payment-network CSV
//! report: row/column counts, per-column numeric stats and a one-line
//! text rendering that gets embedded for retrieval.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Kind of payment-network report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    Authorization,
    Settlement,
    #[default]
    Unknown,
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Authorization => "authorization",
            ReportType::Settlement => "settlement",
            ReportType::Unknown => "unknown",
        }
    }

    /// Retrieval tag for documents derived from this report type.
    pub fn tag(&self) -> String {
        self.as_str().to_uppercase()
    }

    /// Infer the report type from its file path.
    ///
    /// `auth` anywhere in the path wins over `settlement`.
    pub fn infer_from_path(path: impl AsRef<Path>) -> Self {
        let lower = path.as_ref().to_string_lossy().to_lowercase();
        if lower.contains("auth") {
            ReportType::Authorization
        } else if lower.contains("settlement") {
            ReportType::Settlement
        } else {
            ReportType::Unknown
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mean/min/max of one numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl MetricStats {
    /// Stats over `values`, or `None` when there are no finite values.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return None;
        }

        let sum: f64 = finite.iter().sum();
        let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Some(Self {
            mean: sum / finite.len() as f64,
            min,
            max,
        })
    }
}

/// Summary of one uploaded report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub report_type: ReportType,
    pub rows: usize,
    pub columns: Vec<String>,
    /// Numeric columns only, keyed by column name
    #[serde(default)]
    pub key_metrics: BTreeMap<String, MetricStats>,
    /// Text that is embedded for retrieval
    pub text_summary: String,
}

impl ReportSummary {
    /// Stats for a metric column, if the report had it.
    pub fn metric(&self, name: &str) -> Option<&MetricStats> {
        self.key_metrics.get(name)
    }

    /// Retrieval tag for this report's text summary.
    pub fn tag(&self) -> String {
        self.report_type.tag()
    }
}
