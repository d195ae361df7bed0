//! Report summaries from parsed CSV tables.
//!
//! Parsing is the caller's job; this module takes the column layout and
//! the numeric column values and produces the [`ReportSummary`] that is
//! stored, analysed and embedded.

use std::collections::BTreeMap;
use std::path::Path;

use paynet_types::{MetricStats, ReportSummary, ReportType};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Separator between summary parts.
pub const SUMMARY_SEPARATOR: &str = " | ";

/// Storage type of a numeric column.
///
/// Float columns print whole-number bounds as `2.0`, integer columns as `2`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Integer,
    #[default]
    Float,
}

impl ColumnKind {
    fn format(self, value: f64) -> String {
        match self {
            ColumnKind::Integer => format!("{}", value),
            // Debug keeps the trailing `.0` on whole numbers
            ColumnKind::Float => format!("{:?}", value),
        }
    }
}

/// A parsed report: column names in file order, row count and the values
/// of every column that parsed as numeric.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportTable {
    pub columns: Vec<String>,
    pub rows: usize,
    #[serde(default)]
    pub numeric: BTreeMap<String, Vec<f64>>,
    /// Columns missing here are treated as float
    #[serde(default)]
    pub kinds: BTreeMap<String, ColumnKind>,
}

impl ReportTable {
    pub fn new(columns: Vec<String>, rows: usize) -> Self {
        Self {
            columns,
            rows,
            numeric: BTreeMap::new(),
            kinds: BTreeMap::new(),
        }
    }

    /// Attach values for a float column.
    pub fn with_numeric(mut self, column: impl Into<String>, values: Vec<f64>) -> Self {
        let column = column.into();
        self.kinds.insert(column.clone(), ColumnKind::Float);
        self.numeric.insert(column, values);
        self
    }

    /// Attach values for an integer column.
    pub fn with_integer(mut self, column: impl Into<String>, values: Vec<i64>) -> Self {
        let column = column.into();
        self.kinds.insert(column.clone(), ColumnKind::Integer);
        self.numeric
            .insert(column, values.into_iter().map(|v| v as f64).collect());
        self
    }

    pub fn kind(&self, column: &str) -> ColumnKind {
        self.kinds.get(column).copied().unwrap_or_default()
    }

    /// Stats for each numeric column, in column order.
    fn column_stats(&self) -> Vec<(&str, ColumnKind, MetricStats)> {
        self.columns
            .iter()
            .filter_map(|col| {
                let values = self.numeric.get(col)?;
                MetricStats::from_values(values)
                    .map(|stats| (col.as_str(), self.kind(col), stats))
            })
            .collect()
    }
}

/// Build the summary for the report at `path`.
///
/// The report type comes from the path. Numeric columns with no finite
/// values are left out of both the metrics and the text.
pub fn summarize_report(path: impl AsRef<Path>, table: &ReportTable) -> ReportSummary {
    let path = path.as_ref();
    let report_type = ReportType::infer_from_path(path);
    let stats = table.column_stats();

    let mut parts = vec![
        format!("Report file: {}", path.display()),
        format!("Total rows: {}", table.rows),
        format!("Columns: {}", table.columns.join(", ")),
    ];
    parts.extend(stats.iter().map(|(col, kind, s)| {
        format!(
            "{} ranges from {} to {} with an average of {:.2}",
            col,
            kind.format(s.min),
            kind.format(s.max),
            s.mean
        )
    }));

    let key_metrics: BTreeMap<String, MetricStats> = stats
        .into_iter()
        .map(|(col, _, s)| (col.to_string(), s))
        .collect();

    debug!(
        report_type = %report_type,
        rows = table.rows,
        metrics = key_metrics.len(),
        "Summarized report"
    );

    ReportSummary {
        report_type,
        rows: table.rows,
        columns: table.columns.clone(),
        key_metrics,
        text_summary: parts.join(SUMMARY_SEPARATOR),
    }
}
