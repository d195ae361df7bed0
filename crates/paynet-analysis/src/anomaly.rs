//! Threshold anomaly detection on report metrics.

use std::fmt;

use paynet_types::{AnomalySettings, ReportSummary};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Metric column holding declined authorization counts.
pub const DECLINED_TXNS: &str = "declined_txns";

/// Metric column holding settlement delay in hours.
pub const DELAY_HOURS: &str = "delay_hours";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnomalyKind {
    AuthDeclineSpike,
    SettlementDelay,
    NoAnomaly,
}

impl AnomalyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyKind::AuthDeclineSpike => "AUTH_DECLINE_SPIKE",
            AnomalyKind::SettlementDelay => "SETTLEMENT_DELAY",
            AnomalyKind::NoAnomaly => "NO_ANOMALY",
        }
    }
}

impl fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// One detected (or explicitly absent) anomaly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    #[serde(rename = "type")]
    pub kind: AnomalyKind,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<String>,
    pub message: String,
}

impl Anomaly {
    fn none() -> Self {
        Self {
            kind: AnomalyKind::NoAnomaly,
            severity: Severity::Low,
            metric: None,
            message: "No significant anomalies detected".to_string(),
        }
    }
}

/// Check a report summary against the configured thresholds.
///
/// A metric fires only when its mean is strictly above the threshold.
/// Never returns an empty list: with nothing flagged the result is a
/// single [`AnomalyKind::NoAnomaly`] entry.
pub fn detect_anomalies(summary: &ReportSummary, settings: &AnomalySettings) -> Vec<Anomaly> {
    let mut anomalies = Vec::new();

    if let Some(declines) = summary.metric(DECLINED_TXNS) {
        if declines.mean > settings.decline_threshold {
            anomalies.push(Anomaly {
                kind: AnomalyKind::AuthDeclineSpike,
                severity: Severity::High,
                metric: Some(DECLINED_TXNS.to_string()),
                message: format!(
                    "High average authorization declines detected ({:.0})",
                    declines.mean
                ),
            });
        }
    }

    if let Some(delay) = summary.metric(DELAY_HOURS) {
        if delay.mean > settings.delay_threshold_hours {
            anomalies.push(Anomaly {
                kind: AnomalyKind::SettlementDelay,
                severity: Severity::Medium,
                metric: Some(DELAY_HOURS.to_string()),
                message: format!(
                    "Settlement delays unusually high (avg {:.1} hrs)",
                    delay.mean
                ),
            });
        }
    }

    if anomalies.is_empty() {
        debug!(report_type = %summary.report_type, "No anomalies");
        anomalies.push(Anomaly::none());
    } else {
        info!(
            report_type = %summary.report_type,
            count = anomalies.len(),
            "Anomalies detected"
        );
    }

    anomalies
}
