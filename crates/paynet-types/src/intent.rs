//! Query intent for chat questions about payment-network reports.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What a chat question is about.
///
/// Prefixed onto the retrieval query so tagged report text on the same
/// subject ranks closer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryIntent {
    /// Issuer behaviour, approval rates, decline patterns
    AuthTrends,

    /// Clearing, settlement latency, reconciliation
    SettlementAnalysis,

    /// End-to-end network health and throughput
    PerformanceReport,

    /// Concrete operational actions
    OptimizationRecommendation,

    /// No specific signal
    #[default]
    General,
}

impl QueryIntent {
    /// Returns the wire name for this intent.
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryIntent::AuthTrends => "AUTH_TRENDS",
            QueryIntent::SettlementAnalysis => "SETTLEMENT_ANALYSIS",
            QueryIntent::PerformanceReport => "PERFORMANCE_REPORT",
            QueryIntent::OptimizationRecommendation => "OPTIMIZATION_RECOMMENDATION",
            QueryIntent::General => "GENERAL",
        }
    }

    /// Retrieval query for a chat question: `INTENT: question`.
    pub fn compose_query(&self, query: &str) -> String {
        format!("{}: {}", self.as_str(), query)
    }
}

impl fmt::Display for QueryIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
