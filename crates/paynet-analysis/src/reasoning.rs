//! Deterministic explanations and follow-up actions for a chat answer.
//!
//! [`explain`] turns an intent and the retrieved context into a short
//! operational explanation. [`recommend_actions`] maps that explanation to
//! owner-assigned actions by keyword.

use paynet_types::QueryIntent;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::anomaly::Severity;

const AUTH_DECLINING: &str = "Authorization approval rates have deteriorated due to issuer-side \
     risk tightening, resulting in elevated decline volumes across the network.";
const AUTH_STABLE: &str = "Authorization behavior remains stable, with no material deviation \
     in issuer approval patterns.";
const SETTLEMENT_DELAYED: &str = "Settlement delays are observed despite stable authorization \
     volumes, indicating bottlenecks in clearing or regional settlement windows.";
const SETTLEMENT_NOMINAL: &str = "Settlement processing remains within expected thresholds with \
     no significant downstream latency detected.";
const PERFORMANCE: &str = "Overall network performance reflects upstream authorization \
     variability cascading into downstream settlement efficiency and throughput.";
const OPTIMIZATION: &str = "Optimizing issuer retry logic and aligning regional settlement \
     batching windows can stabilize throughput and reduce processing latency.";
const GENERAL: &str = "Payment network behavior indicates upstream authorization dynamics \
     influencing downstream settlement performance.";

/// Explanation for `intent` given the retrieved `context`.
///
/// Authorization and settlement answers depend on whether the context
/// mentions declines or delays; the other intents have a fixed answer.
pub fn explain(intent: QueryIntent, context: &str) -> String {
    let context = context.to_lowercase();
    let explanation = match intent {
        QueryIntent::AuthTrends if context.contains("decline") => AUTH_DECLINING,
        QueryIntent::AuthTrends => AUTH_STABLE,
        QueryIntent::SettlementAnalysis if context.contains("delay") => SETTLEMENT_DELAYED,
        QueryIntent::SettlementAnalysis => SETTLEMENT_NOMINAL,
        QueryIntent::PerformanceReport => PERFORMANCE,
        QueryIntent::OptimizationRecommendation => OPTIMIZATION,
        QueryIntent::General => GENERAL,
    };
    debug!(intent = %intent, "Explained retrieved context");
    explanation.to_string()
}

/// One recommended operational action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedAction {
    pub action: String,
    pub impact: String,
    pub priority: Severity,
    pub owner: String,
    pub confidence: f64,
}

impl RecommendedAction {
    fn new(action: &str, impact: &str, priority: Severity, owner: &str, confidence: f64) -> Self {
        Self {
            action: action.to_string(),
            impact: impact.to_string(),
            priority,
            owner: owner.to_string(),
            confidence,
        }
    }
}

/// Actions for an explanation, highest priority first.
///
/// Never empty: without a decline or settlement signal the answer is to
/// keep monitoring.
pub fn recommend_actions(explanation: &str) -> Vec<RecommendedAction> {
    let text = explanation.to_lowercase();
    let mut actions = Vec::new();

    if text.contains("decline") {
        actions.push(RecommendedAction::new(
            "Review authorization rules and retry logic",
            "Increase approval rates and transaction throughput",
            Severity::High,
            "Authorization Operations",
            0.85,
        ));
    }

    if text.contains("settlement") || text.contains("delay") {
        actions.push(RecommendedAction::new(
            "Optimize settlement batching and regional clearing schedules",
            "Reduce settlement delays and reconciliation issues",
            Severity::Medium,
            "Settlement Operations",
            0.75,
        ));
    }

    if actions.is_empty() {
        actions.push(RecommendedAction::new(
            "Continue monitoring network metrics",
            "No immediate operational risk detected",
            Severity::Low,
            "Network Monitoring",
            0.60,
        ));
    }

    actions
}
