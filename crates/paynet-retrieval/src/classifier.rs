//! Intent classification for chat questions.
//!
//! Ordered keyword rules over the lower-cased query: the first rule with
//! any keyword contained in the query decides the intent. Keywords match
//! as substrings, so `optimiz` covers optimize and optimization.

use serde::{Deserialize, Serialize};
use tracing::debug;

use paynet_types::QueryIntent;

/// Result of intent classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// The classified intent
    pub intent: QueryIntent,

    /// Explanation of why this intent was chosen
    pub reason: String,

    /// Keywords of the winning rule found in the query
    pub matched_keywords: Vec<String>,
}

/// One keyword rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentRule {
    pub intent: QueryIntent,
    pub keywords: Vec<String>,
}

impl IntentRule {
    pub fn new(intent: QueryIntent, keywords: &[&str]) -> Self {
        Self {
            intent,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Configuration for intent classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Rules in priority order
    pub rules: Vec<IntentRule>,

    /// Intent when no rule matches
    pub default_intent: QueryIntent,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            rules: vec![
                IntentRule::new(QueryIntent::AuthTrends, &["authorization", "auth"]),
                IntentRule::new(QueryIntent::SettlementAnalysis, &["settlement", "clearing"]),
                IntentRule::new(QueryIntent::PerformanceReport, &["performance", "network"]),
                IntentRule::new(
                    QueryIntent::OptimizationRecommendation,
                    &["recommend", "optimiz", "action"],
                ),
            ],
            default_intent: QueryIntent::General,
        }
    }
}

/// Intent classifier using ordered keyword rules.
pub struct IntentClassifier {
    config: ClassifierConfig,
}

impl IntentClassifier {
    /// Create a new classifier with default configuration.
    pub fn new() -> Self {
        Self::with_config(ClassifierConfig::default())
    }

    /// Create a classifier with custom configuration.
    /// Keywords are lower-cased once here.
    pub fn with_config(mut config: ClassifierConfig) -> Self {
        for rule in &mut config.rules {
            for keyword in &mut rule.keywords {
                *keyword = keyword.to_lowercase();
            }
        }
        Self { config }
    }

    /// Classify the intent of a query.
    pub fn classify(&self, query: &str) -> ClassificationResult {
        let query_lower = query.to_lowercase();

        for rule in &self.config.rules {
            let matched: Vec<String> = rule
                .keywords
                .iter()
                .filter(|k| query_lower.contains(k.as_str()))
                .cloned()
                .collect();

            if !matched.is_empty() {
                debug!(query = query, intent = %rule.intent, "Intent matched");
                return ClassificationResult {
                    intent: rule.intent,
                    reason: format!(
                        "{} intent: matched keywords [{}]",
                        rule.intent,
                        matched.join(", ")
                    ),
                    matched_keywords: matched,
                };
            }
        }

        ClassificationResult {
            intent: self.config.default_intent,
            reason: format!(
                "No intent keywords; defaulting to {}",
                self.config.default_intent
            ),
            matched_keywords: vec![],
        }
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_auth() {
        let classifier = IntentClassifier::new();

        let result = classifier.classify("Why did authorization declines spike?");
        assert_eq!(result.intent, QueryIntent::AuthTrends);
        assert!(result.matched_keywords.contains(&"authorization".to_string()));

        let result = classifier.classify("AUTH rates in LATAM");
        assert_eq!(result.intent, QueryIntent::AuthTrends);
    }

    #[test]
    fn test_classify_settlement() {
        let classifier = IntentClassifier::new();

        let result = classifier.classify("How long is settlement taking?");
        assert_eq!(result.intent, QueryIntent::SettlementAnalysis);

        let result = classifier.classify("Any clearing backlog?");
        assert_eq!(result.intent, QueryIntent::SettlementAnalysis);
        assert_eq!(result.matched_keywords, vec!["clearing".to_string()]);
    }

    #[test]
    fn test_classify_performance() {
        let classifier = IntentClassifier::new();

        let result = classifier.classify("Give me a network health summary");
        assert_eq!(result.intent, QueryIntent::PerformanceReport);

        let result = classifier.classify("Overall performance this week");
        assert_eq!(result.intent, QueryIntent::PerformanceReport);
    }

    #[test]
    fn test_classify_optimization() {
        let classifier = IntentClassifier::new();

        let result = classifier.classify("What do you recommend?");
        assert_eq!(result.intent, QueryIntent::OptimizationRecommendation);

        let result = classifier.classify("How can we optimize batching?");
        assert_eq!(result.intent, QueryIntent::OptimizationRecommendation);
    }

    #[test]
    fn test_rule_order_wins() {
        let classifier = IntentClassifier::new();

        // auth beats settlement, settlement beats network
        let result = classifier.classify("authorization vs settlement");
        assert_eq!(result.intent, QueryIntent::AuthTrends);

        let result = classifier.classify("settlement network latency");
        assert_eq!(result.intent, QueryIntent::SettlementAnalysis);

        // "transaction" contains "action"
        let result = classifier.classify("transaction volume");
        assert_eq!(result.intent, QueryIntent::OptimizationRecommendation);
    }

    #[test]
    fn test_classify_default() {
        let classifier = IntentClassifier::new();

        let result = classifier.classify("chargeback volume");
        assert_eq!(result.intent, QueryIntent::General);
        assert!(result.matched_keywords.is_empty());
        assert!(result.reason.contains("GENERAL"));
    }

    #[test]
    fn test_custom_config() {
        let mut config = ClassifierConfig::default();
        config.rules.insert(
            0,
            IntentRule::new(QueryIntent::PerformanceReport, &["Latency"]),
        );

        let classifier = IntentClassifier::with_config(config);

        let result = classifier.classify("auth latency in APAC");
        assert_eq!(result.intent, QueryIntent::PerformanceReport);
        assert_eq!(result.matched_keywords, vec!["latency".to_string()]);
    }
}
