//! Cross-report metric aggregation for charts.

use paynet_types::{ReportSummary, ReportType};
use serde::{Deserialize, Serialize};

use crate::anomaly::{DECLINED_TXNS, DELAY_HOURS};

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Average of `metric`'s mean over the summaries that report it, to two
/// decimals. 0 when none do.
pub fn mean_metric<'a, I>(summaries: I, metric: &str) -> f64
where
    I: IntoIterator<Item = &'a ReportSummary>,
{
    let values: Vec<f64> = summaries
        .into_iter()
        .filter_map(|s| s.metric(metric).map(|m| m.mean))
        .collect();

    if values.is_empty() {
        return 0.0;
    }
    round2(values.iter().sum::<f64>() / values.len() as f64)
}

/// One chart point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// 1-based report position
    pub index: usize,
    pub value: f64,
}

/// `metric`'s mean per summary in order; 0 where a summary lacks it.
pub fn metric_trend(summaries: &[ReportSummary], metric: &str) -> Vec<TrendPoint> {
    summaries
        .iter()
        .enumerate()
        .map(|(i, s)| TrendPoint {
            index: i + 1,
            value: s.metric(metric).map(|m| m.mean).unwrap_or(0.0),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthorizationStats {
    pub avg_declines: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SettlementStats {
    pub avg_delay_hours: f64,
}

/// Headline numbers across all uploaded reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub authorization: AuthorizationStats,
    pub settlement: SettlementStats,
}

impl DashboardStats {
    /// Declines are averaged over authorization reports only, delays over
    /// settlement reports only.
    pub fn from_summaries(summaries: &[ReportSummary]) -> Self {
        let of_type = |t: ReportType| summaries.iter().filter(move |s| s.report_type == t);

        Self {
            authorization: AuthorizationStats {
                avg_declines: mean_metric(of_type(ReportType::Authorization), DECLINED_TXNS),
            },
            settlement: SettlementStats {
                avg_delay_hours: mean_metric(of_type(ReportType::Settlement), DELAY_HOURS),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paynet_types::MetricStats;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn summary(report_type: ReportType, metric: &str, mean: f64) -> ReportSummary {
        let mut key_metrics = BTreeMap::new();
        key_metrics.insert(
            metric.to_string(),
            MetricStats {
                mean,
                min: mean,
                max: mean,
            },
        );
        ReportSummary {
            report_type,
            rows: 10,
            columns: vec![metric.to_string()],
            key_metrics,
            text_summary: String::new(),
        }
    }

    #[test]
    fn test_mean_metric_rounds() {
        let summaries = vec![
            summary(ReportType::Authorization, DECLINED_TXNS, 100.0),
            summary(ReportType::Authorization, DECLINED_TXNS, 200.0),
            summary(ReportType::Authorization, DECLINED_TXNS, 201.0),
        ];
        assert_eq!(mean_metric(&summaries, DECLINED_TXNS), 167.0);

        let summaries = vec![
            summary(ReportType::Settlement, DELAY_HOURS, 1.0),
            summary(ReportType::Settlement, DELAY_HOURS, 2.0),
            summary(ReportType::Settlement, DELAY_HOURS, 2.0),
        ];
        assert_eq!(mean_metric(&summaries, DELAY_HOURS), 1.67);
    }

    #[test]
    fn test_mean_metric_ignores_reports_without_metric() {
        let summaries = vec![
            summary(ReportType::Authorization, DECLINED_TXNS, 300.0),
            summary(ReportType::Settlement, DELAY_HOURS, 4.0),
        ];
        assert_eq!(mean_metric(&summaries, DECLINED_TXNS), 300.0);
        assert_eq!(mean_metric(&summaries, "chargebacks"), 0.0);
        assert_eq!(mean_metric(&Vec::<ReportSummary>::new(), DECLINED_TXNS), 0.0);
    }

    #[test]
    fn test_metric_trend_is_one_based_with_gaps() {
        let summaries = vec![
            summary(ReportType::Settlement, DELAY_HOURS, 3.5),
            summary(ReportType::Authorization, DECLINED_TXNS, 420.0),
            summary(ReportType::Settlement, DELAY_HOURS, 6.0),
        ];
        assert_eq!(
            metric_trend(&summaries, DELAY_HOURS),
            vec![
                TrendPoint { index: 1, value: 3.5 },
                TrendPoint { index: 2, value: 0.0 },
                TrendPoint { index: 3, value: 6.0 },
            ]
        );
    }

    #[test]
    fn test_dashboard_filters_by_report_type() {
        let summaries = vec![
            summary(ReportType::Authorization, DECLINED_TXNS, 400.0),
            summary(ReportType::Authorization, DECLINED_TXNS, 600.0),
            // Wrong type for the declines average
            summary(ReportType::Unknown, DECLINED_TXNS, 10_000.0),
            summary(ReportType::Settlement, DELAY_HOURS, 2.25),
        ];

        let stats = DashboardStats::from_summaries(&summaries);
        assert_eq!(stats.authorization.avg_declines, 500.0);
        assert_eq!(stats.settlement.avg_delay_hours, 2.25);
    }

    #[test]
    fn test_dashboard_empty() {
        let stats = DashboardStats::from_summaries(&[]);
        assert_eq!(stats, DashboardStats::default());
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["authorization"]["avg_declines"], 0.0);
        assert_eq!(json["settlement"]["avg_delay_hours"], 0.0);
    }
}
