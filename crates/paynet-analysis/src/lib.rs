//! # paynet-analysis
//!
//! Straight-line analysis of uploaded payment-network reports.
//!
//! - [`summary`]: turn a parsed table into a [`ReportSummary`](paynet_types::ReportSummary)
//! - [`anomaly`]: flag decline spikes and settlement delays against thresholds
//! - [`trend`]: average and chart metrics across reports
//! - [`reasoning`]: explain a chat answer and recommend follow-up actions

pub mod anomaly;
pub mod reasoning;
pub mod summary;
pub mod trend;

pub use anomaly::{detect_anomalies, Anomaly, AnomalyKind, Severity, DECLINED_TXNS, DELAY_HOURS};
pub use reasoning::{explain, recommend_actions, RecommendedAction};
pub use summary::{summarize_report, ColumnKind, ReportTable, SUMMARY_SEPARATOR};
pub use trend::{
    mean_metric, metric_trend, AuthorizationStats, DashboardStats, SettlementStats, TrendPoint,
};
