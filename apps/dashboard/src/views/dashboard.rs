use serde::Serialize;

use crate::analysis_client::{HistoryResponse, MetricsResponse, UnreadableRun};
use crate::insights::{
    aggregate, format_rate, normalize_runs, DashboardStats, MalformedRecord, NormalizedResult,
};
use crate::views::sources::Source;

/// Home screen: system gauges, the latest results and their summary.
#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub system_metrics: Option<MetricsResponse>,
    pub total_runs: u64,
    pub recent: Vec<NormalizedResult>,
    pub stats: DashboardStats,
    /// `stats.classification_rate` with two decimals, e.g. `"92.50%"`.
    pub classification_rate_display: String,
    pub skipped: Vec<MalformedRecord>,
    /// History entries that were not readable run records at all.
    pub unreadable: Vec<UnreadableRun>,
    pub degraded: Vec<Source>,
}

/// Flattens the first `recent_runs` runs of `history` and summarizes them.
pub fn build_dashboard(
    metrics: Option<MetricsResponse>,
    history: Option<&HistoryResponse>,
    recent_runs: usize,
    degraded: Vec<Source>,
) -> DashboardView {
    let runs = history.map(|h| h.runs.as_slice()).unwrap_or_default();
    let batch = normalize_runs(runs.iter().take(recent_runs));
    let stats = aggregate(&batch.results);

    DashboardView {
        system_metrics: metrics,
        total_runs: history.map(|h| h.total_runs).unwrap_or(0),
        recent: batch.results,
        stats,
        classification_rate_display: format_rate(stats.classification_rate),
        skipped: batch.skipped,
        unreadable: history.map(|h| h.unreadable.clone()).unwrap_or_default(),
        degraded,
    }
}
