use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::analysis_client::{HistoryResponse, MetricsResponse, UnreadableRun};
use crate::insights::{aggregate, normalize, normalize_runs, DashboardStats, MalformedRecord};
use crate::models::{AnalysisRun, RunMode};
use crate::views::sources::Source;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReportKind {
    #[serde(rename = "Batch Report")]
    Batch,
    #[serde(rename = "Individual Report")]
    Individual,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub id: String,
    pub title: String,
    pub kind: ReportKind,
    pub date: NaiveDate,
    pub resume_count: usize,
    pub white_text_detected: usize,
    pub high_risk_count: usize,
    pub status: String,
}

impl Report {
    fn from_stats(
        id: String,
        title: String,
        kind: ReportKind,
        date: NaiveDate,
        stats: &DashboardStats,
        status: &str,
    ) -> Self {
        Self {
            id,
            title,
            kind,
            date,
            resume_count: stats.total_resumes,
            white_text_detected: stats.white_text_detected(),
            high_risk_count: stats.high_turnover_risk,
            status: status.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReportsView {
    pub reports: Vec<Report>,
    pub total_reports: usize,
    /// Sum of `resume_count` across the individual reports.
    pub resumes_analyzed: usize,
    pub stats: DashboardStats,
    pub system_metrics: Option<MetricsResponse>,
    pub skipped: Vec<MalformedRecord>,
    pub unreadable: Vec<UnreadableRun>,
    pub degraded: Vec<Source>,
}

/// One aggregate report over every readable run, followed by an individual
/// report for each of the first `report_runs` runs. Deterministic for a
/// given `history` and `today`.
pub fn build_reports(
    history: Option<&HistoryResponse>,
    metrics: Option<MetricsResponse>,
    report_runs: usize,
    today: NaiveDate,
    degraded: Vec<Source>,
) -> ReportsView {
    let runs = history.map(|h| h.runs.as_slice()).unwrap_or_default();
    let batch = normalize_runs(runs);
    let stats = aggregate(&batch.results);

    let mut reports = Vec::new();
    if !runs.is_empty() {
        reports.push(Report::from_stats(
            format!("batch_{}", today.format("%Y%m%d")),
            "Latest Batch Analysis".to_string(),
            ReportKind::Batch,
            today,
            &stats,
            "completed",
        ));
    }

    let individual: Vec<Report> = runs
        .iter()
        .take(report_runs)
        .filter_map(|run| individual_report(run, today))
        .collect();
    let resumes_analyzed = individual.iter().map(|r| r.resume_count).sum();
    reports.extend(individual);

    ReportsView {
        total_reports: reports.len(),
        reports,
        resumes_analyzed,
        stats,
        system_metrics: metrics,
        skipped: batch.skipped,
        unreadable: history.map(|h| h.unreadable.clone()).unwrap_or_default(),
        degraded,
    }
}

/// Malformed runs were already recorded by `normalize_runs` and get no report.
fn individual_report(run: &AnalysisRun, today: NaiveDate) -> Option<Report> {
    let results = normalize(run).ok()?;
    let id = run.id.as_deref()?;
    let title = match run.mode() {
        RunMode::Batch => format!("Batch {id} Analysis"),
        _ => format!("Resume {id} Analysis"),
    };
    Some(Report::from_stats(
        format!("individual_{id}"),
        title,
        ReportKind::Individual,
        report_date(run.created_at.as_deref(), today),
        &aggregate(&results),
        run.status(),
    ))
}

/// Calendar date of a service timestamp, or `today` if it cannot be read.
pub fn report_date(created_at: Option<&str>, today: NaiveDate) -> NaiveDate {
    let Some(raw) = created_at.map(str::trim).filter(|s| !s.is_empty()) else {
        return today;
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.date_naive();
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return dt.date();
        }
    }
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        .unwrap_or(today)
}
