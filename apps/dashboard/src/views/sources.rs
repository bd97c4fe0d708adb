//! Best-effort composition of independent upstream sources.
//!
//! Sources are fetched together; each one that fails degrades to `None` and
//! is named in `degraded`. Only when every source fails does the screen fail.

use serde::Serialize;
use tracing::warn;

use crate::analysis_client::{AnalysisApi, HistoryResponse, MetricsResponse, ServiceError};
use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Metrics,
    History,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Metrics => "metrics",
            Source::History => "history",
        }
    }
}

pub struct Sources {
    pub metrics: Option<MetricsResponse>,
    pub history: Option<HistoryResponse>,
    pub degraded: Vec<Source>,
}

/// Fetches metrics and history concurrently.
pub async fn fetch_metrics_and_history(api: &dyn AnalysisApi) -> Result<Sources, AppError> {
    let (metrics, history) = tokio::join!(api.metrics(), api.history());

    let mut failures = Vec::new();
    let metrics = settle(Source::Metrics, metrics, &mut failures);
    let history = settle(Source::History, history, &mut failures);

    if metrics.is_none() && history.is_none() {
        let detail = failures
            .iter()
            .map(|(source, message)| format!("{}: {}", source.as_str(), message))
            .collect::<Vec<_>>()
            .join("; ");
        return Err(AppError::SourcesUnavailable(detail));
    }

    Ok(Sources {
        metrics,
        history,
        degraded: failures.into_iter().map(|(source, _)| source).collect(),
    })
}

fn settle<T>(
    source: Source,
    result: Result<T, ServiceError>,
    failures: &mut Vec<(Source, String)>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(source = source.as_str(), "Source unavailable, continuing without it: {e}");
            failures.push((source, e.to_string()));
            None
        }
    }
}
