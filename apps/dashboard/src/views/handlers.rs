//! Axum route handlers for the read-only screens.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use tracing::debug;

use crate::analysis_client::HealthResponse;
use crate::errors::AppError;
use crate::insights::FilterCriteria;
use crate::state::AppState;
use crate::views::dashboard::{build_dashboard, DashboardView};
use crate::views::detail::{build_detail, ResumeDetail};
use crate::views::reports::{build_reports, ReportsView};
use crate::views::results::{build_results, ResultsView};
use crate::views::sources::fetch_metrics_and_history;

/// GET /api/v1/service/health
pub async fn handle_service_health(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, AppError> {
    Ok(Json(state.api.health().await?))
}

/// GET /api/v1/dashboard
///
/// Metrics and history are fetched in parallel. Either one may be missing
/// from the response; 503 only if both are.
pub async fn handle_dashboard(
    State(state): State<AppState>,
) -> Result<Json<DashboardView>, AppError> {
    let sources = fetch_metrics_and_history(state.api.as_ref()).await?;
    Ok(Json(build_dashboard(
        sources.metrics,
        sources.history.as_ref(),
        state.config.recent_runs,
        sources.degraded,
    )))
}

/// GET /api/v1/results?search=&category=&risk_level=
pub async fn handle_results(
    State(state): State<AppState>,
    Query(criteria): Query<FilterCriteria>,
) -> Result<Json<ResultsView>, AppError> {
    let history = state.api.history().await?;
    debug!(
        runs = history.runs.len(),
        filtered = !criteria.is_identity(),
        "Building results view"
    );
    Ok(Json(build_results(&history, criteria)?))
}

/// GET /api/v1/results/:id
pub async fn handle_result_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ResumeDetail>, AppError> {
    let what = format!("Resume {id}");
    let run = state
        .api
        .analysis(&id)
        .await
        .map_err(|e| AppError::from_lookup(e, &what))?
        .ok_or_else(|| AppError::NotFound(format!("{what} not found")))?;

    Ok(Json(build_detail(&run, &id)?))
}

/// GET /api/v1/reports
pub async fn handle_reports(
    State(state): State<AppState>,
) -> Result<Json<ReportsView>, AppError> {
    let sources = fetch_metrics_and_history(state.api.as_ref()).await?;
    Ok(Json(build_reports(
        sources.history.as_ref(),
        sources.metrics,
        state.config.report_runs,
        Utc::now().date_naive(),
        sources.degraded,
    )))
}
