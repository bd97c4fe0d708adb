//! Axum route handlers for forwarding uploads to the analysis service.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::analysis_client::ServiceError;
use crate::errors::AppError;
use crate::insights::{
    aggregate, normalize_runs, DashboardStats, MalformedRecord, NormalizedResult,
};
use crate::models::{AnalysisRun, RunMode};
use crate::state::AppState;
use crate::uploads::read_form;

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub run_id: Option<String>,
    pub results: Vec<NormalizedResult>,
    pub skipped: Vec<MalformedRecord>,
    /// The service's response, untouched.
    pub raw: Value,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub run_id: Option<String>,
    pub results: Vec<NormalizedResult>,
    pub stats: DashboardStats,
    pub skipped: Vec<MalformedRecord>,
    pub raw: Value,
}

struct Normalized {
    run_id: Option<String>,
    results: Vec<NormalizedResult>,
    skipped: Vec<MalformedRecord>,
}

/// Reads a fresh run out of an upload response. The analysis already
/// happened upstream, so a record that cannot be normalized is reported in
/// `skipped` instead of failing the request.
fn normalize_response(raw: &Value, default_mode: RunMode) -> Result<Normalized, AppError> {
    let run = AnalysisRun::from_value_with_mode(raw.clone(), default_mode)
        .map_err(|e| AppError::Upstream(ServiceError::Parse(e)))?;
    let batch = normalize_runs(std::iter::once(&run));
    debug!(
        run_id = run.id.as_deref().unwrap_or_default(),
        mode = run.mode().as_str(),
        results = batch.results.len(),
        "Analysis response normalized"
    );
    Ok(Normalized {
        run_id: run.id,
        results: batch.results,
        skipped: batch.skipped,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/analyze
///
/// Multipart with one `file_path` file and optional report toggles.
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let mut form = read_form(multipart, "file_path").await?;
    if form.files.len() > 1 {
        return Err(AppError::Validation(
            "Only one file can be analyzed at a time; use /api/v1/batch".to_string(),
        ));
    }
    let Some(upload) = form.files.pop() else {
        return Err(AppError::Validation("No 'file_path' file provided".to_string()));
    };

    info!(file = %upload.file_name, "Forwarding single analysis");
    let raw = state.api.analyze(upload, form.options).await?;
    let normalized = normalize_response(&raw, RunMode::Single)?;

    Ok(Json(AnalyzeResponse {
        run_id: normalized.run_id,
        results: normalized.results,
        skipped: normalized.skipped,
        raw,
    }))
}

/// POST /api/v1/batch
///
/// Multipart with repeated `files` parts and optional report toggles.
pub async fn handle_batch(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<BatchResponse>, AppError> {
    let form = read_form(multipart, "files").await?;

    info!(files = form.files.len(), "Forwarding batch analysis");
    let raw = state.api.batch(form.files, form.options).await?;
    let normalized = normalize_response(&raw, RunMode::Batch)?;

    Ok(Json(BatchResponse {
        run_id: normalized.run_id,
        stats: aggregate(&normalized.results),
        results: normalized.results,
        skipped: normalized.skipped,
        raw,
    }))
}

/// POST /api/v1/samples
pub async fn handle_samples(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let response = state.api.generate_samples().await?;
    info!("Sample data generated");
    Ok(Json(response))
}
