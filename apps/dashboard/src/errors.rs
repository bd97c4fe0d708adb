use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis_client::ServiceError;
use crate::insights::NormalizeError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Analysis service error: {0}")]
    Upstream(#[from] ServiceError),

    #[error("Malformed analysis record: {0}")]
    MalformedRecord(#[from] NormalizeError),

    /// A record the service returned is not a run record at all.
    #[error("Unreadable analysis record: {0}")]
    UnreadableRecord(String),

    /// Every best-effort source behind a screen failed.
    #[error("No data sources available: {0}")]
    SourcesUnavailable(String),
}

impl AppError {
    /// Maps a service error, turning the service's own 404 into ours.
    pub fn from_lookup(err: ServiceError, what: &str) -> Self {
        match err.status() {
            Some(404) => AppError::NotFound(format!("{what} not found")),
            _ => AppError::Upstream(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Upstream(e) => {
                tracing::error!("Analysis service error: {e}");
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", e.to_string())
            }
            AppError::MalformedRecord(e) => {
                tracing::error!("Malformed analysis record: {e}");
                (StatusCode::BAD_GATEWAY, "MALFORMED_RECORD", e.to_string())
            }
            AppError::UnreadableRecord(msg) => {
                tracing::error!("Unreadable analysis record: {msg}");
                (StatusCode::BAD_GATEWAY, "UNREADABLE_RECORD", msg.clone())
            }
            AppError::SourcesUnavailable(msg) => {
                tracing::error!("All data sources failed: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SOURCES_UNAVAILABLE",
                    msg.clone(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
