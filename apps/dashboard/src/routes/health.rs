use axum::Json;
use serde_json::{json, Value};

/// GET /health
/// Liveness of the dashboard itself. Does not call the analysis service;
/// see `/api/v1/service/health` for that.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "dashboard"
    }))
}
