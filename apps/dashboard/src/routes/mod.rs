pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::uploads::handlers as uploads;
use crate::views::handlers as views;

pub fn build_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes());

    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/service/health",
            get(views::handle_service_health),
        )
        // Screens
        .route("/api/v1/dashboard", get(views::handle_dashboard))
        .route("/api/v1/results", get(views::handle_results))
        .route("/api/v1/results/:id", get(views::handle_result_detail))
        .route("/api/v1/reports", get(views::handle_reports))
        // Uploads
        .route("/api/v1/analyze", post(uploads::handle_analyze))
        .route("/api/v1/batch", post(uploads::handle_batch))
        .route("/api/v1/samples", post(uploads::handle_samples))
        .layer(body_limit)
        .with_state(state)
}
