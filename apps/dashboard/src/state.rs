use std::sync::Arc;

use crate::analysis_client::AnalysisApi;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
/// Holds no per-request data: every view-model is rebuilt from a fresh fetch.
#[derive(Clone)]
pub struct AppState {
    /// The external analysis service. `AnalysisClient` in production.
    pub api: Arc<dyn AnalysisApi>,
    pub config: Config,
}
