//! In-memory [`AnalysisApi`] for handler and view tests.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::types::{AnalysisEnvelope, RawHistory};
use super::{
    AnalysisApi, AnalysisOptions, HealthResponse, HistoryResponse, MetricsResponse, ServiceError,
    Upload,
};
use crate::models::AnalysisRun;

/// Canned responses keyed by endpoint. `None` makes the endpoint fail with
/// a 503 carrying `"<endpoint> unavailable"`.
#[derive(Default)]
pub struct FakeAnalysisApi {
    pub metrics: Option<Value>,
    pub history: Option<Value>,
    /// `/analysis/{id}` response bodies (`{"data": ...}`), looked up by id.
    pub analyses: Vec<(String, Value)>,
    pub analyze_response: Option<Value>,
    pub batch_response: Option<Value>,
    /// File names and options received by `analyze` / `batch`.
    pub uploads: Mutex<Vec<(Vec<String>, AnalysisOptions)>>,
}

fn unavailable(endpoint: &str) -> ServiceError {
    ServiceError::Api {
        status: 503,
        message: format!("{endpoint} unavailable"),
    }
}

fn decode<T: serde::de::DeserializeOwned>(value: &Value) -> Result<T, ServiceError> {
    Ok(serde_json::from_value(value.clone())?)
}

impl FakeAnalysisApi {
    pub fn with_history(runs: Value) -> Self {
        let total = runs.as_array().map(|r| r.len()).unwrap_or(0);
        Self {
            history: Some(json!({
                "status": "success",
                "total_runs": total,
                "limit": 50,
                "runs": runs
            })),
            metrics: Some(json!({
                "cpu_usage_percent": 21.5,
                "memory": { "used_mb": 512.0, "total_mb": 2048.0, "percent_used": 25.0 },
                "disk": { "used_gb": 10.0, "total_gb": 40.0, "percent_used": 25.0 }
            })),
            ..Default::default()
        }
    }

    fn record(&self, uploads: &[Upload], options: AnalysisOptions) {
        let names = uploads.iter().map(|u| u.file_name.clone()).collect();
        self.uploads.lock().unwrap().push((names, options));
    }
}

#[async_trait]
impl AnalysisApi for FakeAnalysisApi {
    async fn health(&self) -> Result<HealthResponse, ServiceError> {
        decode(&json!({ "status": "healthy", "uptime_seconds": 12.0, "memory_usage_mb": 128.0 }))
    }

    async fn metrics(&self) -> Result<MetricsResponse, ServiceError> {
        self.metrics
            .as_ref()
            .map(decode)
            .unwrap_or_else(|| Err(unavailable("metrics")))
    }

    async fn analyze(
        &self,
        upload: Upload,
        options: AnalysisOptions,
    ) -> Result<Value, ServiceError> {
        self.record(std::slice::from_ref(&upload), options);
        self.analyze_response
            .clone()
            .ok_or_else(|| unavailable("analyze"))
    }

    async fn batch(
        &self,
        uploads: Vec<Upload>,
        options: AnalysisOptions,
    ) -> Result<Value, ServiceError> {
        self.record(&uploads, options);
        self.batch_response.clone().ok_or_else(|| unavailable("batch"))
    }

    async fn history(&self) -> Result<HistoryResponse, ServiceError> {
        let raw: RawHistory = self
            .history
            .as_ref()
            .map(decode)
            .unwrap_or_else(|| Err(unavailable("history")))?;
        Ok(raw.into())
    }

    async fn analysis(&self, id: &str) -> Result<Option<AnalysisRun>, ServiceError> {
        match self.analyses.iter().find(|(key, _)| key == id) {
            Some((_, body)) => decode::<AnalysisEnvelope>(body).map(|envelope| envelope.data),
            None => Err(ServiceError::Api {
                status: 404,
                message: "Failed to fetch resume".to_string(),
            }),
        }
    }

    async fn generate_samples(&self) -> Result<Value, ServiceError> {
        Ok(json!({ "status": "success", "generated": 3 }))
    }
}
