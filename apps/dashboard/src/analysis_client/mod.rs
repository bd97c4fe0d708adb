//! Analysis client: the single point of entry for calls to the external
//! resume-analysis service.
//!
//! No other module talks to the service directly. Handlers depend on the
//! [`AnalysisApi`] trait, carried in `AppState` as `Arc<dyn AnalysisApi>`,
//! so they can be exercised against an in-memory fake.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::AnalysisRun;

pub mod types;

pub use types::{
    AnalysisOptions, HealthResponse, HistoryResponse, MetricsResponse, UnreadableRun, Upload,
};

use types::{AnalysisEnvelope, RawHistory};

/// First retry delay; doubles on every further attempt.
const BASE_BACKOFF_MS: u64 = 500;
const MAX_BACKOFF_MS: u64 = 8_000;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response from analysis service: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid upload: {0}")]
    Upload(String),
}

impl ServiceError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ServiceError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// The endpoints of the external analysis service.
#[async_trait]
pub trait AnalysisApi: Send + Sync {
    async fn health(&self) -> Result<HealthResponse, ServiceError>;

    async fn metrics(&self) -> Result<MetricsResponse, ServiceError>;

    /// Runs a single-document analysis. The response is arbitrary JSON
    /// carrying at least an `id`.
    async fn analyze(
        &self,
        upload: Upload,
        options: AnalysisOptions,
    ) -> Result<Value, ServiceError>;

    /// Runs a batch analysis. The response carries `files_processed`.
    async fn batch(
        &self,
        uploads: Vec<Upload>,
        options: AnalysisOptions,
    ) -> Result<Value, ServiceError>;

    async fn history(&self) -> Result<HistoryResponse, ServiceError>;

    /// `Ok(None)` when the service answers but has no data for `id`.
    async fn analysis(&self, id: &str) -> Result<Option<AnalysisRun>, ServiceError>;

    async fn generate_samples(&self) -> Result<Value, ServiceError>;
}

/// `reqwest`-backed [`AnalysisApi`].
///
/// Idempotent GETs are retried on transport errors, 429 and 5xx with
/// exponential backoff. POSTs are sent exactly once.
#[derive(Clone)]
pub struct AnalysisClient {
    client: Client,
    base_url: String,
    max_retries: u32,
}

impl AnalysisClient {
    pub fn new(base_url: &str, timeout: Duration, max_retries: u32) -> Result<Self, ServiceError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries: max_retries.max(1),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        fallback: &str,
    ) -> Result<T, ServiceError> {
        let mut last_error: Option<ServiceError> = None;

        for attempt in 0..self.max_retries {
            if attempt > 0 {
                let delay = backoff_delay(attempt);
                warn!(
                    "GET {} attempt {} failed, retrying after {}ms...",
                    path,
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self.client.get(self.url(path)).send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(ServiceError::Http(e));
                    continue;
                }
            };

            let status = response.status();
            if status.as_u16() == 429 || status.is_server_error() {
                let error = api_error(response, fallback).await;
                warn!("Analysis service returned {} for GET {}", status, path);
                last_error = Some(error);
                continue;
            }

            return read_json(response, fallback).await;
        }

        Err(last_error.unwrap_or_else(|| ServiceError::Api {
            status: 503,
            message: fallback.to_string(),
        }))
    }

    async fn post_json(
        &self,
        request: RequestBuilder,
        fallback: &str,
    ) -> Result<Value, ServiceError> {
        let response = request.send().await?;
        read_json(response, fallback).await
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path))
    }
}

/// Exponential backoff before retry `attempt` (1-based), capped at
/// `MAX_BACKOFF_MS`.
fn backoff_delay(attempt: u32) -> Duration {
    let factor = 1u64.checked_shl(attempt.saturating_sub(1)).unwrap_or(u64::MAX);
    Duration::from_millis(BASE_BACKOFF_MS.saturating_mul(factor).min(MAX_BACKOFF_MS))
}

/// Decodes a 2xx body, or turns a non-2xx response into [`ServiceError::Api`].
async fn read_json<T: DeserializeOwned>(
    response: Response,
    fallback: &str,
) -> Result<T, ServiceError> {
    if !response.status().is_success() {
        return Err(api_error(response, fallback).await);
    }
    let url = response.url().clone();
    let body = response.bytes().await?;
    debug!("Analysis service responded: url={}, bytes={}", url, body.len());
    Ok(serde_json::from_slice(&body)?)
}

async fn api_error(response: Response, fallback: &str) -> ServiceError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    ServiceError::Api {
        status,
        message: error_message(&body).unwrap_or_else(|| fallback.to_string()),
    }
}

/// Extracts the service's `error` message from an error body, accepting both
/// `{"error": "..."}` and `{"error": {"message": "..."}}`.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let error = value.get("error")?;
    let message = match error {
        Value::String(s) => s.as_str(),
        other => other.get("message")?.as_str()?,
    };
    let message = message.trim();
    (!message.is_empty()).then(|| message.to_string())
}

fn file_part(upload: Upload) -> Result<multipart::Part, ServiceError> {
    let part = multipart::Part::bytes(upload.bytes.to_vec()).file_name(upload.file_name);
    match upload.content_type {
        Some(content_type) => part
            .mime_str(&content_type)
            .map_err(|e| ServiceError::Upload(format!("invalid content type {content_type}: {e}"))),
        None => Ok(part),
    }
}

fn with_options(mut form: multipart::Form, options: AnalysisOptions) -> multipart::Form {
    for (name, value) in options.fields() {
        form = form.text(name, value.to_string());
    }
    form
}

#[async_trait]
impl AnalysisApi for AnalysisClient {
    async fn health(&self) -> Result<HealthResponse, ServiceError> {
        self.get_json("health", "API health check failed").await
    }

    async fn metrics(&self) -> Result<MetricsResponse, ServiceError> {
        self.get_json("metrics", "Failed to fetch metrics").await
    }

    async fn analyze(
        &self,
        upload: Upload,
        options: AnalysisOptions,
    ) -> Result<Value, ServiceError> {
        let form = multipart::Form::new().part("file_path", file_part(upload)?);
        let request = self.post("analyze").multipart(with_options(form, options));
        self.post_json(request, "Failed to analyze resume").await
    }

    async fn batch(
        &self,
        uploads: Vec<Upload>,
        options: AnalysisOptions,
    ) -> Result<Value, ServiceError> {
        let mut form = multipart::Form::new();
        for upload in uploads {
            form = form.part("files", file_part(upload)?);
        }
        let request = self.post("batch").multipart(with_options(form, options));
        self.post_json(request, "Failed to batch analyze resumes").await
    }

    async fn history(&self) -> Result<HistoryResponse, ServiceError> {
        let raw: RawHistory = self
            .get_json("history", "Failed to fetch analysis history")
            .await?;
        Ok(raw.into())
    }

    async fn analysis(&self, id: &str) -> Result<Option<AnalysisRun>, ServiceError> {
        let path = format!("analysis/{}", urlencoding::encode(id));
        let envelope: AnalysisEnvelope = self.get_json(&path, "Failed to fetch resume").await?;
        Ok(envelope.data)
    }

    async fn generate_samples(&self) -> Result<Value, ServiceError> {
        self.post_json(self.post("generate-samples"), "Failed to generate samples")
            .await
    }
}

#[cfg(test)]
pub mod testing;
