use std::str::FromStr;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the external analysis service, without a trailing slash.
    pub analysis_api_url: String,
    pub port: u16,
    pub rust_log: String,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    /// Most recent runs flattened into the dashboard's recent list.
    pub recent_runs: usize,
    /// Most recent runs that get an individual report.
    pub report_runs: usize,
    pub max_upload_mb: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            analysis_api_url: require_env("ANALYSIS_API_URL")?
                .trim_end_matches('/')
                .to_string(),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", 60)?,
            max_retries: parse_env("MAX_RETRIES", 3)?,
            recent_runs: parse_env("RECENT_RUNS", 4)?,
            report_runs: parse_env("REPORT_RUNS", 3)?,
            max_upload_mb: parse_env("MAX_UPLOAD_MB", 10)?,
        })
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            analysis_api_url: "http://localhost:5000".to_string(),
            port: 8080,
            rust_log: "info".to_string(),
            request_timeout_secs: 60,
            max_retries: 3,
            recent_runs: 4,
            report_runs: 3,
            max_upload_mb: 10,
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
