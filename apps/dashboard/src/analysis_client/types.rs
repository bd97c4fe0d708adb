use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::models::AnalysisRun;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: Option<String>,
    pub uptime_seconds: Option<f64>,
    pub memory_usage_mb: Option<f64>,
    pub active_endpoints: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryGauge {
    pub used_mb: f64,
    pub total_mb: f64,
    pub available_mb: Option<f64>,
    pub percent_used: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiskGauge {
    pub used_gb: f64,
    pub total_gb: f64,
    pub free_gb: Option<f64>,
    pub percent_used: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsResponse {
    pub cpu_usage_percent: f64,
    pub memory: MemoryGauge,
    pub disk: DiskGauge,
}

/// Wire shape of `GET /history`. Runs are kept as raw JSON so one bad run
/// cannot sink the whole list.
#[derive(Debug, Deserialize)]
pub(crate) struct RawHistory {
    pub total_runs: Option<u64>,
    pub runs: Option<Vec<Value>>,
}

/// A history entry whose JSON is not a run record at all.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnreadableRun {
    /// Index in the service's history list; 0 is the newest run.
    pub position: usize,
    pub run_id: Option<String>,
    pub reason: String,
}

/// Prior runs, most recent first, as ordered by the service.
#[derive(Debug, Clone)]
pub struct HistoryResponse {
    pub total_runs: u64,
    pub runs: Vec<AnalysisRun>,
    pub unreadable: Vec<UnreadableRun>,
}

impl HistoryResponse {
    /// The newest history entry, if it could not be read. When set,
    /// `runs[0]` is an older run.
    pub fn newest_unreadable(&self) -> Option<&UnreadableRun> {
        self.unreadable.first().filter(|u| u.position == 0)
    }
}

impl From<RawHistory> for HistoryResponse {
    fn from(raw: RawHistory) -> Self {
        let mut runs = Vec::new();
        let mut unreadable = Vec::new();

        for (position, value) in raw.runs.unwrap_or_default().into_iter().enumerate() {
            let run_id = value.get("id").and_then(Value::as_str).map(str::to_string);
            match serde_json::from_value::<AnalysisRun>(value) {
                Ok(run) => runs.push(run),
                Err(e) => {
                    warn!(position, "Skipping unreadable history run: {e}");
                    unreadable.push(UnreadableRun {
                        position,
                        run_id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Self {
            total_runs: raw.total_runs.unwrap_or(0),
            runs,
            unreadable,
        }
    }
}

/// Wire shape of `GET /analysis/{id}`.
#[derive(Debug, Deserialize)]
pub(crate) struct AnalysisEnvelope {
    pub data: Option<AnalysisRun>,
}

/// A file to forward to the analysis service.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Optional report toggles. Only the options that are set are sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    pub generate_visuals: Option<bool>,
    pub generate_report: Option<bool>,
    pub generate_dashboard: Option<bool>,
}

impl AnalysisOptions {
    pub const NAMES: [&'static str; 3] =
        ["generate_visuals", "generate_report", "generate_dashboard"];

    pub fn is_option(name: &str) -> bool {
        Self::NAMES.contains(&name)
    }

    pub fn fields(&self) -> Vec<(&'static str, bool)> {
        [
            ("generate_visuals", self.generate_visuals),
            ("generate_report", self.generate_report),
            ("generate_dashboard", self.generate_dashboard),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
        .collect()
    }

    /// Sets an option from a form field. Returns `false` if `name` is not an option.
    pub fn set(&mut self, name: &str, value: bool) -> bool {
        let slot = match name {
            "generate_visuals" => &mut self.generate_visuals,
            "generate_report" => &mut self.generate_report,
            "generate_dashboard" => &mut self.generate_dashboard,
            _ => return false,
        };
        *slot = Some(value);
        true
    }
}
