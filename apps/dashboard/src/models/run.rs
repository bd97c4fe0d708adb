//! Raw analysis-run records as returned by the external analysis service.
//!
//! The service's JSON is loosely typed: sub-objects come and go, `null` and
//! "absent" mean the same thing, and the shape of a run depends on its
//! `mode`. Everything here is parsed leniently (unknown fields are ignored)
//! and the per-field default policy lives in one place: the accessors on
//! [`DocumentAnalysis`].

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const DEFAULT_CATEGORY: &str = "Unknown";
pub const DEFAULT_STATUS: &str = "completed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    Single,
    Batch,
    #[serde(other)]
    Unrecognized,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Single => "single",
            RunMode::Batch => "batch",
            RunMode::Unrecognized => "unrecognized",
        }
    }
}

/// Reads an optional field, treating a value of the wrong shape like an
/// absent one. Only `id` decides whether a record is usable, so an odd
/// sub-object must not make the whole run unreadable.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

// ────────────────────────────────────────────────────────────────────────────
// Per-document sub-objects
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassificationResults {
    #[serde(default, deserialize_with = "lenient")]
    pub predicted_category: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub confidence: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub category_probabilities: Option<BTreeMap<String, f64>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TurnoverPrediction {
    #[serde(default, deserialize_with = "lenient")]
    pub leave_probability: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContextualAnalysis {
    #[serde(default, deserialize_with = "lenient")]
    pub risk_level: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub recommendations: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TurnoverResults {
    #[serde(default, deserialize_with = "lenient")]
    pub prediction: Option<TurnoverPrediction>,
    #[serde(default, deserialize_with = "lenient")]
    pub contextual_analysis: Option<ContextualAnalysis>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FontStatistics {
    #[serde(default, deserialize_with = "lenient")]
    pub total_spans: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub white_text_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub unique_fonts: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Intent {
    #[serde(default, deserialize_with = "lenient")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IntentAnalysis {
    #[serde(default, deserialize_with = "lenient")]
    pub top_intents: Option<Vec<Intent>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndustryTerms {
    #[serde(default, deserialize_with = "lenient")]
    pub term_count: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SemanticDetail {
    #[serde(default, deserialize_with = "lenient")]
    pub intent: Option<IntentAnalysis>,
    #[serde(default, deserialize_with = "lenient")]
    pub industry_terms: Option<IndustryTerms>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SemanticAnalysis {
    #[serde(default, deserialize_with = "lenient")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub analysis: Option<SemanticDetail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WhitefontingResults {
    #[serde(default, deserialize_with = "lenient")]
    pub has_white_text: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub font_statistics: Option<FontStatistics>,
    #[serde(default, deserialize_with = "lenient")]
    pub semantic_analysis: Option<SemanticAnalysis>,
    #[serde(default, deserialize_with = "lenient")]
    pub white_text_content: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileMetadata {
    #[serde(default, deserialize_with = "lenient")]
    pub file_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub page_count: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SkillsSection {
    #[serde(default, deserialize_with = "lenient")]
    pub skills: Option<Vec<String>>,
}

/// The analysis payload of one document. Single runs carry it at the top
/// level; batch runs carry one per entry of `files_processed`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentAnalysis {
    #[serde(default, deserialize_with = "lenient")]
    pub classification_results: Option<ClassificationResults>,
    #[serde(default, deserialize_with = "lenient")]
    pub turnover_results: Option<TurnoverResults>,
    #[serde(default, deserialize_with = "lenient")]
    pub whitefonting_results: Option<WhitefontingResults>,
    #[serde(default, deserialize_with = "lenient")]
    pub file: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub file_metadata: Option<FileMetadata>,
    #[serde(default, deserialize_with = "lenient")]
    pub skills: Option<SkillsSection>,
}

impl DocumentAnalysis {
    pub fn category(&self) -> &str {
        self.classification_results
            .as_ref()
            .and_then(|c| c.predicted_category.as_deref())
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CATEGORY)
    }

    pub fn confidence(&self) -> f64 {
        self.classification_results
            .as_ref()
            .and_then(|c| c.confidence)
            .unwrap_or(0.0)
    }

    /// Missing prediction reads as probability 0, i.e. Low risk.
    pub fn leave_probability(&self) -> f64 {
        self.turnover_results
            .as_ref()
            .and_then(|t| t.prediction.as_ref())
            .and_then(|p| p.leave_probability)
            .unwrap_or(0.0)
    }

    pub fn has_white_text(&self) -> bool {
        self.whitefonting_results
            .as_ref()
            .and_then(|w| w.has_white_text)
            .unwrap_or(false)
    }

    pub fn category_probabilities(&self) -> Vec<(&str, f64)> {
        self.classification_results
            .as_ref()
            .and_then(|c| c.category_probabilities.as_ref())
            .map(|probs| probs.iter().map(|(k, v)| (k.as_str(), *v)).collect())
            .unwrap_or_default()
    }

    pub fn recommendations(&self) -> &[String] {
        self.contextual_analysis()
            .and_then(|c| c.recommendations.as_deref())
            .unwrap_or(&[])
    }

    /// Risk label as computed by the service itself. Informational only;
    /// the dashboard derives its own tier from the probability.
    pub fn service_risk_level(&self) -> Option<&str> {
        self.contextual_analysis()
            .and_then(|c| c.risk_level.as_deref())
    }

    pub fn skills(&self) -> &[String] {
        self.skills
            .as_ref()
            .and_then(|s| s.skills.as_deref())
            .unwrap_or(&[])
    }

    fn contextual_analysis(&self) -> Option<&ContextualAnalysis> {
        self.turnover_results
            .as_ref()
            .and_then(|t| t.contextual_analysis.as_ref())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Runs
// ────────────────────────────────────────────────────────────────────────────

/// One entry of a batch run's `files_processed`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileRecord {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub analysis: DocumentAnalysis,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnoverRiskSummary {
    #[serde(default, deserialize_with = "lenient")]
    pub high_risk_count: Option<u64>,
}

/// Aggregate counts precomputed by the service for batch runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    #[serde(default, deserialize_with = "lenient")]
    pub whitefonting_detections: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub turnover_risk: Option<TurnoverRiskSummary>,
    #[serde(default, deserialize_with = "lenient")]
    pub completed_files: Option<u64>,
}

/// Exactly one of these is the source of per-document data for a run.
#[derive(Debug, Clone)]
pub enum RunKind {
    Single(DocumentAnalysis),
    Batch {
        files_processed: Vec<FileRecord>,
        summary: Option<BatchSummary>,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(from = "RawRun")]
pub struct AnalysisRun {
    pub id: Option<String>,
    pub status: Option<String>,
    pub created_at: Option<String>,
    pub kind: RunKind,
}

impl AnalysisRun {
    /// Reads a run whose `mode` may be omitted, treating an omitted mode as
    /// `default_mode`. Used for endpoint responses whose mode is implied by
    /// the endpoint itself.
    pub fn from_value_with_mode(
        value: serde_json::Value,
        default_mode: RunMode,
    ) -> Result<Self, serde_json::Error> {
        let raw: RawRun = serde_json::from_value(value)?;
        Ok(raw.into_run(default_mode))
    }

    pub fn mode(&self) -> RunMode {
        match self.kind {
            RunKind::Single(_) => RunMode::Single,
            RunKind::Batch { .. } => RunMode::Batch,
        }
    }

    pub fn status(&self) -> &str {
        self.status.as_deref().unwrap_or(DEFAULT_STATUS)
    }

    pub fn summary(&self) -> Option<&BatchSummary> {
        match &self.kind {
            RunKind::Batch { summary, .. } => summary.as_ref(),
            RunKind::Single(_) => None,
        }
    }
}

/// Wire shape before the mode tag is resolved.
#[derive(Debug, Deserialize)]
struct RawRun {
    #[serde(default, deserialize_with = "lenient")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    mode: Option<RunMode>,
    #[serde(default, deserialize_with = "lenient")]
    status: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    created_at: Option<String>,
    files_processed: Option<Vec<FileRecord>>,
    #[serde(default, deserialize_with = "lenient")]
    summary: Option<BatchSummary>,
    #[serde(flatten)]
    analysis: DocumentAnalysis,
}

impl RawRun {
    fn into_run(self, default_mode: RunMode) -> AnalysisRun {
        let mode = match self.mode {
            Some(RunMode::Unrecognized) | None => default_mode,
            Some(mode) => mode,
        };
        let kind = match mode {
            RunMode::Batch => RunKind::Batch {
                files_processed: self.files_processed.unwrap_or_default(),
                summary: self.summary,
            },
            RunMode::Single | RunMode::Unrecognized => RunKind::Single(self.analysis),
        };
        AnalysisRun {
            id: self.id,
            status: self.status,
            created_at: self.created_at,
            kind,
        }
    }
}

impl From<RawRun> for AnalysisRun {
    fn from(raw: RawRun) -> Self {
        raw.into_run(RunMode::Single)
    }
}
