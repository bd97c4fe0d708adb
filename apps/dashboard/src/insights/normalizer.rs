//! Run normalizer: flattens single and batch runs into one result per document.
//!
//! Downstream code (stats, filters, views) only ever sees [`NormalizedResult`]
//! and never inspects the run mode.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::insights::risk::{classify, RiskAssessment};
use crate::models::run::{DocumentAnalysis, DEFAULT_STATUS};
use crate::models::{AnalysisRun, RunKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedResult {
    pub id: String,
    pub category: String,
    pub confidence: f64,
    pub turnover_risk: RiskAssessment,
    pub status: String,
    pub has_white_text: bool,
}

impl NormalizedResult {
    fn from_document(id: String, status: Option<&str>, analysis: &DocumentAnalysis) -> Self {
        Self {
            id,
            category: analysis.category().to_string(),
            confidence: analysis.confidence(),
            turnover_risk: classify(analysis.leave_probability()),
            status: status.unwrap_or(DEFAULT_STATUS).to_string(),
            has_white_text: analysis.has_white_text(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("analysis run is missing its id")]
    MissingRunId,

    #[error("file #{position} of run {run_id} is missing its id")]
    MissingFileId { run_id: String, position: usize },
}

/// Flattens one run into its per-document results.
///
/// Batch runs yield one result per `files_processed` entry, in order; single
/// runs yield exactly one. Missing optional sub-objects fall back to their
/// defaults. A missing run id, or a missing id on any batch entry, fails the
/// whole run rather than producing a result nobody can link to.
pub fn normalize(run: &AnalysisRun) -> Result<Vec<NormalizedResult>, NormalizeError> {
    let run_id = run
        .id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or(NormalizeError::MissingRunId)?;

    match &run.kind {
        RunKind::Single(analysis) => Ok(vec![NormalizedResult::from_document(
            run_id.to_string(),
            run.status.as_deref(),
            analysis,
        )]),
        RunKind::Batch {
            files_processed, ..
        } => files_processed
            .iter()
            .enumerate()
            .map(|(position, file)| -> Result<NormalizedResult, NormalizeError> {
                let id = file
                    .id
                    .as_deref()
                    .filter(|id| !id.is_empty())
                    .ok_or_else(|| NormalizeError::MissingFileId {
                        run_id: run_id.to_string(),
                        position,
                    })?;
                Ok(NormalizedResult::from_document(
                    id.to_string(),
                    file.status.as_deref(),
                    &file.analysis,
                ))
            })
            .collect(),
    }
}

/// A run that was left out of a [`NormalizedBatch`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MalformedRecord {
    pub run_id: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizedBatch {
    pub results: Vec<NormalizedResult>,
    pub skipped: Vec<MalformedRecord>,
}

/// Normalizes many runs in order. Malformed runs are skipped and reported
/// in `skipped` instead of failing the whole list.
pub fn normalize_runs<'a, I>(runs: I) -> NormalizedBatch
where
    I: IntoIterator<Item = &'a AnalysisRun>,
{
    let mut batch = NormalizedBatch::default();
    for run in runs {
        match normalize(run) {
            Ok(results) => batch.results.extend(results),
            Err(e) => {
                warn!("Skipping malformed analysis run: {e}");
                batch.skipped.push(MalformedRecord {
                    run_id: run.id.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }
    batch
}
