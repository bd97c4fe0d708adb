use std::cmp::Ordering;

use serde::Serialize;

use crate::errors::AppError;
use crate::insights::{as_percent, classify, format_confidence, risk_factors, RiskAssessment};
use crate::models::run::{FontStatistics, DEFAULT_STATUS};
use crate::models::{AnalysisRun, DocumentAnalysis, RunKind};

const EXCERPT_CHARS: usize = 150;
const UNKNOWN_FILE_TYPE: &str = "Unknown";
const CLEAN_SUMMARY: &str = "The resume does not contain any white text manipulation techniques.";
const MANIPULATED_SUMMARY: &str = "Hidden white text was detected in this resume.";

#[derive(Debug, Serialize)]
pub struct CategoryProbability {
    pub category: String,
    pub probability: f64,
    pub display: String,
}

#[derive(Debug, Serialize)]
pub struct ClassificationDetail {
    pub category: String,
    pub confidence: f64,
    pub confidence_display: String,
    /// Non-zero probabilities, highest first.
    pub probabilities: Vec<CategoryProbability>,
}

#[derive(Debug, Serialize)]
pub struct TurnoverDetail {
    pub risk: RiskAssessment,
    /// Unrounded percentage for progress bars.
    pub leave_probability_percent: f64,
    pub leave_probability_display: String,
    pub risk_factors: Vec<&'static str>,
    pub recommendations: Vec<String>,
    pub service_risk_level: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TopIntent {
    pub label: String,
    pub score_display: String,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Clean,
    Manipulated,
}

#[derive(Debug, Serialize)]
pub struct ManipulationDetail {
    pub has_white_text: bool,
    pub verdict: Verdict,
    pub summary: String,
    pub font_statistics: FontStatistics,
    pub white_text_excerpt: Option<String>,
    pub top_intent: Option<TopIntent>,
    pub industry_term_count: u64,
}

#[derive(Debug, Serialize)]
pub struct FileDetail {
    pub name: Option<String>,
    pub file_type: String,
    pub page_count: u32,
}

/// Per-resume detail screen.
#[derive(Debug, Serialize)]
pub struct ResumeDetail {
    pub id: String,
    pub status: String,
    pub created_at: Option<String>,
    pub classification: ClassificationDetail,
    pub turnover: TurnoverDetail,
    pub manipulation: ManipulationDetail,
    pub file: FileDetail,
    pub skills: Vec<String>,
}

/// Builds the detail view for `requested_id` out of the run the service
/// returned for it. A batch run is searched for the file with that id.
pub fn build_detail(run: &AnalysisRun, requested_id: &str) -> Result<ResumeDetail, AppError> {
    match &run.kind {
        RunKind::Single(analysis) => {
            let id = run.id.as_deref().unwrap_or(requested_id);
            Ok(detail_for(id, run.status(), run.created_at.clone(), analysis))
        }
        RunKind::Batch {
            files_processed, ..
        } => {
            let file = files_processed
                .iter()
                .find(|f| f.id.as_deref() == Some(requested_id));
            match file {
                Some(file) => Ok(detail_for(
                    requested_id,
                    file.status.as_deref().unwrap_or(DEFAULT_STATUS),
                    run.created_at.clone(),
                    &file.analysis,
                )),
                None if run.id.as_deref() == Some(requested_id) => Err(AppError::Validation(format!(
                    "{requested_id} is a batch run; open one of its {} files instead",
                    files_processed.len()
                ))),
                None => Err(AppError::NotFound(format!("Resume {requested_id} not found"))),
            }
        }
    }
}

fn detail_for(
    id: &str,
    status: &str,
    created_at: Option<String>,
    analysis: &DocumentAnalysis,
) -> ResumeDetail {
    ResumeDetail {
        id: id.to_string(),
        status: status.to_string(),
        created_at,
        classification: classification(analysis),
        turnover: turnover(analysis),
        manipulation: manipulation(analysis),
        file: file(analysis),
        skills: analysis.skills().to_vec(),
    }
}

fn classification(analysis: &DocumentAnalysis) -> ClassificationDetail {
    let mut probabilities: Vec<CategoryProbability> = analysis
        .category_probabilities()
        .into_iter()
        .filter(|(_, p)| *p > 0.0)
        .map(|(category, probability)| CategoryProbability {
            category: category.to_string(),
            probability,
            display: format_confidence(probability),
        })
        .collect();
    probabilities.sort_by(|a, b| {
        b.probability
            .partial_cmp(&a.probability)
            .unwrap_or(Ordering::Equal)
    });

    let confidence = analysis.confidence();
    ClassificationDetail {
        category: analysis.category().to_string(),
        confidence,
        confidence_display: format_confidence(confidence),
        probabilities,
    }
}

fn turnover(analysis: &DocumentAnalysis) -> TurnoverDetail {
    let probability = analysis.leave_probability();
    let risk = classify(probability);
    TurnoverDetail {
        risk,
        leave_probability_percent: as_percent(probability),
        leave_probability_display: format_confidence(probability),
        risk_factors: risk_factors(risk.tier).to_vec(),
        recommendations: analysis.recommendations().to_vec(),
        service_risk_level: analysis.service_risk_level().map(str::to_string),
    }
}

fn manipulation(analysis: &DocumentAnalysis) -> ManipulationDetail {
    let has_white_text = analysis.has_white_text();
    let whitefonting = analysis.whitefonting_results.as_ref();
    let semantic = whitefonting.and_then(|w| w.semantic_analysis.as_ref());
    let detail = semantic.and_then(|s| s.analysis.as_ref());

    let summary = semantic
        .and_then(|s| s.summary.as_deref())
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(if has_white_text {
            MANIPULATED_SUMMARY
        } else {
            CLEAN_SUMMARY
        })
        .to_string();

    let top_intent = detail
        .and_then(|d| d.intent.as_ref())
        .and_then(|i| i.top_intents.as_ref())
        .and_then(|intents| {
            intents.iter().find_map(|intent| {
                let label = intent.label.as_deref().filter(|l| !l.trim().is_empty())?;
                Some(TopIntent {
                    label: label.to_string(),
                    score_display: format_confidence(intent.score.unwrap_or(0.0)),
                })
            })
        });

    ManipulationDetail {
        has_white_text,
        verdict: if has_white_text {
            Verdict::Manipulated
        } else {
            Verdict::Clean
        },
        summary,
        font_statistics: whitefonting
            .and_then(|w| w.font_statistics.clone())
            .unwrap_or_default(),
        white_text_excerpt: whitefonting
            .and_then(|w| w.white_text_content.as_deref())
            .filter(|c| !c.is_empty())
            .map(excerpt),
        top_intent,
        industry_term_count: detail
            .and_then(|d| d.industry_terms.as_ref())
            .and_then(|t| t.term_count)
            .unwrap_or(0),
    }
}

fn file(analysis: &DocumentAnalysis) -> FileDetail {
    let metadata = analysis.file_metadata.as_ref();
    FileDetail {
        name: analysis.file.clone(),
        file_type: metadata
            .and_then(|m| m.file_type.clone())
            .unwrap_or_else(|| UNKNOWN_FILE_TYPE.to_string()),
        page_count: metadata.and_then(|m| m.page_count).unwrap_or(1),
    }
}

fn excerpt(content: &str) -> String {
    let mut chars = content.char_indices();
    match chars.nth(EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_string(),
    }
}
