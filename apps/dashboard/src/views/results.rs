use serde::Serialize;

use crate::analysis_client::HistoryResponse;
use crate::errors::AppError;
use crate::insights::{
    aggregate, apply_filters, categories, normalize, DashboardStats, FilterCriteria,
    NormalizedResult,
};
use crate::models::run::BatchSummary;
use crate::models::RunMode;

/// Results table for the most recent run.
#[derive(Debug, Serialize)]
pub struct ResultsView {
    pub run_id: Option<String>,
    pub mode: Option<RunMode>,
    /// Results that survive `criteria`, in run order.
    pub results: Vec<NormalizedResult>,
    /// Result count before filtering.
    pub total: usize,
    /// Computed over the whole run, not just the filtered rows.
    pub stats: DashboardStats,
    pub categories: Vec<String>,
    /// Counts precomputed by the service, for batch runs that carry them.
    pub service_summary: Option<BatchSummary>,
    pub criteria: FilterCriteria,
}

impl ResultsView {
    fn empty(criteria: FilterCriteria) -> Self {
        Self {
            run_id: None,
            mode: None,
            results: Vec::new(),
            total: 0,
            stats: DashboardStats::default(),
            categories: Vec::new(),
            service_summary: None,
            criteria,
        }
    }
}

/// Builds the results table from the most recent run in `history`.
/// A malformed or unreadable latest run is an error rather than an empty
/// table or an older run.
pub fn build_results(
    history: &HistoryResponse,
    criteria: FilterCriteria,
) -> Result<ResultsView, AppError> {
    if let Some(newest) = history.newest_unreadable() {
        return Err(AppError::UnreadableRecord(format!(
            "latest run {} could not be read: {}",
            newest.run_id.as_deref().unwrap_or("(no id)"),
            newest.reason
        )));
    }
    let Some(latest) = history.runs.first() else {
        return Ok(ResultsView::empty(criteria));
    };

    let all = normalize(latest)?;
    Ok(ResultsView {
        run_id: latest.id.clone(),
        mode: Some(latest.mode()),
        results: apply_filters(&all, &criteria),
        total: all.len(),
        stats: aggregate(&all),
        categories: categories(&all),
        service_summary: latest.summary().cloned(),
        criteria,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis_client::types::RawHistory;
    use serde_json::json;

    fn history(runs: serde_json::Value) -> HistoryResponse {
        let raw: RawHistory = serde_json::from_value(json!({ "runs": runs })).unwrap();
        raw.into()
    }

    fn batch_history() -> HistoryResponse {
        history(json!([
            {
                "id": "b7",
                "mode": "batch",
                "summary": { "completed_files": 3, "whitefonting_detections": 1,
                             "turnover_risk": { "high_risk_count": 1 } },
                "files_processed": [
                    { "id": "sales_01",
                      "classification_results": {
                          "predicted_category": "Sales", "confidence": 0.8
                      },
                      "turnover_results": { "prediction": { "leave_probability": 0.9 } } },
                    { "id": "design_02",
                      "classification_results": {
                          "predicted_category": "Designer", "confidence": 0.6
                      },
                      "whitefonting_results": { "has_white_text": true } },
                    { "id": "sales_03",
                      "classification_results": {
                          "predicted_category": "sales", "confidence": 0.7
                      },
                      "turnover_results": { "prediction": { "leave_probability": 0.55 } } }
                ]
            },
            { "id": "older" }
        ]))
    }

    #[test]
    fn test_latest_run_only() {
        let view = build_results(&batch_history(), FilterCriteria::default()).unwrap();
        assert_eq!(view.run_id.as_deref(), Some("b7"));
        assert_eq!(view.mode, Some(RunMode::Batch));
        assert_eq!(view.total, 3);
        assert_eq!(view.results.len(), 3);
        assert_eq!(view.stats.clean_resumes, 2);
        assert_eq!(view.service_summary.unwrap().completed_files, Some(3));
    }

    #[test]
    fn test_filters_do_not_change_stats() {
        let criteria = FilterCriteria {
            category: "sales".to_string(),
            risk_level: "medium".to_string(),
            ..Default::default()
        };
        let view = build_results(&batch_history(), criteria).unwrap();
        let ids: Vec<_> = view.results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["sales_03"]);
        assert_eq!(view.total, 3);
        assert_eq!(view.stats.total_resumes, 3);
        assert_eq!(view.categories, vec!["Designer", "Sales"]);
    }

    #[test]
    fn test_single_latest_run() {
        let history = history(json!([{ "id": "r1", "mode": "single" }]));
        let view = build_results(&history, FilterCriteria::default()).unwrap();
        assert_eq!(view.mode, Some(RunMode::Single));
        assert_eq!(view.total, 1);
        assert!(view.service_summary.is_none());
    }

    #[test]
    fn test_empty_history() {
        let view = build_results(&history(json!([])), FilterCriteria::default()).unwrap();
        assert!(view.run_id.is_none());
        assert_eq!(view.total, 0);
    }

    #[test]
    fn test_odd_detail_fields_do_not_hide_the_newest_run() {
        let history = history(json!([
            { "id": "newest", "whitefonting_results": {
                "has_white_text": true,
                "semantic_analysis": {
                    "analysis": { "intent": { "top_intents": [{ "label": "stuffing" }] } }
                }
            } },
            { "id": "older" }
        ]));
        let view = build_results(&history, FilterCriteria::default()).unwrap();
        assert_eq!(view.run_id.as_deref(), Some("newest"));
        assert!(view.results[0].has_white_text);
    }

    #[test]
    fn test_unreadable_latest_run_is_not_replaced_by_an_older_one() {
        let history = history(json!([
            { "id": "newest", "mode": "batch", "files_processed": "pending" },
            { "id": "older" }
        ]));
        let err = build_results(&history, FilterCriteria::default()).unwrap_err();
        match err {
            AppError::UnreadableRecord(msg) => assert!(msg.contains("newest")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_latest_run_is_an_error() {
        let history = history(json!([{ "id": "b1", "mode": "batch", "files_processed": [{}] }]));
        let err = build_results(&history, FilterCriteria::default()).unwrap_err();
        assert!(matches!(err, AppError::MalformedRecord(_)));
    }
}
