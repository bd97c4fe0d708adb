use serde::{Deserialize, Serialize};

use crate::insights::normalizer::NormalizedResult;
use crate::insights::risk::RiskTier;

/// Summary metrics for the dashboard and reports screens.
/// Recomputed from scratch for every result list; never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_resumes: usize,
    pub clean_resumes: usize,
    pub high_turnover_risk: usize,
    /// Mean confidence across results, as a percentage.
    pub classification_rate: f64,
}

impl DashboardStats {
    pub fn white_text_detected(&self) -> usize {
        self.total_resumes - self.clean_resumes
    }
}

pub fn aggregate(results: &[NormalizedResult]) -> DashboardStats {
    let total_resumes = results.len();
    if total_resumes == 0 {
        return DashboardStats::default();
    }

    let white_text = results.iter().filter(|r| r.has_white_text).count();
    let high_turnover_risk = results
        .iter()
        .filter(|r| r.turnover_risk.tier == RiskTier::High)
        .count();
    let confidence_sum: f64 = results.iter().map(|r| r.confidence).sum();

    DashboardStats {
        total_resumes,
        clean_resumes: total_resumes - white_text,
        high_turnover_risk,
        classification_rate: confidence_sum / total_resumes as f64 * 100.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::risk::classify;

    fn result(
        id: &str,
        category: &str,
        confidence: f64,
        leave: f64,
        white: bool,
    ) -> NormalizedResult {
        NormalizedResult {
            id: id.to_string(),
            category: category.to_string(),
            confidence,
            turnover_risk: classify(leave),
            status: "completed".to_string(),
            has_white_text: white,
        }
    }

    #[test]
    fn test_empty_is_all_zero() {
        assert_eq!(
            aggregate(&[]),
            DashboardStats {
                total_resumes: 0,
                clean_resumes: 0,
                high_turnover_risk: 0,
                classification_rate: 0.0,
            }
        );
    }

    #[test]
    fn test_two_result_scenario() {
        let results = vec![
            result("r1", "Sales", 0.9, 0.8, false),
            result("r2", "Designer", 0.4, 0.1, true),
        ];
        let stats = aggregate(&results);
        assert_eq!(stats.total_resumes, 2);
        assert_eq!(stats.clean_resumes, 1);
        assert_eq!(stats.white_text_detected(), 1);
        assert_eq!(stats.high_turnover_risk, 1);
        let rate = stats.classification_rate;
        assert!((rate - 65.0).abs() < 1e-9, "rate was {rate}");
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let results = vec![
            result("a", "Teacher", 0.33, 0.7, false),
            result("b", "Sales", 0.67, 0.69, true),
            result("c", "Sales", 0.12, 0.95, false),
        ];
        let first = aggregate(&results);
        for _ in 0..10 {
            assert_eq!(aggregate(&results), first);
        }
    }

    #[test]
    fn test_medium_risk_is_not_counted_as_high() {
        let results = vec![result("a", "Sales", 0.5, 0.6999, false)];
        assert_eq!(aggregate(&results).high_turnover_risk, 0);
    }
}
