use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::insights::normalizer::NormalizedResult;
use crate::insights::risk::RiskTier;

pub const ALL: &str = "all";

/// Results-table filters. Each criterion is bypassed when it holds its
/// neutral value (`""` for search, `"all"` for category and risk level).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    #[serde(default)]
    pub search: String,
    #[serde(default = "all")]
    pub category: String,
    #[serde(default = "all", alias = "riskLevel")]
    pub risk_level: String,
}

fn all() -> String {
    ALL.to_string()
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            search: String::new(),
            category: all(),
            risk_level: all(),
        }
    }
}

impl FilterCriteria {
    pub fn is_identity(&self) -> bool {
        search_needle(&self.search).is_none()
            && is_neutral(&self.category)
            && is_neutral(&self.risk_level)
    }
}

fn is_neutral(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.eq_ignore_ascii_case(ALL)
}

fn search_needle(search: &str) -> Option<String> {
    let search = search.trim();
    (!search.is_empty()).then(|| search.to_lowercase())
}

/// Applies search, then category, then risk tier. Returns a new list with
/// the surviving results in their original relative order.
pub fn apply_filters(
    results: &[NormalizedResult],
    criteria: &FilterCriteria,
) -> Vec<NormalizedResult> {
    let needle = search_needle(&criteria.search);
    let category = (!is_neutral(&criteria.category)).then(|| criteria.category.trim());
    // An unrecognized tier name is not neutral: it matches nothing.
    let risk = (!is_neutral(&criteria.risk_level)).then(|| RiskTier::parse(&criteria.risk_level));

    results
        .iter()
        .filter(|r| match &needle {
            Some(needle) => r.id.to_lowercase().contains(needle.as_str()),
            None => true,
        })
        .filter(|r| match category {
            Some(category) => r.category.to_lowercase() == category.to_lowercase(),
            None => true,
        })
        .filter(|r| match risk {
            Some(tier) => tier == Some(r.turnover_risk.tier),
            None => true,
        })
        .cloned()
        .collect()
}

/// Distinct categories present in `results` for the category selector.
///
/// Filtering ignores case, so "Sales" and "sales" are one option. The first
/// spelling seen is the one shown. Options are sorted case-insensitively.
pub fn categories(results: &[NormalizedResult]) -> Vec<String> {
    let mut seen: BTreeMap<String, &str> = BTreeMap::new();
    for result in results {
        seen.entry(result.category.to_lowercase()).or_insert(result.category.as_str());
    }
    seen.into_values().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::risk::classify;

    fn result(id: &str, category: &str, leave: f64) -> NormalizedResult {
        NormalizedResult {
            id: id.to_string(),
            category: category.to_string(),
            confidence: 0.5,
            turnover_risk: classify(leave),
            status: "completed".to_string(),
            has_white_text: false,
        }
    }

    fn sample() -> Vec<NormalizedResult> {
        vec![
            result("r1", "Sales", 0.9),
            result("r2", "Designer", 0.1),
            result("R3-batch", "sales", 0.6),
            result("r4", "Teacher", 0.75),
        ]
    }

    fn ids(results: &[NormalizedResult]) -> Vec<&str> {
        results.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_neutral_criteria_is_identity() {
        let results = sample();
        let criteria = FilterCriteria::default();
        assert!(criteria.is_identity());
        assert_eq!(apply_filters(&results, &criteria), results);
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let criteria = FilterCriteria {
            search: "r3".to_string(),
            ..Default::default()
        };
        assert_eq!(ids(&apply_filters(&sample(), &criteria)), vec!["R3-batch"]);
    }

    #[test]
    fn test_search_scenario() {
        let criteria = FilterCriteria {
            search: "r2".to_string(),
            ..Default::default()
        };
        assert_eq!(ids(&apply_filters(&sample(), &criteria)), vec!["r2"]);
    }

    #[test]
    fn test_category_is_case_insensitive_exact() {
        let criteria = FilterCriteria {
            category: "SALES".to_string(),
            ..Default::default()
        };
        assert_eq!(ids(&apply_filters(&sample(), &criteria)), vec!["r1", "R3-batch"]);

        let partial = FilterCriteria {
            category: "Sal".to_string(),
            ..Default::default()
        };
        assert!(apply_filters(&sample(), &partial).is_empty());
    }

    #[test]
    fn test_risk_filter_uses_tier() {
        let criteria = FilterCriteria {
            risk_level: "high".to_string(),
            ..Default::default()
        };
        assert_eq!(ids(&apply_filters(&sample(), &criteria)), vec!["r1", "r4"]);
    }

    #[test]
    fn test_unknown_risk_level_matches_nothing() {
        let criteria = FilterCriteria {
            risk_level: "severe".to_string(),
            ..Default::default()
        };
        assert!(apply_filters(&sample(), &criteria).is_empty());
    }

    #[test]
    fn test_filters_compose() {
        let criteria = FilterCriteria {
            search: "r".to_string(),
            category: "sales".to_string(),
            risk_level: "Medium".to_string(),
        };
        assert_eq!(ids(&apply_filters(&sample(), &criteria)), vec!["R3-batch"]);
    }

    #[test]
    fn test_input_is_untouched() {
        let results = sample();
        let before = results.clone();
        let criteria = FilterCriteria {
            search: "r1".to_string(),
            ..Default::default()
        };
        let _ = apply_filters(&results, &criteria);
        assert_eq!(results, before);
    }

    #[test]
    fn test_criteria_from_query_defaults() {
        let criteria: FilterCriteria = serde_json::from_str(r#"{"riskLevel":"low"}"#).unwrap();
        assert_eq!(criteria.search, "");
        assert_eq!(criteria.category, "all");
        assert_eq!(criteria.risk_level, "low");
    }

    #[test]
    fn test_categories_sorted_distinct() {
        assert_eq!(categories(&sample()), vec!["Designer", "Sales", "Teacher"]);
    }

    #[test]
    fn test_categories_merge_spellings_keeping_the_first() {
        let results = vec![
            result("r1", "sales", 0.1),
            result("r2", "Designer", 0.1),
            result("r3", "SALES", 0.1),
            result("r4", "Sales", 0.1),
            result("r5", "analyst", 0.1),
        ];
        assert_eq!(categories(&results), vec!["analyst", "Designer", "sales"]);

        // Every option still selects all of its spellings.
        let criteria = FilterCriteria {
            category: "sales".to_string(),
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&apply_filters(&results, &criteria)), vec!["r1", "r3", "r4"]);
    }
}
