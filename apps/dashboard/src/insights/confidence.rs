/// Converts a [0, 1] score to an unrounded percentage, e.g. for progress bars.
pub fn as_percent(score: f64) -> f64 {
    score * 100.0
}

/// Renders a [0, 1] score as a whole percentage: `0.955` -> `"96%"`.
///
/// Halves round away from zero. Out-of-range scores are not rejected and
/// render as out-of-range percentages; NaN renders as `"0%"`.
pub fn format_confidence(score: f64) -> String {
    let rounded = as_percent(score).round();
    if rounded.is_nan() {
        return "0%".to_string();
    }
    format!("{}%", rounded as i64)
}

/// Renders an already-scaled percentage with two decimals: `65.0` -> `"65.00%"`.
pub fn format_rate(rate: f64) -> String {
    format!("{rate:.2}%")
}
