// Analysis-result normalization and derived metrics.
// Pure functions only: no I/O, no shared state. Every screen builds its
// view-model from these.

pub mod confidence;
pub mod filter;
pub mod normalizer;
pub mod risk;
pub mod stats;

pub use confidence::{as_percent, format_confidence, format_rate};
pub use filter::{apply_filters, categories, FilterCriteria};
pub use normalizer::{normalize, normalize_runs, MalformedRecord, NormalizeError, NormalizedResult};
pub use risk::{classify, risk_factors, RiskAssessment, RiskTier};
pub use stats::{aggregate, DashboardStats};
