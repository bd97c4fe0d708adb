pub mod run;

pub use run::{AnalysisRun, DocumentAnalysis, RunKind, RunMode};
