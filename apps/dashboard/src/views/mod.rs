pub mod dashboard;
pub mod detail;
pub mod handlers;
pub mod reports;
pub mod results;
pub mod sources;
