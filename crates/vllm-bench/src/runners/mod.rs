pub mod report_runner;

// Re-export for easier usage
pub use report_runner::{ReportOutcome, ReportRunner};
