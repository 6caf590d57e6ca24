pub mod dataframe_handler;
pub mod errors;
pub mod extractors;
pub mod reporting;
pub mod runners;
pub mod utilities;

// Re-export main components for easier use
pub use dataframe_handler::{DataFrameHandler, SummaryOutcome};
pub use errors::{BenchError, BenchResult};
pub use reporting::{Architecture, BenchmarkMetrics, MetricValue, RunRecord, NOT_AVAILABLE};
pub use runners::{ReportOutcome, ReportRunner};
