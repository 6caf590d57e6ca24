pub mod report_generators;
pub mod types;

pub use report_generators::{CsvReportGenerator, ReportGenerator};
pub use types::{
    Architecture, BenchmarkMetrics, MetricValue, RunRecord, NOT_AVAILABLE, REPORT_COLUMNS,
};
