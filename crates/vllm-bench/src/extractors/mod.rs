mod architecture;
mod benchmark_metrics;
mod model_name;
mod model_size;
mod run_params;

pub use architecture::detect_architecture;
pub use benchmark_metrics::{parse_benchmark_results, BENCHMARK_LOG, RESULTS_SUFFIX};
pub use model_name::extract_model_name;
pub use model_size::extract_model_size;
pub use run_params::parse_run_params;
