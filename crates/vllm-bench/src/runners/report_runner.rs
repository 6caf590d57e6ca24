use crate::errors::util::ensure_dir_exists;
use crate::errors::BenchResult;
use crate::extractors::{
    detect_architecture, extract_model_name, extract_model_size, parse_benchmark_results,
    parse_run_params,
};
use crate::reporting::{CsvReportGenerator, ReportGenerator, RunRecord, NOT_AVAILABLE};
use std::fs;
use std::path::{Path, PathBuf};

pub const RUN_PARAMS_FILE: &str = "run_params.txt";
pub const SERVER_LOG_FILE: &str = "vllm_server.log";
pub const MEMORY_INFO_FILE: &str = "model_memory_info.txt";

/// Result of a report run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    /// The report was written with this many rows
    Written { path: PathBuf, rows: usize },
    /// No run had a complete set of metrics, nothing was written
    NoResults,
}

/// Builds the benchmark report from a directory of timestamped run directories
pub struct ReportRunner {
    generator: Box<dyn ReportGenerator>,
}

impl Default for ReportRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportRunner {
    pub fn new() -> Self {
        Self::with_generator(Box::new(CsvReportGenerator::new()))
    }

    pub fn with_generator(generator: Box<dyn ReportGenerator>) -> Self {
        Self { generator }
    }

    /// Scan `logs_dir` and write every complete run to `output`
    pub fn generate(&self, logs_dir: &Path, output: &Path) -> BenchResult<ReportOutcome> {
        let records = Self::collect(logs_dir)?;
        if records.is_empty() {
            tracing::info!("No complete benchmark runs in {}", logs_dir.display());
            return Ok(ReportOutcome::NoResults);
        }

        self.generator.generate(&records, output)?;
        tracing::info!(
            "Report with {} runs written to {}",
            records.len(),
            output.display()
        );

        Ok(ReportOutcome::Written {
            path: output.to_path_buf(),
            rows: records.len(),
        })
    }

    /// Build a record for every run directory, in name order, keeping only
    /// runs with all four metrics populated
    pub fn collect(logs_dir: &Path) -> BenchResult<Vec<RunRecord>> {
        ensure_dir_exists(logs_dir)?;
        tracing::info!("Scanning logs directory: {}", logs_dir.display());

        let mut run_dirs: Vec<PathBuf> = fs::read_dir(logs_dir)?
            .filter_map(|entry| {
                let path = entry.ok()?.path();
                path.is_dir().then_some(path)
            })
            .collect();
        run_dirs.sort();

        let records = run_dirs
            .iter()
            .map(|run_dir| Self::process_run_dir(run_dir))
            .filter(|record| {
                let complete = record.has_complete_metrics();
                if !complete {
                    tracing::debug!("Skipping {}: incomplete metrics", record.timestamp);
                }
                complete
            })
            .collect();

        Ok(records)
    }

    /// Extract every field of a single run directory.
    ///
    /// Never fails: each missing or malformed artifact just leaves its fields at `N/A`.
    pub fn process_run_dir(run_dir: &Path) -> RunRecord {
        let timestamp = run_dir
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        let mut record = RunRecord::new(timestamp);

        let params_file = run_dir.join(RUN_PARAMS_FILE);
        if params_file.exists() {
            let params = parse_run_params(&params_file);
            let param = |key: &str| {
                params
                    .get(key)
                    .cloned()
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string())
            };
            record.model_name = param("model_name");
            record.concurrency = param("max_concurrency");
            record.num_prompts = param("num_prompts");
        }

        let server_log = run_dir.join(SERVER_LOG_FILE);
        if server_log.exists() {
            record.architecture = Some(detect_architecture(&server_log));

            if record.model_name == NOT_AVAILABLE {
                if let Some(model_name) = extract_model_name(&server_log) {
                    record.model_name = model_name;
                }
            }
        }

        let memory_file = run_dir.join(MEMORY_INFO_FILE);
        if memory_file.exists() {
            if let Some(model_size) = extract_model_size(&memory_file) {
                record.model_size = model_size;
            }
        }

        record.metrics.update(parse_benchmark_results(run_dir));

        tracing::debug!(
            "Processed {}: model={} arch={:?} metrics={}",
            record.timestamp,
            record.model_name,
            record.architecture,
            record.metrics.len()
        );
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::BenchError;
    use crate::reporting::{Architecture, MetricValue};
    use tempfile::tempdir;

    #[test]
    fn test_empty_run_dir_is_all_sentinels() {
        let dir = tempdir().unwrap();
        let run_dir = dir.path().join("2024-01-01_00-00-00");
        fs::create_dir(&run_dir).unwrap();

        let record = ReportRunner::process_run_dir(&run_dir);
        assert_eq!(record, RunRecord::new("2024-01-01_00-00-00"));
    }

    #[test]
    fn test_params_without_keys_reset_to_sentinel() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(RUN_PARAMS_FILE), "# nothing here\n").unwrap();

        let record = ReportRunner::process_run_dir(dir.path());
        assert_eq!(record.model_name, NOT_AVAILABLE);
        assert_eq!(record.concurrency, NOT_AVAILABLE);
        assert_eq!(record.num_prompts, NOT_AVAILABLE);
    }

    #[test]
    fn test_model_name_from_server_log_when_params_lack_it() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(RUN_PARAMS_FILE), "max_concurrency = 4\n").unwrap();
        fs::write(
            dir.path().join(SERVER_LOG_FILE),
            "INFO non-default args: model='google/gemma-3-4b-it' on ROCm\n",
        )
        .unwrap();

        let record = ReportRunner::process_run_dir(dir.path());
        assert_eq!(record.model_name, "google/gemma-3-4b-it");
        assert_eq!(record.architecture, Some(Architecture::Rocm));
        assert_eq!(record.concurrency, "4");
    }

    #[test]
    fn test_params_model_name_wins_over_server_log() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(RUN_PARAMS_FILE), "model_name = from/params\n").unwrap();
        fs::write(dir.path().join(SERVER_LOG_FILE), "model='from/log' cuda\n").unwrap();

        let record = ReportRunner::process_run_dir(dir.path());
        assert_eq!(record.model_name, "from/params");
        assert_eq!(record.architecture, Some(Architecture::Cuda));
    }

    #[test]
    fn test_model_size_from_memory_info() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(MEMORY_INFO_FILE),
            "Model loading took 15.02 GiB memory and 12.3 seconds\n",
        )
        .unwrap();

        let record = ReportRunner::process_run_dir(dir.path());
        assert_eq!(record.model_size, "15.02 GiB");
        assert_eq!(record.architecture, None);
    }

    #[test]
    fn test_metrics_are_merged_into_record() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("benchmark.log"),
            "Output token throughput (tok/s): 1.5\nTotal Token throughput (tok/s): 3.5\n",
        )
        .unwrap();

        let record = ReportRunner::process_run_dir(dir.path());
        assert_eq!(record.metrics.output_throughput, Some(MetricValue::Float(1.5)));
        assert_eq!(record.metrics.total_throughput, Some(MetricValue::Float(3.5)));
        assert!(!record.has_complete_metrics());
    }

    #[test]
    fn test_collect_missing_logs_dir() {
        let dir = tempdir().unwrap();
        let result = ReportRunner::collect(&dir.path().join("logs"));
        assert!(matches!(result, Err(BenchError::LogsDirNotFound(_))));
    }

    #[test]
    fn test_generate_with_no_results_writes_nothing() {
        let dir = tempdir().unwrap();
        let logs = dir.path().join("logs");
        fs::create_dir_all(logs.join("run-1")).unwrap();
        fs::write(logs.join("stray.txt"), "not a run").unwrap();
        let output = dir.path().join("benchmark_results.csv");

        let outcome = ReportRunner::new().generate(&logs, &output).unwrap();
        assert_eq!(outcome, ReportOutcome::NoResults);
        assert!(!output.exists());
    }
}
