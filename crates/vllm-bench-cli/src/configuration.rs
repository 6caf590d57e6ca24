use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Optional settings file, read from the working directory
pub const CONFIG_FILE: &str = "vllm-bench.toml";

const DEFAULT_LOGS_DIR: &str = "./logs";
const DEFAULT_REPORT_OUTPUT: &str = "./benchmark_results.csv";
const DEFAULT_SUMMARY_OUTPUT: &str = "./throughput_summary.csv";

#[derive(Debug, Deserialize)]
pub struct ReportSettings {
    #[serde(default = "default_logs_dir")]
    pub logs_dir: PathBuf,
    #[serde(default = "default_report_output")]
    pub output: PathBuf,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            logs_dir: default_logs_dir(),
            output: default_report_output(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SummarySettings {
    #[serde(default = "default_report_output")]
    pub csv: PathBuf,
    #[serde(default = "default_summary_output")]
    pub output: PathBuf,
}

impl Default for SummarySettings {
    fn default() -> Self {
        Self {
            csv: default_report_output(),
            output: default_summary_output(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub report: ReportSettings,
    #[serde(default)]
    pub summary: SummarySettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load(Path::new(CONFIG_FILE))
    }

    /// Defaults, then `config_file` if it exists, then
    /// `VLLM_BENCH_<SECTION>__<KEY>` environment variables
    pub fn load(config_file: &Path) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("report.logs_dir", DEFAULT_LOGS_DIR)?
            .set_default("report.output", DEFAULT_REPORT_OUTPUT)?
            .set_default("summary.csv", DEFAULT_REPORT_OUTPUT)?
            .set_default("summary.output", DEFAULT_SUMMARY_OUTPUT)?
            .add_source(
                File::from(config_file)
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix("VLLM_BENCH")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let settings: Result<Self, ConfigError> = config.try_deserialize();
        if let Err(err) = &settings {
            tracing::debug!("Configuration error: {:?}", err);
        }
        settings
    }
}

fn default_logs_dir() -> PathBuf {
    PathBuf::from(DEFAULT_LOGS_DIR)
}

fn default_report_output() -> PathBuf {
    PathBuf::from(DEFAULT_REPORT_OUTPUT)
}

fn default_summary_output() -> PathBuf {
    PathBuf::from(DEFAULT_SUMMARY_OUTPUT)
}
