use crate::errors::util::{ensure_file_exists, to_bench_error};
use crate::errors::{BenchError, BenchResult};
use crate::reporting::{Architecture, NOT_AVAILABLE};
use polars::io::csv::QuoteStyle;
use polars::prelude::{
    col, lit, CsvWriter, DataFrame, IntoLazy, NamedFrom, SerWriter, Series,
};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Cell values treated as missing, matching the default NA tokens of the
/// pandas-based plotting scripts that consume the same report
const MISSING_TOKENS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", NOT_AVAILABLE, "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Columns of the report that the throughput summary reads
#[derive(Debug, Deserialize)]
struct ReportRow {
    model_name: String,
    architecture: String,
    concurrency: String,
    output_throughput: String,
    total_throughput: String,
}

/// Result of a throughput summary run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    Written {
        path: PathBuf,
        groups: usize,
        architectures: Vec<String>,
    },
    /// The report had no row with numeric throughput and concurrency
    NoData,
}

/// Handles DataFrame operations over generated benchmark reports
pub struct DataFrameHandler;

impl DataFrameHandler {
    /// Summarize a report CSV into per (architecture, model, concurrency)
    /// throughput figures and write them to `output`
    pub fn generate_throughput_summary(
        report_csv: &Path,
        output: &Path,
    ) -> BenchResult<SummaryOutcome> {
        let df = Self::load_report(report_csv)?;
        if df.height() == 0 {
            tracing::info!("No valid benchmark data found in {}", report_csv.display());
            return Ok(SummaryOutcome::NoData);
        }

        let architectures = Self::unique_architectures(&df)?;
        tracing::info!("Found architectures: {}", architectures.join(", "));

        let mut summary = Self::throughput_summary(&df)?;
        Self::write_csv(&mut summary, output)?;

        tracing::info!(
            "Wrote {} summary rows to {}",
            summary.height(),
            output.display()
        );

        Ok(SummaryOutcome::Written {
            path: output.to_path_buf(),
            groups: summary.height(),
            architectures,
        })
    }

    /// Read a report CSV, keeping only rows that can be plotted: numeric
    /// `total_throughput` and `concurrency`, and a known model and architecture
    pub fn load_report(report_csv: &Path) -> BenchResult<DataFrame> {
        ensure_file_exists(report_csv)?;

        let mut reader = csv::Reader::from_path(report_csv)?;
        let mut architectures = Vec::new();
        let mut model_names = Vec::new();
        let mut concurrency = Vec::new();
        let mut total_throughput = Vec::new();
        let mut output_throughput: Vec<Option<f64>> = Vec::new();

        for row in reader.deserialize() {
            let row: ReportRow = row?;

            let (Some(total), Some(level)) = (
                Self::parse_number(&row.total_throughput),
                Self::parse_number(&row.concurrency),
            ) else {
                continue;
            };
            if Self::is_missing(&row.architecture) || Self::is_missing(&row.model_name) {
                continue;
            }

            architectures.push(row.architecture);
            model_names.push(row.model_name);
            concurrency.push(level);
            total_throughput.push(total);
            output_throughput.push(Self::parse_number(&row.output_throughput));
        }

        DataFrame::new(vec![
            Series::new("architecture", architectures),
            Series::new("model_name", model_names),
            Series::new("concurrency", concurrency),
            Series::new("total_throughput", total_throughput),
            Series::new("output_throughput", output_throughput),
        ])
        .map_err(|e| BenchError::DataFrameError(format!("Failed to create DataFrame: {}", e)))
    }

    /// Aggregate throughput per (architecture, model_name, concurrency),
    /// leaving out runs whose architecture could not be detected
    pub fn throughput_summary(df: &DataFrame) -> BenchResult<DataFrame> {
        let summary = df
            .clone()
            .lazy()
            .filter(col("architecture").neq(lit(Architecture::Unknown.as_str())))
            .group_by([col("architecture"), col("model_name"), col("concurrency")])
            .agg([
                col("total_throughput").count().alias("runs"),
                col("total_throughput")
                    .mean()
                    .alias("mean_total_throughput"),
                col("total_throughput").max().alias("max_total_throughput"),
                col("output_throughput")
                    .mean()
                    .alias("mean_output_throughput"),
            ])
            .collect()
            .map_err(|e| {
                BenchError::DataFrameError(format!("Failed to aggregate throughput: {}", e))
            })?;

        summary
            .sort(
                ["architecture", "model_name", "concurrency"],
                vec![false, false, false],
                false,
            )
            .map_err(|e| BenchError::DataFrameError(format!("Failed to sort summary: {}", e)))
    }

    /// Distinct architectures in order of first appearance
    pub fn unique_architectures(df: &DataFrame) -> BenchResult<Vec<String>> {
        let column = df
            .column("architecture")
            .map_err(|e| to_bench_error(e, "Failed to get architecture column"))?;
        let values = column
            .utf8()
            .map_err(|e| to_bench_error(e, "Architecture column is not text"))?;

        let mut architectures: Vec<String> = Vec::new();
        for arch in values.into_iter().flatten() {
            if !architectures.iter().any(|seen| seen == arch) {
                architectures.push(arch.to_string());
            }
        }
        Ok(architectures)
    }

    /// Write a DataFrame to CSV atomically using a temporary file
    pub fn write_csv(df: &mut DataFrame, output: &Path) -> BenchResult<()> {
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let temp_path: PathBuf = output.with_extension("csv.tmp");
        let file = fs::File::create(&temp_path)?;

        CsvWriter::new(&file)
            .include_header(true)
            .with_separator(b',')
            .with_quote_style(QuoteStyle::Necessary)
            .finish(df)
            .map_err(|e| BenchError::DataFrameError(format!("Failed to write CSV: {}", e)))?;

        fs::rename(temp_path, output)?;
        Ok(())
    }

    fn parse_number(value: &str) -> Option<f64> {
        value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|number| number.is_finite())
    }

    fn is_missing(value: &str) -> bool {
        MISSING_TOKENS.contains(&value)
    }
}
