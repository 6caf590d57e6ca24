use crate::errors::BenchResult;
use crate::reporting::types::{RunRecord, REPORT_COLUMNS};
use std::fs;
use std::path::{Path, PathBuf};

/// Trait for report generators
pub trait ReportGenerator {
    fn generate(&self, records: &[RunRecord], output: &Path) -> BenchResult<()>;
}

/// Writes run records as a CSV file with the fixed report header
pub struct CsvReportGenerator {
    terminator: csv::Terminator,
}

impl CsvReportGenerator {
    pub fn new() -> Self {
        Self {
            terminator: csv::Terminator::CRLF,
        }
    }

    /// Use `\n` instead of `\r\n` between records
    pub fn with_unix_line_endings(mut self) -> Self {
        self.terminator = csv::Terminator::Any(b'\n');
        self
    }
}

impl Default for CsvReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for CsvReportGenerator {
    fn generate(&self, records: &[RunRecord], output: &Path) -> BenchResult<()> {
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        // Write to a temporary file first so a failed run never leaves a truncated report
        let temp_path: PathBuf = output.with_extension("csv.tmp");
        {
            let mut writer = csv::WriterBuilder::new()
                .terminator(self.terminator)
                .from_path(&temp_path)?;

            writer.write_record(REPORT_COLUMNS)?;
            for record in records {
                writer.write_record(record.to_row())?;
            }
            writer.flush()?;
        }

        fs::rename(&temp_path, output)?;

        tracing::debug!(
            "Wrote {} rows to {}",
            records.len(),
            output.display()
        );
        Ok(())
    }
}
