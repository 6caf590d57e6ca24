use polars::error::PolarsError;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Error types for report generation
#[derive(Error, Debug)]
pub enum BenchError {
    #[error("Logs directory not found: {0}")]
    LogsDirNotFound(PathBuf),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("DataFrame error: {0}")]
    DataFrameError(String),

    #[error("Other error: {0}")]
    Other(String),
}

/// Result type for report operations
pub type BenchResult<T> = Result<T, BenchError>;

/// Utility functions for working with BenchError
pub mod util {
    use super::*;
    use std::path::Path;

    /// Check if a directory exists, returning a LogsDirNotFound error if it doesn't
    pub fn ensure_dir_exists<P: AsRef<Path>>(path: P) -> BenchResult<()> {
        let path_ref = path.as_ref();
        if !path_ref.is_dir() {
            return Err(BenchError::LogsDirNotFound(path_ref.to_path_buf()));
        }
        Ok(())
    }

    /// Check if a file exists, returning a FileNotFound error if it doesn't
    pub fn ensure_file_exists<P: AsRef<Path>>(path: P) -> BenchResult<()> {
        let path_ref = path.as_ref();
        if !path_ref.is_file() {
            return Err(BenchError::FileNotFound(path_ref.to_path_buf()));
        }
        Ok(())
    }

    /// Convert a generic error to a BenchError
    pub fn to_bench_error<E: fmt::Display>(e: E, context: &str) -> BenchError {
        BenchError::Other(format!("{}: {}", context, e))
    }
}

impl From<PolarsError> for BenchError {
    fn from(err: PolarsError) -> Self {
        BenchError::DataFrameError(err.to_string())
    }
}
