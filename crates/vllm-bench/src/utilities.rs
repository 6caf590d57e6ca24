use std::fs;
use std::path::Path;

/// Read a run artifact into memory, treating any failure as "not available".
///
/// Run directories are produced by interrupted or partial benchmark runs as
/// often as by complete ones, so a missing or unreadable file is never an
/// error for the report.
pub fn read_artifact(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) => {
            tracing::debug!("Could not read {}: {}", path.display(), e);
            None
        }
    }
}
