use anyhow::{Context, Result};
use std::path::Path;
use vllm_bench::{ReportOutcome, ReportRunner};

pub fn handle_report(logs_dir: &Path, output: &Path) -> Result<()> {
    if !logs_dir.is_dir() {
        eprintln!("Error: Logs directory not found: {}", logs_dir.display());
        std::process::exit(1);
    }

    println!("Scanning logs directory: {}", logs_dir.display());
    let outcome = ReportRunner::new()
        .generate(logs_dir, output)
        .with_context(|| format!("Failed to generate report from {}", logs_dir.display()))?;

    match outcome {
        ReportOutcome::Written { path, rows } => {
            println!("CSV report generated: {}", path.display());
            println!("Total benchmark runs: {}", rows);
        }
        ReportOutcome::NoResults => println!("No benchmark results found!"),
    }
    Ok(())
}
