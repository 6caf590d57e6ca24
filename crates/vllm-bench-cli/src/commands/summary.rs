use anyhow::{Context, Result};
use std::path::Path;
use vllm_bench::{DataFrameHandler, SummaryOutcome};

pub fn handle_summary(report_csv: &Path, output: &Path) -> Result<()> {
    if !report_csv.is_file() {
        eprintln!("Error: CSV file not found: {}", report_csv.display());
        eprintln!("Run 'vllm-bench report' first to create the CSV file.");
        std::process::exit(1);
    }

    let outcome = DataFrameHandler::generate_throughput_summary(report_csv, output)
        .with_context(|| format!("Failed to summarize {}", report_csv.display()))?;

    match outcome {
        SummaryOutcome::Written {
            path,
            groups,
            architectures,
        } => {
            println!("Found architectures: {}", architectures.join(", "));
            println!("Throughput summary generated: {}", path.display());
            println!("Total groups: {}", groups);
        }
        SummaryOutcome::NoData => println!("No valid benchmark data found in CSV!"),
    }
    Ok(())
}
