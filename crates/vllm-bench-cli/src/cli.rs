use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::report::handle_report;
use crate::commands::summary::handle_summary;
use crate::configuration::Settings;
use crate::logging::setup_logging;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Generate CSV reports from vLLM benchmark logs",
    long_about = None,
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[arg(
        short,
        long,
        global = true,
        help = "Show debug logging on stderr"
    )]
    verbose: bool,

    // Without a subcommand the report is generated, as with `report`
    #[command(flatten)]
    report: ReportArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Args, Debug, Default)]
struct ReportArgs {
    #[arg(
        long = "logs-dir",
        value_name = "DIR",
        help = "Path to logs directory (default: ./logs)",
        long_help = "Directory holding one timestamped subdirectory per benchmark run. Overrides VLLM_BENCH_REPORT__LOGS_DIR."
    )]
    logs_dir: Option<PathBuf>,

    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Output CSV file (default: ./benchmark_results.csv)",
        long_help = "Where to write the report. An existing file is overwritten. Overrides VLLM_BENCH_REPORT__OUTPUT."
    )]
    output: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
struct SummaryArgs {
    #[arg(
        long = "csv",
        value_name = "FILE",
        help = "Report CSV to summarize (default: ./benchmark_results.csv)"
    )]
    csv: Option<PathBuf>,

    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Output CSV file (default: ./throughput_summary.csv)"
    )]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Scan benchmark run directories and write one CSV row per complete run
    #[command(about = "Generate the benchmark CSV report from a logs directory")]
    Report(ReportArgs),

    /// Aggregate total throughput per architecture, model and concurrency
    #[command(about = "Summarize throughput vs concurrency from a generated report")]
    Summary(SummaryArgs),
}

pub fn cli() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    let settings = Settings::new().context("Invalid vllm-bench configuration")?;

    match cli.command {
        Some(Command::Report(args)) => run_report(args, &settings),
        Some(Command::Summary(args)) => {
            let csv = args.csv.unwrap_or(settings.summary.csv);
            let output = args.output.unwrap_or(settings.summary.output);
            handle_summary(&csv, &output)
        }
        None => run_report(cli.report, &settings),
    }
}

fn run_report(args: ReportArgs, settings: &Settings) -> Result<()> {
    let logs_dir = args
        .logs_dir
        .unwrap_or_else(|| settings.report.logs_dir.clone());
    let output = args
        .output
        .unwrap_or_else(|| settings.report.output.clone());
    handle_report(&logs_dir, &output)
}
