use std::fs;
use std::path::Path;

use serde_json::json;
use tempfile::tempdir;
use vllm_bench::{ReportOutcome, ReportRunner};

const HEADER: &str = "timestamp,model_name,model_size,architecture,concurrency,num_prompts,output_throughput,peak_output_throughput,peak_concurrent_requests,total_throughput";

fn benchmark_log(output: f64, peak: f64, concurrent: f64, total: f64) -> String {
    format!(
        "============ Serving Benchmark Result ============\n\
         Successful requests:                     100\n\
         Output token throughput (tok/s):         {:.2}\n\
         Peak output token throughput (tok/s):    {:.2}\n\
         Peak concurrent requests:                {:.2}\n\
         Total Token throughput (tok/s):          {:.2}\n\
         ==================================================\n",
        output, peak, concurrent, total
    )
}

fn write_run(logs: &Path, name: &str, files: &[(&str, String)]) {
    let run_dir = logs.join(name);
    fs::create_dir_all(&run_dir).unwrap();
    for (file, content) in files {
        fs::write(run_dir.join(file), content).unwrap();
    }
}

fn data_rows(csv: &Path) -> Vec<String> {
    let content = fs::read_to_string(csv).unwrap();
    let mut lines = content.lines().map(str::to_string);
    assert_eq!(lines.next().as_deref(), Some(HEADER));
    lines.collect()
}

#[test]
fn test_single_cuda_run_end_to_end() {
    let dir = tempdir().unwrap();
    let logs = dir.path().join("logs");
    write_run(
        &logs,
        "2024-01-01_12-00-00",
        &[
            (
                "run_params.txt",
                "model_name = foo/bar\nmax_concurrency = 8\n".to_string(),
            ),
            (
                "vllm_server.log",
                "INFO args: model='foo/bar'\nINFO platform: cuda\n".to_string(),
            ),
            ("benchmark.log", benchmark_log(100.0, 150.0, 12.0, 110.0)),
        ],
    );
    let output = dir.path().join("benchmark_results.csv");

    let outcome = ReportRunner::new().generate(&logs, &output).unwrap();

    assert_eq!(
        outcome,
        ReportOutcome::Written {
            path: output.clone(),
            rows: 1
        }
    );
    assert_eq!(
        data_rows(&output),
        vec!["2024-01-01_12-00-00,foo/bar,N/A,CUDA,8,N/A,100.0,150.0,12.0,110.0"]
    );
}

#[test]
fn test_runs_are_sorted_and_incomplete_runs_dropped() {
    let dir = tempdir().unwrap();
    let logs = dir.path().join("logs");

    write_run(
        &logs,
        "2024-03-02_09-00-00",
        &[
            (
                "run_params.txt",
                "model_name = meta-llama/Llama-3.1-8B-Instruct\nmax_concurrency = 32\nnum_prompts = 320\n"
                    .to_string(),
            ),
            ("vllm_server.log", "Using ROCm 6.2 with CUDA graphs\n".to_string()),
            (
                "model_memory_info.txt",
                "Model loading took 14.99 GiB memory and 4.1 seconds\n".to_string(),
            ),
            ("benchmark.log", benchmark_log(512.5, 640.0, 32.0, 2048.25)),
        ],
    );
    write_run(
        &logs,
        "2024-03-01_09-00-00",
        &[
            ("run_params.txt", "model_name = a/b\n".to_string()),
            ("benchmark.log", benchmark_log(1.0, 2.0, 3.0, 4.0)),
        ],
    );
    // Server crashed before the benchmark finished
    write_run(
        &logs,
        "2024-03-01_10-00-00",
        &[(
            "benchmark.log",
            "Output token throughput (tok/s): 10.00\n".to_string(),
        )],
    );
    write_run(&logs, "2024-02-28_00-00-00", &[]);
    fs::write(logs.join("README.txt"), "not a run").unwrap();

    let output = dir.path().join("benchmark_results.csv");
    let outcome = ReportRunner::new().generate(&logs, &output).unwrap();

    assert!(matches!(outcome, ReportOutcome::Written { rows: 2, .. }));
    assert_eq!(
        data_rows(&output),
        vec![
            "2024-03-01_09-00-00,a/b,N/A,N/A,N/A,N/A,1.0,2.0,3.0,4.0",
            "2024-03-02_09-00-00,meta-llama/Llama-3.1-8B-Instruct,14.99 GiB,ROCm,32,320,512.5,640.0,32.0,2048.25",
        ]
    );
}

#[test]
fn test_json_fallback_metrics() {
    let dir = tempdir().unwrap();
    let logs = dir.path().join("logs");
    write_run(
        &logs,
        "run",
        &[
            ("vllm_server.log", r#"{"model": "Qwen/Qwen2.5-7B"}"#.to_string()),
            (
                "qwen_results.json",
                json!({
                    "summary": {
                        "output_throughput": 87.25,
                        "peak_output_throughput": 120,
                        "peak_concurrent_requests": 8.0,
                        "total_throughput": 300.5
                    }
                })
                .to_string(),
            ),
        ],
    );
    let output = dir.path().join("benchmark_results.csv");

    ReportRunner::new().generate(&logs, &output).unwrap();

    assert_eq!(
        data_rows(&output),
        vec!["run,Qwen/Qwen2.5-7B,N/A,Unknown,N/A,N/A,87.25,120,8.0,300.5"]
    );
}

#[test]
fn test_json_summary_with_missing_metric_is_dropped() {
    let dir = tempdir().unwrap();
    let logs = dir.path().join("logs");
    write_run(
        &logs,
        "run",
        &[(
            "x_results.json",
            json!({
                "summary": {
                    "output_throughput": 1.0,
                    "peak_output_throughput": 2.0,
                    "total_throughput": "nan"
                }
            })
            .to_string(),
        )],
    );
    let output = dir.path().join("benchmark_results.csv");

    let outcome = ReportRunner::new().generate(&logs, &output).unwrap();

    assert_eq!(outcome, ReportOutcome::NoResults);
    assert!(!output.exists());
}

#[test]
fn test_multiple_results_files_last_processed_wins() {
    let dir = tempdir().unwrap();
    let logs = dir.path().join("logs");
    let summary = |total: f64| {
        json!({
            "summary": {
                "output_throughput": 1.0,
                "peak_output_throughput": 2.0,
                "peak_concurrent_requests": 3.0,
                "total_throughput": total
            }
        })
        .to_string()
    };
    write_run(
        &logs,
        "run",
        &[
            ("first_results.json", summary(10.5)),
            ("second_results.json", summary(20.5)),
        ],
    );

    // Directory iteration order is filesystem dependent, so compare against it
    let last = fs::read_dir(logs.join("run"))
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .filter(|name| name.ends_with("_results.json"))
        .last()
        .unwrap();
    let expected_total = if last == "first_results.json" {
        "10.5"
    } else {
        "20.5"
    };

    let records = ReportRunner::collect(&logs).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].to_row()[9], expected_total);
}

#[test]
fn test_report_is_idempotent() {
    let dir = tempdir().unwrap();
    let logs = dir.path().join("logs");
    for (idx, name) in ["2024-05-01_00-00-00", "2024-05-02_00-00-00"].iter().enumerate() {
        let scale = (idx + 1) as f64;
        write_run(
            &logs,
            name,
            &[
                (
                    "run_params.txt",
                    format!("model_name = m/{}\nmax_concurrency = {}\n", idx, 4 * (idx + 1)),
                ),
                ("vllm_server.log", "rocm".to_string()),
                (
                    "benchmark.log",
                    benchmark_log(10.0 * scale, 20.0 * scale, 3.0 * scale, 40.0 * scale),
                ),
            ],
        );
    }
    let output = dir.path().join("benchmark_results.csv");
    let runner = ReportRunner::new();

    runner.generate(&logs, &output).unwrap();
    let first = fs::read(&output).unwrap();
    runner.generate(&logs, &output).unwrap();
    let second = fs::read(&output).unwrap();

    assert_eq!(first, second);
    assert_eq!(data_rows(&output).len(), 2);
}

#[test]
fn test_missing_logs_dir_is_an_error() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("benchmark_results.csv");

    let result = ReportRunner::new().generate(&dir.path().join("logs"), &output);

    assert!(result.is_err());
    assert!(!output.exists());
}
