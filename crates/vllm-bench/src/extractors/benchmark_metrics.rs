use crate::reporting::{BenchmarkMetrics, MetricValue, NOT_AVAILABLE};
use crate::utilities::read_artifact;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

/// Free-text output of `vllm bench serve`
pub const BENCHMARK_LOG: &str = "benchmark.log";

/// Suffix of the JSON result files saved by `--save-result`
pub const RESULTS_SUFFIX: &str = "_results.json";

lazy_static! {
    static ref OUTPUT_THROUGHPUT: Regex =
        Regex::new(r"Output token throughput \(tok/s\):\s+([\d.]+)").unwrap();
    static ref PEAK_OUTPUT_THROUGHPUT: Regex =
        Regex::new(r"Peak output token throughput \(tok/s\):\s+([\d.]+)").unwrap();
    static ref PEAK_CONCURRENT_REQUESTS: Regex =
        Regex::new(r"Peak concurrent requests:\s+([\d.]+)").unwrap();
    static ref TOTAL_THROUGHPUT: Regex =
        Regex::new(r"Total Token throughput \(tok/s\):\s+([\d.]+)").unwrap();
}

/// Bare non-finite literals that benchmark tooling writes into result JSON
const NON_FINITE: [(&str, f64); 3] = [
    ("-Infinity", f64::NEG_INFINITY),
    ("Infinity", f64::INFINITY),
    ("NaN", f64::NAN),
];

/// Prefix of the placeholder strings standing in for non-finite literals
const NON_FINITE_MARKER: char = '\u{0}';

/// Parse the four throughput metrics of a run.
///
/// `benchmark.log` is searched first. Only when it yields nothing at all are
/// the `*_results.json` files consulted, each one overwriting the previous in
/// directory iteration order.
pub fn parse_benchmark_results(run_dir: &Path) -> BenchmarkMetrics {
    let benchmark_log = run_dir.join(BENCHMARK_LOG);
    let mut metrics = if benchmark_log.exists() {
        parse_benchmark_log(&benchmark_log)
    } else {
        BenchmarkMetrics::default()
    };

    if metrics.is_empty() {
        for result_file in results_files(run_dir) {
            if let Some(summary) = parse_results_summary(&result_file) {
                metrics = summary;
            }
        }
    }

    metrics
}

fn parse_benchmark_log(path: &Path) -> BenchmarkMetrics {
    let mut metrics = BenchmarkMetrics::default();
    let Some(content) = read_artifact(path) else {
        return metrics;
    };

    let searches: [(&Regex, &mut Option<MetricValue>); 4] = [
        (&*OUTPUT_THROUGHPUT, &mut metrics.output_throughput),
        (&*PEAK_OUTPUT_THROUGHPUT, &mut metrics.peak_output_throughput),
        (&*PEAK_CONCURRENT_REQUESTS, &mut metrics.peak_concurrent_requests),
        (&*TOTAL_THROUGHPUT, &mut metrics.total_throughput),
    ];

    for (pattern, slot) in searches {
        let Some(caps) = pattern.captures(&content) else {
            continue;
        };
        match caps[1].parse::<f64>() {
            Ok(value) => *slot = Some(MetricValue::Float(value)),
            Err(e) => {
                // A garbled number ends the scan; metrics found so far are kept
                tracing::warn!(
                    "Unparseable metric {:?} in {}: {}",
                    &caps[1],
                    path.display(),
                    e
                );
                break;
            }
        }
    }

    metrics
}

fn results_files(run_dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(run_dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!("Could not list {}: {}", run_dir.display(), e);
            return Vec::new();
        }
    };

    entries
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            let name = path.file_name()?.to_str()?;
            if name.ends_with(RESULTS_SUFFIX) {
                Some(path)
            } else {
                None
            }
        })
        .collect()
}

fn parse_results_summary(path: &Path) -> Option<BenchmarkMetrics> {
    let content = read_artifact(path)?;
    let document: Value = match serde_json::from_str(&quote_non_finite(&content)) {
        Ok(document) => document,
        Err(e) => {
            tracing::warn!("Skipping malformed results file {}: {}", path.display(), e);
            return None;
        }
    };

    let Value::Object(document) = document else {
        tracing::debug!("Ignoring {}: not a JSON object", path.display());
        return None;
    };
    let summary = match document.get("summary") {
        Some(Value::Object(summary)) => summary,
        Some(other) => {
            tracing::warn!(
                "Skipping {}: summary is not an object ({})",
                path.display(),
                other
            );
            return None;
        }
        None => return None,
    };

    let metric = |key: &str| {
        Some(
            summary
                .get(key)
                .cloned()
                .map(restore_non_finite)
                .unwrap_or_else(|| MetricValue::Json(Value::String(NOT_AVAILABLE.to_string()))),
        )
    };

    Some(BenchmarkMetrics {
        output_throughput: metric("output_throughput"),
        peak_output_throughput: metric("peak_output_throughput"),
        peak_concurrent_requests: metric("peak_concurrent_requests"),
        total_throughput: metric("total_throughput"),
    })
}

/// Rewrite bare `NaN`, `Infinity` and `-Infinity` outside of strings into
/// marker strings so the document parses as strict JSON
fn quote_non_finite(text: &str) -> Cow<'_, str> {
    if !text.contains("NaN") && !text.contains("Infinity") {
        return Cow::Borrowed(text);
    }

    let mut quoted = String::with_capacity(text.len() + 16);
    let mut rest = text;
    let mut in_string = false;
    let mut escaped = false;

    'scan: while let Some(c) = rest.chars().next() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
        } else {
            for (literal, _) in NON_FINITE {
                if let Some(tail) = rest.strip_prefix(literal) {
                    quoted.push_str("\"\\u0000");
                    quoted.push_str(literal);
                    quoted.push('"');
                    rest = tail;
                    continue 'scan;
                }
            }
        }
        quoted.push(c);
        rest = &rest[c.len_utf8()..];
    }

    Cow::Owned(quoted)
}

fn restore_non_finite(value: Value) -> MetricValue {
    if let Value::String(text) = &value {
        if let Some(literal) = text.strip_prefix(NON_FINITE_MARKER) {
            if let Some((_, number)) = NON_FINITE.iter().find(|(name, _)| *name == literal) {
                return MetricValue::Float(*number);
            }
        }
    }
    MetricValue::Json(value)
}
