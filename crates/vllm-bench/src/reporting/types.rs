use serde_json::Value;
use std::fmt;

/// Placeholder written for any field that could not be extracted
pub const NOT_AVAILABLE: &str = "N/A";

/// Report columns, in output order
pub const REPORT_COLUMNS: [&str; 10] = [
    "timestamp",
    "model_name",
    "model_size",
    "architecture",
    "concurrency",
    "num_prompts",
    "output_throughput",
    "peak_output_throughput",
    "peak_concurrent_requests",
    "total_throughput",
];

/// Hardware backend the inference server ran on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Architecture {
    Cuda,
    Rocm,
    Unknown,
}

impl Architecture {
    pub fn as_str(&self) -> &'static str {
        match self {
            Architecture::Cuda => "CUDA",
            Architecture::Rocm => "ROCm",
            Architecture::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single metric cell.
///
/// Values parsed out of `benchmark.log` are always floats. Values copied out of
/// a `*_results.json` summary are kept as-is, since the summary may hold
/// integers, strings or nulls.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    Float(f64),
    Json(Value),
}

impl MetricValue {
    /// Whether the value counts as a concrete measurement for the completeness check
    pub fn is_populated(&self) -> bool {
        match self {
            MetricValue::Float(_) => true,
            MetricValue::Json(Value::Null) => false,
            MetricValue::Json(Value::String(s)) => !matches!(s.as_str(), NOT_AVAILABLE | "" | "nan"),
            MetricValue::Json(_) => true,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Float(v) => f.write_str(&format_float(*v)),
            MetricValue::Json(Value::Null) => Ok(()),
            MetricValue::Json(Value::String(s)) => f.write_str(s),
            MetricValue::Json(Value::Bool(b)) => f.write_str(if *b { "True" } else { "False" }),
            MetricValue::Json(Value::Number(n)) => {
                if let Some(i) = n.as_i64() {
                    write!(f, "{}", i)
                } else if let Some(u) = n.as_u64() {
                    write!(f, "{}", u)
                } else {
                    f.write_str(&format_float(n.as_f64().unwrap_or(f64::NAN)))
                }
            }
            MetricValue::Json(other) => write!(f, "{}", other),
        }
    }
}

/// Formats a float with shortest round-trip digits, keeping a `.0` on
/// integral values and switching to `1e+16` style exponents at the same
/// thresholds as the CSV baselines this report is compared against.
pub fn format_float(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let magnitude = v.abs();
    if magnitude >= 1e16 || (magnitude != 0.0 && magnitude < 1e-4) {
        let formatted = format!("{:e}", v);
        return match formatted.split_once('e') {
            Some((mantissa, exponent)) => {
                let exponent: i32 = exponent.parse().unwrap_or(0);
                let sign = if exponent < 0 { '-' } else { '+' };
                format!("{}e{}{:02}", mantissa, sign, exponent.abs())
            }
            None => formatted,
        };
    }

    if v.fract() == 0.0 {
        format!("{:.1}", v)
    } else {
        format!("{}", v)
    }
}

/// The four throughput/concurrency metrics of a run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BenchmarkMetrics {
    pub output_throughput: Option<MetricValue>,
    pub peak_output_throughput: Option<MetricValue>,
    pub peak_concurrent_requests: Option<MetricValue>,
    pub total_throughput: Option<MetricValue>,
}

impl BenchmarkMetrics {
    pub fn is_empty(&self) -> bool {
        self.fields().iter().all(|field| field.is_none())
    }

    /// Number of metrics that were found
    pub fn len(&self) -> usize {
        self.fields().iter().filter(|field| field.is_some()).count()
    }

    /// True when all four metrics hold concrete values
    pub fn is_complete(&self) -> bool {
        self.fields()
            .iter()
            .all(|field| field.as_ref().is_some_and(MetricValue::is_populated))
    }

    /// Overwrite every metric that `other` provides, leaving the rest untouched
    pub fn update(&mut self, other: BenchmarkMetrics) {
        if other.output_throughput.is_some() {
            self.output_throughput = other.output_throughput;
        }
        if other.peak_output_throughput.is_some() {
            self.peak_output_throughput = other.peak_output_throughput;
        }
        if other.peak_concurrent_requests.is_some() {
            self.peak_concurrent_requests = other.peak_concurrent_requests;
        }
        if other.total_throughput.is_some() {
            self.total_throughput = other.total_throughput;
        }
    }

    fn fields(&self) -> [&Option<MetricValue>; 4] {
        [
            &self.output_throughput,
            &self.peak_output_throughput,
            &self.peak_concurrent_requests,
            &self.total_throughput,
        ]
    }
}

/// One report row, built per run directory
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    pub timestamp: String,
    pub model_name: String,
    pub model_size: String,
    pub architecture: Option<Architecture>,
    pub concurrency: String,
    pub num_prompts: String,
    pub metrics: BenchmarkMetrics,
}

impl RunRecord {
    /// A record with every field set to `N/A`
    pub fn new(timestamp: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            model_name: NOT_AVAILABLE.to_string(),
            model_size: NOT_AVAILABLE.to_string(),
            architecture: None,
            concurrency: NOT_AVAILABLE.to_string(),
            num_prompts: NOT_AVAILABLE.to_string(),
            metrics: BenchmarkMetrics::default(),
        }
    }

    pub fn has_complete_metrics(&self) -> bool {
        self.metrics.is_complete()
    }

    /// Render the record as CSV cells in `REPORT_COLUMNS` order
    pub fn to_row(&self) -> Vec<String> {
        let metric = |value: &Option<MetricValue>| {
            value
                .as_ref()
                .map(MetricValue::to_string)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string())
        };

        vec![
            self.timestamp.clone(),
            self.model_name.clone(),
            self.model_size.clone(),
            self.architecture
                .map(|arch| arch.to_string())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            self.concurrency.clone(),
            self.num_prompts.clone(),
            metric(&self.metrics.output_throughput),
            metric(&self.metrics.peak_output_throughput),
            metric(&self.metrics.peak_concurrent_requests),
            metric(&self.metrics.total_throughput),
        ]
    }
}
