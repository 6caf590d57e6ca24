use crate::utilities::read_artifact;
use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;

lazy_static! {
    static ref MODEL_LOADING_PATTERN: Regex =
        Regex::new(r"Model loading took ([\d.]+) GiB memory").unwrap();
}

/// Extract the loaded model size (e.g. `"14.99 GiB"`) from `model_memory_info.txt`
pub fn extract_model_size(memory_file: &Path) -> Option<String> {
    let content = read_artifact(memory_file)?;
    MODEL_LOADING_PATTERN
        .captures(&content)
        .map(|caps| format!("{} GiB", &caps[1]))
}
