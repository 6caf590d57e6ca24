use crate::utilities::read_artifact;
use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;

lazy_static! {
    // vLLM's engine config dump, e.g. `model='google/gemma-3-4b-it'`
    static ref QUOTED_MODEL_PATTERN: Regex = Regex::new(r"model='([^']+)'").unwrap();
    static ref JSON_MODEL_PATTERN: Regex = Regex::new(r#""model":\s*"([^"]+)""#).unwrap();
}

/// Recover the served model name from a vLLM server log
pub fn extract_model_name(server_log: &Path) -> Option<String> {
    let content = read_artifact(server_log)?;

    [&*QUOTED_MODEL_PATTERN, &*JSON_MODEL_PATTERN]
        .into_iter()
        .find_map(|pattern| pattern.captures(&content))
        .map(|caps| caps[1].to_string())
}
