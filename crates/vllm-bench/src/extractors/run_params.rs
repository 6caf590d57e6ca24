use crate::utilities::read_artifact;
use std::collections::HashMap;
use std::path::Path;

/// Parse a `run_params.txt` file of `key = value` lines.
///
/// Blank lines, `#` comments and lines without `=` are skipped. Only the first
/// `=` splits a line, so values may contain `=` themselves. A missing file
/// yields an empty map.
pub fn parse_run_params(params_file: &Path) -> HashMap<String, String> {
    let mut params = HashMap::new();
    let Some(content) = read_artifact(params_file) else {
        return params;
    };

    for line in content.lines() {
        let line = line.trim();
        if line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            params.insert(key.trim().to_string(), value.trim().to_string());
        }
    }

    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_parse_run_params() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run_params.txt");
        fs::write(
            &path,
            "# benchmark parameters\n\
             model_name = meta-llama/Llama-3.1-8B-Instruct\n\
             max_concurrency=16\n\
             \n\
             not a pair\n\
             extra_args = --dtype=bfloat16  \n\
             #num_prompts = 1\n\
             num_prompts = 200\n",
        )
        .unwrap();

        let params = parse_run_params(&path);
        assert_eq!(params.len(), 4);
        assert_eq!(params["model_name"], "meta-llama/Llama-3.1-8B-Instruct");
        assert_eq!(params["max_concurrency"], "16");
        assert_eq!(params["extra_args"], "--dtype=bfloat16");
        assert_eq!(params["num_prompts"], "200");
    }

    #[test]
    fn test_later_keys_overwrite_earlier_ones() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run_params.txt");
        fs::write(&path, "max_concurrency = 4\nmax_concurrency = 8\n").unwrap();

        assert_eq!(parse_run_params(&path)["max_concurrency"], "8");
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        assert!(parse_run_params(&dir.path().join("run_params.txt")).is_empty());
    }
}
