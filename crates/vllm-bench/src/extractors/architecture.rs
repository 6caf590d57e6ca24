use crate::reporting::Architecture;
use crate::utilities::read_artifact;
use std::path::Path;

/// Detect the hardware backend from a vLLM server log.
///
/// ROCm is checked first: ROCm builds of vLLM still mention CUDA in their
/// logs, so a log containing both is a ROCm run.
pub fn detect_architecture(log_file: &Path) -> Architecture {
    let Some(content) = read_artifact(log_file) else {
        return Architecture::Unknown;
    };

    let content = content.to_lowercase();
    if content.contains("rocm") {
        Architecture::Rocm
    } else if content.contains("cuda") {
        Architecture::Cuda
    } else {
        Architecture::Unknown
    }
}
