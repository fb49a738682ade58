//! Compute device selection for candle models.

use crate::core::errors::{ClassifierError, ClassifierResult};
use candle_core::Device;

/// Parses a device string and creates a candle [`Device`].
///
/// # Supported formats
///
/// - `"cpu"` -> CPU device
/// - `"cuda"` or `"gpu"` -> CUDA device 0
/// - `"cuda:N"` -> CUDA device N
pub fn parse_device(device_str: &str) -> ClassifierResult<Device> {
    let device_str = device_str.to_lowercase();
    match device_str.as_str() {
        "cpu" => Ok(Device::Cpu),
        "cuda" | "gpu" => cuda_device(0),
        s if s.starts_with("cuda:") => {
            let ordinal: usize = s["cuda:".len()..].parse().map_err(|_| {
                ClassifierError::config_error_with_context(
                    "device",
                    s,
                    "invalid CUDA device ordinal",
                )
            })?;
            cuda_device(ordinal)
        }
        _ => Err(ClassifierError::config_error(format!(
            "Unknown device: {device_str}. Use 'cpu', 'cuda', or 'cuda:N'"
        ))),
    }
}

#[cfg(feature = "cuda")]
fn cuda_device(ordinal: usize) -> ClassifierResult<Device> {
    Device::new_cuda(ordinal).map_err(|e| {
        ClassifierError::config_error(format!("failed to open CUDA device {ordinal}: {e}"))
    })
}

#[cfg(not(feature = "cuda"))]
fn cuda_device(_ordinal: usize) -> ClassifierResult<Device> {
    Err(ClassifierError::config_error(
        "CUDA support not enabled. Compile with --features cuda",
    ))
}
