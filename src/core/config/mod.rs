//! Configuration types for training, inference, and ONNX Runtime sessions.

pub mod device;
pub mod errors;
pub mod inference;
pub mod onnx;
pub mod training;

pub use device::parse_device;
pub use errors::{ConfigError, ConfigValidator};
pub use inference::InferenceConfig;
pub use onnx::{OrtExecutionProvider, OrtGraphOptimizationLevel, OrtSessionConfig};
pub use training::{AugmentationConfig, TrainingConfig};
