//! Inference-side configuration: where the artifacts live and how inputs are shaped.

use super::errors::{ConfigError, ConfigValidator};
use super::onnx::OrtSessionConfig;
use crate::core::constants::*;
use crate::processors::ChannelOrder;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration consumed by the artifact loader and the inference pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Trained model artifact (`.safetensors` or `.onnx`).
    pub model_path: PathBuf,
    /// Index-to-label mapping written by training.
    pub class_names_path: PathBuf,
    /// Input size (height, width); must match the size used at training time.
    pub image_size: (u32, u32),
    /// Channel layout fed to ONNX models. Safetensors artifacts always use CHW.
    pub onnx_channel_order: ChannelOrder,
    /// Compute device for safetensors artifacts.
    pub device: String,
    /// ONNX Runtime session options.
    pub ort_session: Option<OrtSessionConfig>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            class_names_path: PathBuf::from(DEFAULT_CLASS_NAMES_PATH),
            image_size: DEFAULT_IMAGE_SIZE,
            onnx_channel_order: ChannelOrder::HWC,
            device: "cpu".to_string(),
            ort_session: None,
        }
    }
}

impl InferenceConfig {
    /// Creates a configuration pointing at the given artifacts.
    pub fn new(model_path: impl Into<PathBuf>, class_names_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            class_names_path: class_names_path.into(),
            ..Default::default()
        }
    }

    /// Sets the input size.
    pub fn with_image_size(mut self, image_size: (u32, u32)) -> Self {
        self.image_size = image_size;
        self
    }

    /// Sets the channel layout for ONNX models.
    pub fn with_onnx_channel_order(mut self, order: ChannelOrder) -> Self {
        self.onnx_channel_order = order;
        self
    }

    /// Sets the compute device.
    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = device.into();
        self
    }
}

impl ConfigValidator for InferenceConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_input_size(self.image_size, 1)
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}
