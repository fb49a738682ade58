//! The core module.
//!
//! This module contains the fundamental building blocks shared by training
//! and inference:
//! - Batch utilities and tensor aliases
//! - Configuration management
//! - Constants used throughout the crate
//! - Error handling
//! - ONNX Runtime integration
//!
//! It also re-exports the commonly used types for convenience.

pub mod batch;
pub mod config;
pub mod constants;
pub mod errors;
pub mod inference;

pub use crate::utils::{load_image, load_images_batch_with_threshold};
pub use batch::{BatchSampler, Tensor2D, Tensor4D};
pub use config::{
    AugmentationConfig, ConfigError, ConfigValidator, InferenceConfig, TrainingConfig,
};
pub use constants::*;
pub use errors::{ClassifierError, ClassifierResult, MissingArtifact, ProcessingStage};
pub use inference::OrtInfer;

/// Initializes the tracing subscriber for logging.
///
/// This function sets up the tracing subscriber with environment filter and formatting layer.
/// It's typically called at the start of an application to enable logging.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
