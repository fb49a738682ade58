//! # dogbreed
//!
//! Dog breed image classification: fine-tune a classification head on top of
//! a frozen, pretrained VGG19 feature extractor, then classify single images
//! with the trained model and its class map.
//!
//! ## Features
//!
//! - Dataset discovery from a `train/` directory of class folders
//! - Random affine augmentation with seeded, reproducible batches
//! - Candle training loop with plateau learning-rate reduction and
//!   best-accuracy checkpointing
//! - Inference from safetensors checkpoints (candle) or ONNX exports (ONNX Runtime)
//!
//! ## Modules
//!
//! * [`core`] - Configuration, errors, constants, batching and ONNX Runtime glue
//! * [`domain`] - Class map, dataset scan and prediction types
//! * [`models`] - The [`models::ImageClassifier`] trait and its backends
//! * [`pipeline`] - The training pipeline
//! * [`predictor`] - Artifact loading and single-image inference
//! * [`processors`] - Normalization and augmentation
//! * [`utils`] - Image loading and arg-max helpers
//!
//! ## Quick Start
//!
//! ### Training
//!
//! ```rust,no_run
//! use dogbreed::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TrainingConfig {
//!     epochs: 6,
//!     seed: Some(42),
//!     ..Default::default()
//! };
//! let report = build_and_train(&config)?;
//! println!("{report}");
//! # Ok(())
//! # }
//! ```
//!
//! ### Classifying an image
//!
//! ```rust,no_run
//! use dogbreed::prelude::*;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let context = ClassifierContext::load(&InferenceConfig::default())?;
//! if context.is_ready() {
//!     let prediction = context.classify(Path::new("uploads/dog.jpg"))?;
//!     println!("{} ({:.2}%)", prediction.label, prediction.confidence_percent());
//! }
//! # Ok(())
//! # }
//! ```

// Core modules
pub mod core;
pub mod domain;
pub mod models;

pub mod pipeline;
pub mod predictor;
pub mod processors;
pub mod utils;

/// Prelude module for convenient imports.
///
/// ```rust
/// use dogbreed::prelude::*;
/// ```
///
/// Included items cover the two entry points:
/// - Training (`TrainingConfig`, `build_and_train`, `TrainingReport`)
/// - Inference (`InferenceConfig`, `ClassifierContext`, `predict_image`, `Prediction`)
/// - Essential error and result types (`ClassifierError`, `ClassifierResult`)
pub mod prelude {
    // Training
    pub use crate::core::config::{AugmentationConfig, TrainingConfig};
    pub use crate::pipeline::{TrainingReport, build_and_train};

    // Inference
    pub use crate::core::config::InferenceConfig;
    pub use crate::domain::{ClassMap, Prediction};
    pub use crate::models::ImageClassifier;
    pub use crate::predictor::{ClassifierContext, ModelState, load_trained_model, predict_image};

    // Error Handling
    pub use crate::core::errors::{ClassifierError, ClassifierResult};
}
