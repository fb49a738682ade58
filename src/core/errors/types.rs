//! Error type definitions for the classifier.

use std::path::PathBuf;
use thiserror::Error;

/// Stage of the image pipeline where a processing error happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    /// Generic tensor manipulation.
    TensorOperation,
    /// Turning model outputs into predictions.
    PostProcessing,
    /// Writing a checkpoint or mapping file.
    Persistence,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ProcessingStage::TensorOperation => "tensor operation",
            ProcessingStage::PostProcessing => "post-processing",
            ProcessingStage::Persistence => "persistence",
        };
        f.write_str(name)
    }
}

/// Which loaded artifact was missing when inference was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingArtifact {
    Model,
    ClassMap,
    Both,
}

impl std::fmt::Display for MissingArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MissingArtifact::Model => f.write_str("model"),
            MissingArtifact::ClassMap => f.write_str("class map"),
            MissingArtifact::Both => f.write_str("model and class map"),
        }
    }
}

/// Plain message error used as a `source` when no underlying error exists.
#[derive(Debug, Clone)]
pub struct OpaqueError(pub String);

impl std::fmt::Display for OpaqueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for OpaqueError {}

/// Errors produced while training, loading, or running the classifier.
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// The dataset root has no `train` subdirectory.
    #[error("training directory not found: {}", path.display())]
    DatasetNotFound { path: PathBuf },

    /// The dataset exists but cannot feed a training run.
    #[error("dataset at {} is unusable: {reason}", path.display())]
    EmptyDataset { path: PathBuf, reason: String },

    /// Inference was requested before the model or class map was loaded.
    #[error("{missing} not loaded")]
    NotLoaded { missing: MissingArtifact },

    /// Image decoding failed.
    #[error("failed to load image")]
    ImageLoad(#[source] image::ImageError),

    /// Filesystem access failed.
    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON (de)serialization failed.
    #[error("invalid json in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The class mapping file parsed but does not hold integer keys.
    #[error("class map key '{key}' is not a non-negative integer")]
    ClassMapFormat { key: String },

    /// A model artifact could not be opened or assembled.
    #[error("failed to load model from {}: {context}{}", path.display(), suggestion.as_deref().map(|s| format!(" ({s})")).unwrap_or_default())]
    ModelLoad {
        path: PathBuf,
        context: String,
        suggestion: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A forward pass or training step failed.
    #[error("inference failed for model '{model_name}': {context}")]
    Inference {
        model_name: String,
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Image or tensor processing failed.
    #[error("{kind} failed: {context}")]
    Processing {
        kind: ProcessingStage,
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A configuration value is invalid.
    #[error("configuration error: {message}")]
    ConfigError { message: String },

    /// Invalid input to an operation.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// An ndarray shape did not match the data.
    #[error("tensor shape error")]
    Tensor(#[from] ndarray::ShapeError),
}

impl From<crate::core::config::ConfigError> for ClassifierError {
    fn from(error: crate::core::config::ConfigError) -> Self {
        ClassifierError::ConfigError {
            message: error.to_string(),
        }
    }
}
