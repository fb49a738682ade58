//! Error constructor utilities.
//!
//! Helpers for building [`ClassifierError`] values with context attached, so
//! call sites stay short when wrapping candle, ort, and io failures.
//!
//! ```rust
//! use dogbreed::core::ClassifierError;
//!
//! let error = ClassifierError::config_error("batch size must be greater than 0");
//! assert_eq!(
//!     error.to_string(),
//!     "configuration error: batch size must be greater than 0"
//! );
//! ```

use super::types::{ClassifierError, ProcessingStage};
use std::path::Path;

impl ClassifierError {
    /// Internal helper to build a Processing error with minimal boilerplate.
    #[inline]
    fn processing_with_context(
        kind: ProcessingStage,
        context: impl Into<String>,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind,
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates an error for a processing stage.
    pub fn processing(
        kind: ProcessingStage,
        context: impl Into<String>,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::processing_with_context(kind, context, error)
    }

    /// Creates an error for a failed forward pass or training step.
    pub fn inference_error(
        model_name: impl Into<String>,
        context: impl Into<String>,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Inference {
            model_name: model_name.into(),
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates an error for a model artifact that could not be loaded.
    ///
    /// # Arguments
    ///
    /// * `path` - Path of the artifact.
    /// * `context` - What was being attempted.
    /// * `suggestion` - Optional hint for the user.
    /// * `error` - Optional underlying cause.
    pub fn model_load_error(
        path: &Path,
        context: impl Into<String>,
        suggestion: Option<&str>,
        error: Option<impl std::error::Error + Send + Sync + 'static>,
    ) -> Self {
        Self::ModelLoad {
            path: path.to_path_buf(),
            context: context.into(),
            suggestion: suggestion.map(str::to_string),
            source: error.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
        }
    }

    /// Wraps an io error with the path it happened at.
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Wraps a serde_json error with the file it happened in.
    pub fn json(path: &Path, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Creates an error for invalid input.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates an error for configuration problems.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Creates a configuration error that names the offending field.
    pub fn config_error_with_context(field: &str, value: &str, reason: &str) -> Self {
        Self::ConfigError {
            message: format!(
                "Configuration error in field '{field}' with value '{value}': {reason}"
            ),
        }
    }
}

/// Converts a candle error raised inside a model into an inference error.
pub fn candle_to_inference(
    model_name: &str,
    context: impl Into<String>,
    err: candle_core::Error,
) -> ClassifierError {
    ClassifierError::Inference {
        model_name: model_name.to_string(),
        context: context.into(),
        source: Box::new(err),
    }
}

/// Converts a candle error raised while shaping data into a processing error.
pub fn candle_to_processing(
    kind: ProcessingStage,
    context: impl Into<String>,
    err: candle_core::Error,
) -> ClassifierError {
    ClassifierError::Processing {
        kind,
        context: context.into(),
        source: Box::new(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::MissingArtifact;

    #[test]
    fn test_not_loaded_message_names_artifact() {
        let err = ClassifierError::NotLoaded {
            missing: MissingArtifact::Both,
        };
        assert_eq!(err.to_string(), "model and class map not loaded");
    }

    #[test]
    fn test_model_load_error_includes_suggestion() {
        let err = ClassifierError::model_load_error(
            Path::new("dogbreed.safetensors"),
            "missing tensor head.fc2.weight",
            Some("retrain the model"),
            None::<std::io::Error>,
        );
        let message = err.to_string();
        assert!(message.contains("dogbreed.safetensors"));
        assert!(message.contains("(retrain the model)"));
    }

    #[test]
    fn test_processing_error_reports_stage() {
        let err = ClassifierError::processing(
            ProcessingStage::TensorOperation,
            "reshape batch",
            std::io::Error::other("bad shape"),
        );
        assert_eq!(err.to_string(), "tensor operation failed: reshape batch");
    }
}
