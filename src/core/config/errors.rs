//! Configuration error types and validation traits.

use thiserror::Error;

/// Errors that can occur during configuration validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error indicating that a batch size is invalid (must be greater than 0).
    #[error("batch size must be greater than 0")]
    InvalidBatchSize,

    /// Error indicating that a configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// A trait for validating configuration parameters.
///
/// Implementors provide `validate` and `get_defaults`; the remaining methods
/// are shared checks for the values that show up across configs.
pub trait ConfigValidator {
    /// Validates the configuration.
    fn validate(&self) -> Result<(), ConfigError>;

    /// Returns the default configuration.
    fn get_defaults() -> Self
    where
        Self: Sized;

    /// Validates a batch size.
    fn validate_batch_size(&self, batch_size: usize) -> Result<(), ConfigError> {
        if batch_size == 0 {
            Err(ConfigError::InvalidBatchSize)
        } else {
            Ok(())
        }
    }

    /// Validates the model input size.
    ///
    /// Both sides must be at least `multiple` pixels and divisible by it, so
    /// every max-pool in the feature extractor halves an even extent.
    fn validate_input_size(&self, (height, width): (u32, u32), multiple: u32) -> Result<(), ConfigError> {
        if height == 0 || width == 0 {
            return Err(ConfigError::InvalidConfig {
                message: "Image dimensions must be positive".to_string(),
            });
        }
        if height < multiple || width < multiple || height % multiple != 0 || width % multiple != 0
        {
            return Err(ConfigError::InvalidConfig {
                message: format!(
                    "Image size {height}x{width} must be a multiple of {multiple} and at least {multiple}"
                ),
            });
        }
        Ok(())
    }

    /// Validates a fraction that must lie strictly between 0 and 1.
    fn validate_open_unit_fraction(&self, name: &str, value: f32) -> Result<(), ConfigError> {
        if value > 0.0 && value < 1.0 {
            Ok(())
        } else {
            Err(ConfigError::InvalidConfig {
                message: format!("{name} must be between 0.0 and 1.0 (exclusive), got {value}"),
            })
        }
    }

    /// Validates a range parameter that must be finite and non-negative.
    fn validate_non_negative(&self, name: &str, value: f32) -> Result<(), ConfigError> {
        if value.is_finite() && value >= 0.0 {
            Ok(())
        } else {
            Err(ConfigError::InvalidConfig {
                message: format!("{name} must be a finite non-negative number, got {value}"),
            })
        }
    }
}
