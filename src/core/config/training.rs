//! Training pipeline configuration.

use super::errors::{ConfigError, ConfigValidator};
use crate::core::constants::*;
use crate::core::errors::{ClassifierError, ClassifierResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Random augmentation ranges applied to training samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AugmentationConfig {
    /// Maximum rotation in degrees; the angle is drawn from `[-range, range]`.
    pub rotation_range: f32,
    /// Maximum horizontal shift as a fraction of the width.
    pub width_shift_range: f32,
    /// Maximum vertical shift as a fraction of the height.
    pub height_shift_range: f32,
    /// Zoom factors are drawn from `[1 - range, 1 + range]` per axis.
    pub zoom_range: f32,
    /// Mirror left-right with probability 0.5.
    pub horizontal_flip: bool,
}

impl Default for AugmentationConfig {
    fn default() -> Self {
        Self {
            rotation_range: 20.0,
            width_shift_range: 0.2,
            height_shift_range: 0.2,
            zoom_range: 0.2,
            horizontal_flip: true,
        }
    }
}

impl AugmentationConfig {
    /// Ranges that leave every image untouched.
    pub fn disabled() -> Self {
        Self {
            rotation_range: 0.0,
            width_shift_range: 0.0,
            height_shift_range: 0.0,
            zoom_range: 0.0,
            horizontal_flip: false,
        }
    }
}

impl ConfigValidator for AugmentationConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_non_negative("rotation_range", self.rotation_range)?;
        self.validate_non_negative("width_shift_range", self.width_shift_range)?;
        self.validate_non_negative("height_shift_range", self.height_shift_range)?;
        self.validate_non_negative("zoom_range", self.zoom_range)?;
        if self.zoom_range >= 1.0 {
            return Err(ConfigError::InvalidConfig {
                message: format!("zoom_range must be below 1.0, got {}", self.zoom_range),
            });
        }
        Ok(())
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

/// Configuration of a training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Dataset root; samples are read from `<dataset_dir>/train`.
    pub dataset_dir: PathBuf,
    /// Model input size (height, width).
    pub image_size: (u32, u32),
    /// Samples per optimizer step.
    pub batch_size: usize,
    /// Number of passes over the training subset.
    pub epochs: usize,
    /// Where the best checkpoint is written.
    pub output_model: PathBuf,
    /// Where the index-to-label mapping is written after training.
    pub class_names_path: PathBuf,
    /// Pretrained VGG19 weights for the frozen feature extractor.
    pub backbone_weights: PathBuf,
    /// Fraction of each class held out for validation.
    pub validation_split: f32,
    /// Initial optimizer learning rate.
    pub learning_rate: f64,
    /// Seed for shuffling and augmentation; random when absent.
    pub seed: Option<u64>,
    /// Compute device: `cpu`, `cuda` or `cuda:N`.
    pub device: String,
    /// Augmentation applied to the training subset.
    pub augmentation: AugmentationConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            dataset_dir: PathBuf::from(DEFAULT_DATASET_DIR),
            image_size: DEFAULT_IMAGE_SIZE,
            batch_size: DEFAULT_BATCH_SIZE,
            epochs: DEFAULT_EPOCHS,
            output_model: PathBuf::from(DEFAULT_MODEL_PATH),
            class_names_path: PathBuf::from(DEFAULT_CLASS_NAMES_PATH),
            backbone_weights: PathBuf::from(DEFAULT_BACKBONE_PATH),
            validation_split: DEFAULT_VALIDATION_SPLIT,
            learning_rate: DEFAULT_LEARNING_RATE,
            seed: None,
            device: "cpu".to_string(),
            augmentation: AugmentationConfig::default(),
        }
    }
}

impl TrainingConfig {
    /// Reads a configuration from a JSON file; missing fields take defaults.
    pub fn from_json_file(path: &Path) -> ClassifierResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| ClassifierError::io(path, e))?;
        serde_json::from_str(&raw).map_err(|e| ClassifierError::json(path, e))
    }

    /// Directory holding the class folders.
    pub fn train_dir(&self) -> PathBuf {
        self.dataset_dir.join(TRAIN_SUBDIR)
    }
}

impl ConfigValidator for TrainingConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_batch_size(self.batch_size)?;
        if self.epochs == 0 {
            return Err(ConfigError::InvalidConfig {
                message: "epochs must be greater than 0".to_string(),
            });
        }
        self.validate_input_size(self.image_size, 1)?;
        self.validate_open_unit_fraction("validation_split", self.validation_split)?;
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(ConfigError::InvalidConfig {
                message: format!(
                    "learning_rate must be greater than 0, got {}",
                    self.learning_rate
                ),
            });
        }
        self.augmentation.validate()
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = TrainingConfig::default();
        assert_eq!(config.image_size, (128, 128));
        assert_eq!(config.batch_size, 32);
        assert_eq!(config.epochs, 6);
        assert_eq!(config.train_dir(), PathBuf::from("dataset").join("train"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_batch_size() {
        let config = TrainingConfig {
            batch_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBatchSize)
        ));
    }

    #[test]
    fn test_rejects_empty_image_size() {
        let config = TrainingConfig {
            image_size: (0, 128),
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(config.validate_input_size((100, 128), 32).is_err());
    }

    #[test]
    fn test_rejects_full_zoom_range() {
        let aug = AugmentationConfig {
            zoom_range: 1.0,
            ..Default::default()
        };
        assert!(aug.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: TrainingConfig =
            serde_json::from_str(r#"{ "epochs": 10, "seed": 7 }"#).unwrap();
        assert_eq!(config.epochs, 10);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(config.augmentation, AugmentationConfig::default());
    }
}
