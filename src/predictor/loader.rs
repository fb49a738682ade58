//! Loads the trained model and its class map once at startup.

use crate::core::config::{ConfigValidator, InferenceConfig, parse_device};
use crate::core::errors::ClassifierResult;
use crate::domain::ClassMap;
use crate::models::{CandleClassifier, ImageClassifier, OnnxClassifier};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// What the loader found on disk.
#[derive(Debug, Clone)]
pub enum ModelState {
    /// No model artifact exists yet; inference cannot run.
    Unavailable,
    /// The model loaded. The class map is `None` when its file is missing,
    /// in which case inference fails with `NotLoaded` when attempted.
    Loaded {
        model: Arc<dyn ImageClassifier>,
        class_map: Option<Arc<ClassMap>>,
    },
}

impl ModelState {
    pub fn is_loaded(&self) -> bool {
        matches!(self, ModelState::Loaded { .. })
    }

    /// True when both the model and the class map are present.
    pub fn is_ready(&self) -> bool {
        matches!(
            self,
            ModelState::Loaded {
                class_map: Some(_),
                ..
            }
        )
    }

    pub fn model(&self) -> Option<&Arc<dyn ImageClassifier>> {
        match self {
            ModelState::Loaded { model, .. } => Some(model),
            ModelState::Unavailable => None,
        }
    }

    pub fn class_map(&self) -> Option<&Arc<ClassMap>> {
        match self {
            ModelState::Loaded { class_map, .. } => class_map.as_ref(),
            ModelState::Unavailable => None,
        }
    }
}

/// Loads the artifacts named in `config`.
///
/// A missing model file is not an error: the result is
/// [`ModelState::Unavailable`] whatever the rest of `config` holds. Files ending in `.onnx` run on ONNX Runtime;
/// anything else is read as a safetensors checkpoint.
///
/// # Errors
///
/// Returns an error if the model file exists and the configuration is
/// invalid, or if an artifact exists but cannot be parsed.
pub fn load_trained_model(config: &InferenceConfig) -> ClassifierResult<ModelState> {
    let model_path = config.model_path.as_path();
    if !model_path.exists() {
        warn!(
            "Model file {} not found; classification is unavailable",
            model_path.display()
        );
        return Ok(ModelState::Unavailable);
    }
    config.validate()?;

    let model = load_model(model_path, config)?;
    info!("Loaded model '{}' from {}", model.name(), model_path.display());

    let class_map = if config.class_names_path.exists() {
        let map = ClassMap::load(&config.class_names_path)?;
        info!(
            "Loaded {} class names from {}",
            map.len(),
            config.class_names_path.display()
        );
        Some(Arc::new(map))
    } else {
        warn!(
            "Class map {} not found; predictions will fail until it exists",
            config.class_names_path.display()
        );
        None
    };

    Ok(ModelState::Loaded { model, class_map })
}

fn load_model(path: &Path, config: &InferenceConfig) -> ClassifierResult<Arc<dyn ImageClassifier>> {
    let is_onnx = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("onnx"));

    if is_onnx {
        let model = OnnxClassifier::load(
            path,
            config.onnx_channel_order,
            config.ort_session.as_ref(),
        )?;
        Ok(Arc::new(model))
    } else {
        let device = parse_device(&config.device)?;
        Ok(Arc::new(CandleClassifier::load(path, &device)?))
    }
}
