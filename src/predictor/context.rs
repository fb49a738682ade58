//! Application state shared by request handlers.
//!
//! A [`ClassifierContext`] is built once at startup and then passed to
//! whatever serves classification requests. Tests build one from parts with
//! a fake model.

use super::classifier::predict_image;
use super::loader::{ModelState, load_trained_model};
use crate::core::config::InferenceConfig;
use crate::core::errors::{ClassifierError, ClassifierResult};
use crate::domain::{ClassMap, Prediction};
use crate::models::ImageClassifier;
use crate::utils::is_allowed_image;
use std::path::Path;
use std::sync::Arc;

/// Loaded artifacts plus the input size they expect.
#[derive(Debug, Clone)]
pub struct ClassifierContext {
    state: ModelState,
    image_size: (u32, u32),
}

impl ClassifierContext {
    /// Loads the artifacts named in `config`.
    pub fn load(config: &InferenceConfig) -> ClassifierResult<Self> {
        Ok(Self {
            state: load_trained_model(config)?,
            image_size: config.image_size,
        })
    }

    /// Builds a context from already loaded parts.
    ///
    /// Without a model the context is unavailable and `class_map` is dropped.
    pub fn from_parts(
        model: Option<Arc<dyn ImageClassifier>>,
        class_map: Option<ClassMap>,
        image_size: (u32, u32),
    ) -> Self {
        let state = match model {
            Some(model) => ModelState::Loaded {
                model,
                class_map: class_map.map(Arc::new),
            },
            None => ModelState::Unavailable,
        };
        Self { state, image_size }
    }

    pub fn state(&self) -> &ModelState {
        &self.state
    }

    pub fn image_size(&self) -> (u32, u32) {
        self.image_size
    }

    /// True when both the model and the class map are loaded.
    pub fn is_ready(&self) -> bool {
        self.state.is_ready()
    }

    /// Classifies one image file.
    pub fn classify(&self, path: &Path) -> ClassifierResult<Prediction> {
        predict_image(
            path,
            self.state.model().map(|model| model.as_ref()),
            self.state.class_map().map(|map| map.as_ref()),
            self.image_size,
        )
    }

    /// Classifies a user-submitted file, rejecting extensions other than
    /// png, jpg, jpeg and gif before reading it.
    pub fn classify_upload(&self, path: &Path) -> ClassifierResult<Prediction> {
        if !is_allowed_image(path) {
            return Err(ClassifierError::invalid_input(format!(
                "{} is not a png, jpg, jpeg or gif file",
                path.display()
            )));
        }
        self.classify(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::MissingArtifact;
    use crate::predictor::classifier::tests::FixedClassifier;
    use image::{Rgb, RgbImage};

    fn ready_context() -> ClassifierContext {
        ClassifierContext::from_parts(
            Some(Arc::new(FixedClassifier::new(vec![0.9, 0.1]))),
            Some(ClassMap::from_labels(["beagle", "pug"])),
            (8, 8),
        )
    }

    #[test]
    fn test_ready_context_classifies() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dog.jpg");
        RgbImage::from_pixel(4, 4, Rgb([1, 2, 3])).save(&path).unwrap();

        let context = ready_context();
        assert!(context.is_ready());
        let prediction = context.classify_upload(&path).unwrap();
        assert_eq!(prediction.label, "beagle");
        assert_eq!(prediction.confidence, 0.9);
    }

    #[test]
    fn test_upload_extension_is_checked_first() {
        let err = ready_context()
            .classify_upload(Path::new("/missing/notes.txt"))
            .unwrap_err();
        assert!(matches!(err, ClassifierError::InvalidInput { .. }));
    }

    #[test]
    fn test_unavailable_context_reports_not_loaded() {
        let context = ClassifierContext::from_parts(None, None, (8, 8));
        assert!(!context.is_ready());
        let err = context.classify(Path::new("/missing/dog.png")).unwrap_err();
        assert!(matches!(
            err,
            ClassifierError::NotLoaded {
                missing: MissingArtifact::Both
            }
        ));
    }

    #[test]
    fn test_context_without_class_map() {
        let context = ClassifierContext::from_parts(
            Some(Arc::new(FixedClassifier::new(vec![1.0]))),
            None,
            (8, 8),
        );
        assert!(context.state().is_loaded());
        assert!(!context.is_ready());
        let err = context.classify(Path::new("/missing/dog.png")).unwrap_err();
        assert!(matches!(
            err,
            ClassifierError::NotLoaded {
                missing: MissingArtifact::ClassMap
            }
        ));
    }

    #[test]
    fn test_load_from_missing_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let config = InferenceConfig::new(
            dir.path().join("dogbreed.safetensors"),
            dir.path().join("class_names.json"),
        );
        let context = ClassifierContext::load(&config).unwrap();
        assert!(matches!(context.state(), ModelState::Unavailable));
        assert_eq!(context.image_size(), config.image_size);
    }
}
