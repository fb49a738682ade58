//! Single-image inference: decode, preprocess, forward, arg-max.

use crate::core::errors::{
    ClassifierError, ClassifierResult, MissingArtifact, OpaqueError, ProcessingStage,
};
use crate::domain::{ClassMap, Prediction};
use crate::models::ImageClassifier;
use crate::processors::NormalizeImage;
use crate::utils::{argmax, load_image_resized};
use std::path::Path;
use tracing::debug;

/// Classifies the image at `path`.
///
/// The image is decoded, converted to RGB, resized to `image_size`
/// (height, width) with nearest-neighbour sampling and rescaled to `[0, 1]`
/// before a single forward pass. The confidence is the model's output at the
/// winning index, unchanged.
///
/// # Errors
///
/// Returns `NotLoaded` when `model` or `class_map` is `None`, before the
/// path is touched. Decode and forward-pass failures are propagated.
pub fn predict_image(
    path: &Path,
    model: Option<&dyn ImageClassifier>,
    class_map: Option<&ClassMap>,
    image_size: (u32, u32),
) -> ClassifierResult<Prediction> {
    let (model, class_map) = match (model, class_map) {
        (Some(model), Some(class_map)) => (model, class_map),
        (None, None) => return Err(not_loaded(MissingArtifact::Both)),
        (None, Some(_)) => return Err(not_loaded(MissingArtifact::Model)),
        (Some(_), None) => return Err(not_loaded(MissingArtifact::ClassMap)),
    };

    let img = load_image_resized(path, image_size)?;
    let batch = NormalizeImage::rescale(model.channel_order())
        .normalize_batch(std::slice::from_ref(&img))?;
    let probabilities = model.forward(&batch)?;

    let row = probabilities
        .outer_iter()
        .next()
        .map(|row| row.to_vec())
        .unwrap_or_default();
    let (class_index, confidence) = argmax(&row).ok_or_else(|| {
        ClassifierError::processing(
            ProcessingStage::PostProcessing,
            format!("model '{}' returned no scores", model.name()),
            OpaqueError(format!("output shape {:?}", probabilities.shape())),
        )
    })?;

    let label = class_map.label_or_index(class_index);
    debug!(
        "{} -> {} (index {}, confidence {:.4})",
        path.display(),
        label,
        class_index,
        confidence
    );
    Ok(Prediction {
        class_index,
        label,
        confidence,
    })
}

fn not_loaded(missing: MissingArtifact) -> ClassifierError {
    ClassifierError::NotLoaded { missing }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::batch::{Tensor2D, Tensor4D};
    use crate::processors::ChannelOrder;
    use image::{Rgb, RgbImage};
    use std::sync::Mutex;

    /// Returns a fixed probability row and remembers the last input shape.
    #[derive(Debug)]
    pub(crate) struct FixedClassifier {
        pub scores: Vec<f32>,
        pub order: ChannelOrder,
        pub seen_shape: Mutex<Option<Vec<usize>>>,
    }

    impl FixedClassifier {
        pub(crate) fn new(scores: Vec<f32>) -> Self {
            Self {
                scores,
                order: ChannelOrder::HWC,
                seen_shape: Mutex::new(None),
            }
        }
    }

    impl ImageClassifier for FixedClassifier {
        fn name(&self) -> &str {
            "fixed"
        }

        fn channel_order(&self) -> ChannelOrder {
            self.order
        }

        fn forward(&self, batch: &Tensor4D) -> ClassifierResult<Tensor2D> {
            *self.seen_shape.lock().unwrap() = Some(batch.shape().to_vec());
            let rows = batch.shape()[0];
            let data = self.scores.repeat(rows);
            Ok(Tensor2D::from_shape_vec((rows, self.scores.len()), data)?)
        }
    }

    fn write_image(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("dog.png");
        RgbImage::from_pixel(20, 10, Rgb([120, 60, 30])).save(&path).unwrap();
        path
    }

    #[test]
    fn test_label_and_confidence_come_from_argmax() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_image(dir.path());
        let model = FixedClassifier::new(vec![0.05, 0.8734, 0.0766]);
        let map = ClassMap::from_labels(["beagle", "corgi", "pug"]);

        let prediction = predict_image(&path, Some(&model), Some(&map), (16, 12)).unwrap();
        assert_eq!(prediction.label, "corgi");
        assert_eq!(prediction.class_index, 1);
        assert_eq!(prediction.confidence, 0.8734);
        assert_eq!(prediction.confidence_percent(), 87.34);
        assert_eq!(
            model.seen_shape.lock().unwrap().clone(),
            Some(vec![1, 16, 12, 3])
        );
    }

    #[test]
    fn test_channel_order_follows_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_image(dir.path());
        let mut model = FixedClassifier::new(vec![1.0]);
        model.order = ChannelOrder::CHW;
        let map = ClassMap::from_labels(["beagle"]);
        predict_image(&path, Some(&model), Some(&map), (8, 4)).unwrap();
        assert_eq!(
            model.seen_shape.lock().unwrap().clone(),
            Some(vec![1, 3, 8, 4])
        );
    }

    #[test]
    fn test_missing_label_falls_back_to_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_image(dir.path());
        let model = FixedClassifier::new(vec![0.1, 0.2, 0.7]);
        let map = ClassMap::from_labels(["beagle"]);
        let prediction = predict_image(&path, Some(&model), Some(&map), (4, 4)).unwrap();
        assert_eq!(prediction.label, "2");
        assert_eq!(prediction.confidence, 0.7);
    }

    #[test]
    fn test_not_loaded_fails_before_io() {
        let missing = Path::new("/definitely/not/here.png");
        let model = FixedClassifier::new(vec![1.0]);
        let map = ClassMap::from_labels(["beagle"]);

        let err = predict_image(missing, None, None, (4, 4)).unwrap_err();
        assert!(matches!(
            err,
            ClassifierError::NotLoaded {
                missing: MissingArtifact::Both
            }
        ));
        let err = predict_image(missing, Some(&model), None, (4, 4)).unwrap_err();
        assert!(matches!(
            err,
            ClassifierError::NotLoaded {
                missing: MissingArtifact::ClassMap
            }
        ));
        let err = predict_image(missing, None, Some(&map), (4, 4)).unwrap_err();
        assert!(matches!(
            err,
            ClassifierError::NotLoaded {
                missing: MissingArtifact::Model
            }
        ));
        assert!(model.seen_shape.lock().unwrap().is_none());
    }

    #[test]
    fn test_unreadable_image_is_reported() {
        let model = FixedClassifier::new(vec![1.0]);
        let map = ClassMap::from_labels(["beagle"]);
        let err = predict_image(
            Path::new("/definitely/not/here.png"),
            Some(&model),
            Some(&map),
            (4, 4),
        )
        .unwrap_err();
        assert!(matches!(err, ClassifierError::ImageLoad(_)));
    }

    #[test]
    fn test_empty_scores_are_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_image(dir.path());
        let model = FixedClassifier::new(Vec::new());
        let map = ClassMap::from_labels(["beagle"]);
        let err = predict_image(&path, Some(&model), Some(&map), (4, 4)).unwrap_err();
        assert!(matches!(err, ClassifierError::Processing { .. }));
    }
}
