//! Classifiers exported to ONNX and executed with ONNX Runtime.

use crate::core::batch::{Tensor2D, Tensor4D};
use crate::core::config::OrtSessionConfig;
use crate::core::errors::{ClassifierError, ClassifierResult};
use crate::core::inference::OrtInfer;
use crate::models::ImageClassifier;
use crate::processors::ChannelOrder;
use std::path::Path;
use tracing::warn;

/// [`ImageClassifier`] backed by an ONNX model.
///
/// The model must take one `(N, H, W, 3)` or `(N, 3, H, W)` float input and
/// produce `(N, classes)` probabilities.
#[derive(Debug)]
pub struct OnnxClassifier {
    inference: OrtInfer,
    channel_order: ChannelOrder,
}

impl OnnxClassifier {
    /// Opens an ONNX model. `channel_order` is the layout its input expects.
    pub fn load(
        path: &Path,
        channel_order: ChannelOrder,
        ort_session: Option<&OrtSessionConfig>,
    ) -> ClassifierResult<Self> {
        let inference = OrtInfer::from_config(ort_session, path, None)?;
        let detected = inference
            .primary_input_shape()
            .and_then(|shape| detect_channel_order(&shape));
        if let Some(detected) = detected.filter(|&d| d != channel_order) {
            warn!(
                "{} declares a {} input but {} was configured",
                path.display(),
                detected,
                channel_order
            );
        }
        Ok(Self {
            inference,
            channel_order,
        })
    }

    pub fn inference(&self) -> &OrtInfer {
        &self.inference
    }
}

impl ImageClassifier for OnnxClassifier {
    fn name(&self) -> &str {
        self.inference.model_name()
    }

    fn channel_order(&self) -> ChannelOrder {
        self.channel_order
    }

    fn forward(&self, batch: &Tensor4D) -> ClassifierResult<Tensor2D> {
        self.inference
            .infer_2d(batch)
            .map_err(|e| ClassifierError::Inference {
                model_name: self.inference.model_name().to_string(),
                context: format!(
                    "failed to run inference on batch with shape {:?}",
                    batch.shape()
                ),
                source: Box::new(e),
            })
    }
}

/// Guesses the channel layout from a declared 4-D input shape.
///
/// Returns `None` when the shape is not 4-D or both candidate axes are 3.
pub fn detect_channel_order(shape: &[i64]) -> Option<ChannelOrder> {
    match shape {
        [_, 3, _, c] if *c != 3 => Some(ChannelOrder::CHW),
        [_, c, _, 3] if *c != 3 => Some(ChannelOrder::HWC),
        _ => None,
    }
}
