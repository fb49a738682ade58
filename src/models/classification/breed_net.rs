//! Frozen feature extractor plus trainable head, and its checkpoint format.
//!
//! A checkpoint is one safetensors file:
//!
//! | key                              | content                                 |
//! |----------------------------------|-----------------------------------------|
//! | `backbone.layout`                | `u32` layout, `0` marks a max-pool      |
//! | `backbone.features.{i}.weight`   | convolution weights (torchvision index) |
//! | `backbone.features.{i}.bias`     | convolution biases                      |
//! | `head.fc1.weight` / `.bias`      | hidden dense layer                      |
//! | `head.fc2.weight` / `.bias`      | output dense layer                      |

use super::head::ClassifierHead;
use super::vgg::{FeatureExtractor, VGG19_LAYOUT, layout_from_tensor};
use crate::core::batch::{Tensor2D, Tensor4D, to_candle};
use crate::core::errors::{
    ClassifierError, ClassifierResult, ProcessingStage, candle_to_inference, candle_to_processing,
};
use crate::models::ImageClassifier;
use crate::processors::ChannelOrder;
use crate::utils::ensure_parent_dir;
use candle_core::{D, DType, Device, Tensor};
use candle_nn::VarBuilder;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

const BACKBONE_LAYOUT_KEY: &str = "backbone.layout";
const FC1_WEIGHT_KEY: &str = "head.fc1.weight";
const FC2_WEIGHT_KEY: &str = "head.fc2.weight";

/// Loads pretrained convolution weights for the feature extractor.
///
/// The file uses torchvision keys (`features.{i}.weight|bias`). A `layout`
/// tensor in the file overrides the default VGG19 layout, which lets small
/// stand-in backbones share the same format.
pub fn load_backbone(path: &Path, device: &Device) -> ClassifierResult<FeatureExtractor> {
    let tensors = candle_core::safetensors::load(path, device).map_err(|e| {
        ClassifierError::model_load_error(
            path,
            "failed to read backbone weights",
            Some("expected a safetensors export of torchvision vgg19"),
            Some(e),
        )
    })?;
    let layout = match tensors.get("layout") {
        Some(t) => layout_from_tensor(t)
            .map_err(|e| candle_to_inference("VGG", "read backbone layout", e))?,
        None => VGG19_LAYOUT.to_vec(),
    };
    debug!("Backbone {} layout: {:?}", path.display(), layout);
    let vb = VarBuilder::from_tensors(tensors, DType::F32, device);
    FeatureExtractor::load(&layout, vb.pp("features"))
}

/// Image classifier made of a frozen backbone and a dense head.
#[derive(Debug, Clone)]
pub struct BreedNet {
    backbone: FeatureExtractor,
    head: ClassifierHead,
    device: Device,
}

impl BreedNet {
    pub fn new(backbone: FeatureExtractor, head: ClassifierHead, device: Device) -> Self {
        Self {
            backbone,
            head,
            device,
        }
    }

    /// Loads a checkpoint written by [`BreedNet::save`].
    pub fn load(path: &Path, device: &Device) -> ClassifierResult<Self> {
        let tensors = candle_core::safetensors::load(path, device).map_err(|e| {
            ClassifierError::model_load_error(path, "failed to read checkpoint", None, Some(e))
        })?;

        let layout_tensor = required(&tensors, BACKBONE_LAYOUT_KEY, path)?;
        let layout = layout_from_tensor(layout_tensor).map_err(|e| {
            ClassifierError::model_load_error(path, "invalid backbone layout", None, Some(e))
        })?;
        let (hidden, feature_dim) = dims2(required(&tensors, FC1_WEIGHT_KEY, path)?, path)?;
        let (num_classes, _) = dims2(required(&tensors, FC2_WEIGHT_KEY, path)?, path)?;
        debug!(
            "Checkpoint {}: layout {:?}, feature dim {}, {} classes",
            path.display(),
            layout,
            feature_dim,
            num_classes
        );

        let vb = VarBuilder::from_tensors(tensors, DType::F32, device);
        let backbone = FeatureExtractor::load(&layout, vb.pp("backbone").pp("features"))?;
        let head = ClassifierHead::load(feature_dim, hidden, num_classes, vb.pp("head"))?;
        Ok(Self::new(backbone, head, device.clone()))
    }

    /// Writes backbone and head weights to a single safetensors file.
    pub fn save(&self, path: &Path) -> ClassifierResult<()> {
        let mut tensors: HashMap<String, Tensor> = self
            .backbone
            .named_tensors("backbone", &self.device)
            .map_err(|e| candle_to_processing(ProcessingStage::Persistence, "collect backbone", e))?
            .into_iter()
            .collect();
        tensors.extend(self.head.named_tensors("head"));

        ensure_parent_dir(path)?;
        candle_core::safetensors::save(&tensors, path).map_err(|e| {
            candle_to_processing(
                ProcessingStage::Persistence,
                format!("write {}", path.display()),
                e,
            )
        })
    }

    pub fn backbone(&self) -> &FeatureExtractor {
        &self.backbone
    }

    pub fn head(&self) -> &ClassifierHead {
        &self.head
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn num_classes(&self) -> usize {
        self.head.num_classes()
    }

    /// Flattened backbone features, detached from the autograd graph.
    pub fn features(&self, xs: &Tensor) -> candle_core::Result<Tensor> {
        Ok(self.backbone.forward(xs)?.flatten_from(1)?.detach())
    }

    /// Logits for a `(N, 3, H, W)` batch.
    pub fn forward_t(&self, xs: &Tensor, train: bool) -> candle_core::Result<Tensor> {
        let features = self.features(xs)?;
        self.head.forward_t(&features, train)
    }
}

fn required<'a>(
    tensors: &'a HashMap<String, Tensor>,
    key: &str,
    path: &Path,
) -> ClassifierResult<&'a Tensor> {
    tensors.get(key).ok_or_else(|| {
        ClassifierError::model_load_error(
            path,
            format!("missing tensor '{key}'"),
            Some("the file is not a checkpoint written by `dogbreed train`"),
            None::<candle_core::Error>,
        )
    })
}

fn dims2(tensor: &Tensor, path: &Path) -> ClassifierResult<(usize, usize)> {
    tensor.dims2().map_err(|e| {
        ClassifierError::model_load_error(path, "dense weight is not 2-D", None, Some(e))
    })
}

/// [`ImageClassifier`] backed by a [`BreedNet`] executed with candle.
#[derive(Debug)]
pub struct CandleClassifier {
    net: BreedNet,
    name: String,
}

impl CandleClassifier {
    pub fn new(net: BreedNet, name: impl Into<String>) -> Self {
        Self {
            net,
            name: name.into(),
        }
    }

    /// Loads a checkpoint and names the classifier after the file stem.
    pub fn load(path: &Path, device: &Device) -> ClassifierResult<Self> {
        let net = BreedNet::load(path, device)?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("breednet")
            .to_string();
        Ok(Self::new(net, name))
    }

    pub fn net(&self) -> &BreedNet {
        &self.net
    }
}

impl ImageClassifier for CandleClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn channel_order(&self) -> ChannelOrder {
        ChannelOrder::CHW
    }

    fn forward(&self, batch: &Tensor4D) -> ClassifierResult<Tensor2D> {
        let xs = to_candle(batch, self.net.device()).map_err(|e| {
            candle_to_processing(ProcessingStage::TensorOperation, "upload input batch", e)
        })?;

        let probs = self
            .net
            .forward_t(&xs, false)
            .and_then(|logits| candle_nn::ops::softmax(&logits, D::Minus1))
            .map_err(|e| {
                candle_to_inference(
                    &self.name,
                    format!("forward pass on batch with shape {:?}", batch.shape()),
                    e,
                )
            })?;

        let rows = probs.to_vec2::<f32>().map_err(|e| {
            candle_to_processing(ProcessingStage::PostProcessing, "read probabilities", e)
        })?;
        let classes = rows.first().map_or(0, Vec::len);
        Ok(Tensor2D::from_shape_vec(
            (rows.len(), classes),
            rows.into_iter().flatten().collect(),
        )?)
    }
}
