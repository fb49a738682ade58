//! VGG-style convolutional feature extractor.
//!
//! The network is described by a layout where each entry is either the
//! output channel count of a 3x3 convolution (padding 1, followed by ReLU)
//! or `0` for a 2x2 max-pool. Weights follow the torchvision key scheme
//! `features.{i}.weight|bias`, where a convolution occupies two indices
//! (conv + relu) and a pool one.

use crate::core::errors::{ClassifierError, ClassifierResult, candle_to_inference};
use candle_core::{DType, Device, Tensor};
use candle_nn::{Conv2d, Conv2dConfig, Module, VarBuilder};

/// Layout of the VGG19 convolutional stack.
pub const VGG19_LAYOUT: &[usize] = &[
    64, 64, 0, 128, 128, 0, 256, 256, 256, 256, 0, 512, 512, 512, 512, 0, 512, 512, 512, 512, 0,
];

const MODEL_NAME: &str = "VGG";

#[derive(Debug, Clone)]
enum FeatureLayer {
    Conv { key: usize, conv: Conv2d },
    MaxPool,
}

/// Frozen convolutional stack producing spatial feature maps.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    layers: Vec<FeatureLayer>,
    layout: Vec<usize>,
}

impl FeatureExtractor {
    /// Builds the stack described by `layout` from weights under `vb`.
    ///
    /// `vb` must point at the `features` prefix; tensors are looked up as
    /// `{i}.weight` and `{i}.bias`.
    pub fn load(layout: &[usize], vb: VarBuilder) -> ClassifierResult<Self> {
        if !layout.iter().any(|&c| c > 0) {
            return Err(ClassifierError::config_error(
                "feature extractor layout needs at least one convolution",
            ));
        }

        let conv_cfg = Conv2dConfig {
            padding: 1,
            ..Default::default()
        };
        let mut layers = Vec::with_capacity(layout.len());
        let mut in_channels = 3;
        let mut key = 0;
        for &channels in layout {
            if channels == 0 {
                layers.push(FeatureLayer::MaxPool);
                key += 1;
                continue;
            }
            let conv = candle_nn::conv2d(in_channels, channels, 3, conv_cfg, vb.pp(key))
                .map_err(|e| candle_to_inference(MODEL_NAME, format!("load features.{key}"), e))?;
            layers.push(FeatureLayer::Conv { key, conv });
            in_channels = channels;
            key += 2;
        }

        Ok(Self {
            layers,
            layout: layout.to_vec(),
        })
    }

    pub fn layout(&self) -> &[usize] {
        &self.layout
    }

    /// Channels of the final feature map.
    pub fn out_channels(&self) -> usize {
        self.layout.iter().rev().copied().find(|&c| c > 0).unwrap_or(3)
    }

    /// Spatial reduction applied by the pools, `2^pools`.
    pub fn downsample_factor(&self) -> usize {
        let pools = self.layout.iter().filter(|&&c| c == 0).count() as u32;
        2usize.pow(pools)
    }

    /// Length of the flattened feature vector for an input of `(height, width)`.
    pub fn feature_dim(&self, (height, width): (u32, u32)) -> usize {
        let factor = self.downsample_factor();
        self.out_channels() * (height as usize / factor) * (width as usize / factor)
    }

    /// Runs the stack on a `(N, 3, H, W)` batch.
    pub fn forward(&self, xs: &Tensor) -> candle_core::Result<Tensor> {
        let mut xs = xs.clone();
        for layer in &self.layers {
            xs = match layer {
                FeatureLayer::Conv { conv, .. } => conv.forward(&xs)?.relu()?,
                FeatureLayer::MaxPool => xs.max_pool2d(2)?,
            };
        }
        Ok(xs)
    }

    /// Weights keyed as `{prefix}.features.{i}.weight|bias` plus the layout
    /// under `{prefix}.layout`, ready for a safetensors file.
    pub fn named_tensors(
        &self,
        prefix: &str,
        device: &Device,
    ) -> candle_core::Result<Vec<(String, Tensor)>> {
        let layout: Vec<u32> = self.layout.iter().map(|&c| c as u32).collect();
        let mut tensors = vec![(format!("{prefix}.layout"), Tensor::new(layout.as_slice(), device)?)];
        for layer in &self.layers {
            if let FeatureLayer::Conv { key, conv } = layer {
                tensors.push((format!("{prefix}.features.{key}.weight"), conv.weight().clone()));
                if let Some(bias) = conv.bias() {
                    tensors.push((format!("{prefix}.features.{key}.bias"), bias.clone()));
                }
            }
        }
        Ok(tensors)
    }
}

/// Reads a layout stored as a `u32` tensor.
pub fn layout_from_tensor(tensor: &Tensor) -> candle_core::Result<Vec<usize>> {
    let values = tensor.to_dtype(DType::U32)?.to_vec1::<u32>()?;
    Ok(values.into_iter().map(|c| c as usize).collect())
}
