//! Trainable classification head: dense, ReLU, dropout, dense.

use crate::core::constants::HEAD_DROPOUT;
use crate::core::errors::{ClassifierResult, candle_to_inference};
use candle_core::Tensor;
use candle_nn::{Dropout, Linear, Module, ModuleT, VarBuilder};

const MODEL_NAME: &str = "ClassifierHead";

/// Two dense layers on top of flattened features. Outputs raw logits.
#[derive(Debug, Clone)]
pub struct ClassifierHead {
    fc1: Linear,
    dropout: Dropout,
    fc2: Linear,
    num_classes: usize,
}

impl ClassifierHead {
    /// Creates or loads the head under `vb` (`fc1.*`, `fc2.*`).
    ///
    /// With a `VarBuilder` backed by a `VarMap` the weights are freshly
    /// initialized and trainable; with one backed by plain tensors they are
    /// read as-is.
    pub fn load(
        in_dim: usize,
        hidden: usize,
        num_classes: usize,
        vb: VarBuilder,
    ) -> ClassifierResult<Self> {
        let fc1 = candle_nn::linear(in_dim, hidden, vb.pp("fc1"))
            .map_err(|e| candle_to_inference(MODEL_NAME, "load fc1", e))?;
        let fc2 = candle_nn::linear(hidden, num_classes, vb.pp("fc2"))
            .map_err(|e| candle_to_inference(MODEL_NAME, "load fc2", e))?;
        Ok(Self {
            fc1,
            dropout: Dropout::new(HEAD_DROPOUT),
            fc2,
            num_classes,
        })
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Logits for `(N, in_dim)` features. Dropout is active only when `train`.
    pub fn forward_t(&self, features: &Tensor, train: bool) -> candle_core::Result<Tensor> {
        let hidden = self.fc1.forward(features)?.relu()?;
        let hidden = self.dropout.forward_t(&hidden, train)?;
        self.fc2.forward(&hidden)
    }

    pub(crate) fn named_tensors(&self, prefix: &str) -> Vec<(String, Tensor)> {
        let mut tensors = Vec::with_capacity(4);
        for (name, layer) in [("fc1", &self.fc1), ("fc2", &self.fc2)] {
            tensors.push((format!("{prefix}.{name}.weight"), layer.weight().clone()));
            if let Some(bias) = layer.bias() {
                tensors.push((format!("{prefix}.{name}.bias"), bias.clone()));
            }
        }
        tensors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{DType, Device};
    use candle_nn::VarMap;

    #[test]
    fn test_fresh_head_is_trainable() {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let head = ClassifierHead::load(12, 8, 3, vb).unwrap();
        assert_eq!(head.num_classes(), 3);
        // two weights and two biases
        assert_eq!(varmap.all_vars().len(), 4);

        let features = Tensor::ones((5, 12), DType::F32, &device).unwrap();
        let logits = head.forward_t(&features, false).unwrap();
        assert_eq!(logits.dims(), &[5, 3]);
    }

    #[test]
    fn test_eval_forward_is_deterministic() {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let head = ClassifierHead::load(6, 4, 2, vb).unwrap();
        let features = Tensor::ones((1, 6), DType::F32, &device).unwrap();
        let a = head.forward_t(&features, false).unwrap().to_vec2::<f32>().unwrap();
        let b = head.forward_t(&features, false).unwrap().to_vec2::<f32>().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_named_tensors_use_prefix() {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let head = ClassifierHead::load(6, 4, 2, vb).unwrap();
        let names: Vec<String> = head.named_tensors("head").into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["head.fc1.weight", "head.fc1.bias", "head.fc2.weight", "head.fc2.bias"]);
    }
}
