//! Model implementations.
//!
//! Every backend implements [`ImageClassifier`]: it takes a normalized batch
//! laid out in its [`ChannelOrder`] and returns one probability row per
//! image. The inference pipeline only talks to this trait, so tests can swap
//! in a fake model.

pub mod classification;
pub mod onnx;

use crate::core::batch::{Tensor2D, Tensor4D};
use crate::core::errors::ClassifierResult;
use crate::processors::ChannelOrder;

pub use classification::{BreedNet, CandleClassifier, ClassifierHead, FeatureExtractor};
pub use onnx::OnnxClassifier;

/// A loaded model that maps image batches to class probabilities.
pub trait ImageClassifier: Send + Sync + std::fmt::Debug {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    /// Layout expected by [`ImageClassifier::forward`].
    fn channel_order(&self) -> ChannelOrder;

    /// Runs a forward pass on `(N, 3, H, W)` or `(N, H, W, 3)` values in
    /// `[0, 1]`, returning `(N, classes)` probabilities.
    fn forward(&self, batch: &Tensor4D) -> ClassifierResult<Tensor2D>;
}
