//! Candle classification network: VGG feature extractor and dense head.

pub mod breed_net;
pub mod head;
pub mod vgg;

pub use breed_net::{BreedNet, CandleClassifier, load_backbone};
pub use head::ClassifierHead;
pub use vgg::{FeatureExtractor, VGG19_LAYOUT};
