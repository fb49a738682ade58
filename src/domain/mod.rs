//! Domain types shared by the training and inference pipelines.

pub mod class_map;
pub mod dataset;
pub mod prediction;

pub use class_map::ClassMap;
pub use dataset::{DatasetSplit, ImageDataset, Sample};
pub use prediction::{Prediction, confidence_percent};
