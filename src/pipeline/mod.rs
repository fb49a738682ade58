//! The training pipeline.
//!
//! [`Trainer`] ties together the dataset scan, batch loading with
//! augmentation, the frozen feature extractor with its trainable head, and
//! the end-of-epoch policies in [`callbacks`].

pub mod callbacks;
pub mod data_loader;
pub mod training;

pub use callbacks::{BestCheckpoint, ReduceLrOnPlateau};
pub use data_loader::{Batch, BatchLoader};
pub use training::{EpochMetrics, Trainer, TrainingReport, build_and_train};
