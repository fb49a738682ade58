//! Image processors shared by training and inference.
//!
//! - [`normalization`]: pixel rescaling and channel layout
//! - [`augmentation`]: random affine transforms for training samples
//! - [`types`]: common enums such as [`ChannelOrder`]

pub mod augmentation;
pub mod normalization;
pub mod types;

pub use augmentation::{AffineParams, RandomAffine};
pub use normalization::NormalizeImage;
pub use types::ChannelOrder;
