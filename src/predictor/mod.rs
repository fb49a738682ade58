//! The inference side: artifact loading, single-image classification and
//! the application context that ties them together.

pub mod classifier;
pub mod context;
pub mod loader;

pub use classifier::predict_image;
pub use context::ClassifierContext;
pub use loader::{ModelState, load_trained_model};
