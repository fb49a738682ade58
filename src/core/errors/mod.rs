//! Error types for training and inference.
//!
//! # Usage
//!
//! ```rust
//! use dogbreed::core::errors::{ClassifierError, ProcessingStage};
//!
//! let error = ClassifierError::processing(
//!     ProcessingStage::Persistence,
//!     "write dogbreed.safetensors",
//!     std::io::Error::other("disk full"),
//! );
//! assert!(error.to_string().starts_with("persistence failed"));
//! ```

pub mod constructors;
pub mod types;

pub use constructors::{candle_to_inference, candle_to_processing};
pub use types::{ClassifierError, MissingArtifact, OpaqueError, ProcessingStage};

/// Convenient result alias for classifier operations.
pub type ClassifierResult<T> = Result<T, ClassifierError>;
