//! Utility functions shared by the training and inference pipelines.

pub mod fs;
pub mod image;
pub mod topk;

pub use self::image::{
    dynamic_to_rgb, has_extension_in, is_allowed_image, load_image, load_image_resized,
    load_images_batch_with_threshold, resize_exact,
};
pub use fs::ensure_parent_dir;
pub use topk::argmax;
