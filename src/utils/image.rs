//! Utility functions for image loading.
//!
//! Both pipelines decode images through this module so training and
//! inference see identical pixels for the same file.

use crate::core::constants::{ALLOWED_IMAGE_EXTENSIONS, DEFAULT_PARALLEL_THRESHOLD};
use crate::core::errors::{ClassifierError, ClassifierResult};
use image::{DynamicImage, RgbImage, imageops::FilterType};
use std::path::Path;

/// Converts a DynamicImage to an RgbImage.
pub fn dynamic_to_rgb(img: DynamicImage) -> RgbImage {
    img.to_rgb8()
}

/// Loads an image from a file path and converts it to RgbImage.
///
/// # Errors
///
/// Returns `ClassifierError::ImageLoad` if the file cannot be read or decoded.
pub fn load_image(path: &Path) -> ClassifierResult<RgbImage> {
    let img = image::open(path).map_err(ClassifierError::ImageLoad)?;
    Ok(dynamic_to_rgb(img))
}

/// Loads an image and resizes it to `(height, width)` with nearest-neighbour
/// sampling.
///
/// Nearest-neighbour keeps the decoded pixels exact, which is what the model
/// was trained on.
pub fn load_image_resized(path: &Path, (height, width): (u32, u32)) -> ClassifierResult<RgbImage> {
    let img = load_image(path)?;
    Ok(resize_exact(&img, (height, width)))
}

/// Resizes an image to exactly `(height, width)`, ignoring aspect ratio.
pub fn resize_exact(img: &RgbImage, (height, width): (u32, u32)) -> RgbImage {
    if img.dimensions() == (width, height) {
        return img.clone();
    }
    image::imageops::resize(img, width, height, FilterType::Nearest)
}

/// Loads a batch of images from file paths, resized to `size`.
///
/// Uses rayon once the batch exceeds the threshold, which defaults to
/// [`DEFAULT_PARALLEL_THRESHOLD`] images. The output order matches `paths`.
pub fn load_images_batch_with_threshold<P: AsRef<Path> + Send + Sync>(
    paths: &[P],
    size: (u32, u32),
    parallel_threshold: Option<usize>,
) -> ClassifierResult<Vec<RgbImage>> {
    let threshold = parallel_threshold.unwrap_or(DEFAULT_PARALLEL_THRESHOLD);

    if paths.len() > threshold {
        use rayon::prelude::*;
        paths
            .par_iter()
            .map(|p| load_image_resized(p.as_ref(), size))
            .collect()
    } else {
        paths
            .iter()
            .map(|p| load_image_resized(p.as_ref(), size))
            .collect()
    }
}

/// Returns true when the file name carries an extension accepted for
/// classification (png, jpg, jpeg, gif).
pub fn is_allowed_image(path: &Path) -> bool {
    has_extension_in(path, ALLOWED_IMAGE_EXTENSIONS)
}

/// Case-insensitive extension check against a list of lowercase extensions.
pub fn has_extension_in(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            extensions.contains(&ext.as_str())
        })
        .unwrap_or(false)
}
