//! Pixel normalization.
//!
//! Converts RGB images into flat `f32` buffers or batched tensors, applying
//! `value * alpha + beta` per channel. The classifier uses a plain rescale
//! (`alpha = 1/255`, `beta = 0`) so every value lands in `[0, 1]`.

use crate::core::batch::Tensor4D;
use crate::core::constants::PIXEL_RESCALE;
use crate::core::errors::{ClassifierError, ClassifierResult};
use crate::processors::types::ChannelOrder;
use image::RgbImage;

/// Normalizes images into tensors.
#[derive(Debug, Clone)]
pub struct NormalizeImage {
    /// Scaling factor per channel.
    pub alpha: [f32; 3],
    /// Offset per channel.
    pub beta: [f32; 3],
    /// Channel ordering (CHW or HWC)
    pub order: ChannelOrder,
}

impl NormalizeImage {
    /// Rescales pixels by 1/255 without mean or std adjustment.
    pub fn rescale(order: ChannelOrder) -> Self {
        Self {
            alpha: [PIXEL_RESCALE; 3],
            beta: [0.0; 3],
            order,
        }
    }

    /// Normalizes a single image into a pre-allocated buffer of `3 * h * w` values.
    fn normalize_into(&self, img: &RgbImage, out: &mut [f32]) {
        let (width, height) = img.dimensions();
        let (w, h) = (width as usize, height as usize);
        let plane = w * h;
        for (x, y, pixel) in img.enumerate_pixels() {
            let (x, y) = (x as usize, y as usize);
            for c in 0..3 {
                let value = pixel[c] as f32 * self.alpha[c] + self.beta[c];
                let idx = match self.order {
                    ChannelOrder::CHW => c * plane + y * w + x,
                    ChannelOrder::HWC => (y * w + x) * 3 + c,
                };
                out[idx] = value;
            }
        }
    }

    /// Normalizes equally sized images into a `(batch, ...)` tensor.
    ///
    /// The tensor is `(N, 3, H, W)` for CHW and `(N, H, W, 3)` for HWC.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an empty batch or mismatched image sizes.
    pub fn normalize_batch(&self, imgs: &[RgbImage]) -> ClassifierResult<Tensor4D> {
        let first = imgs
            .first()
            .ok_or_else(|| ClassifierError::invalid_input("cannot normalize an empty batch"))?;
        let (width, height) = first.dimensions();
        if let Some(other) = imgs.iter().find(|img| img.dimensions() != (width, height)) {
            return Err(ClassifierError::invalid_input(format!(
                "batch images must share one size: {}x{} vs {}x{}",
                width,
                height,
                other.width(),
                other.height()
            )));
        }

        let (h, w) = (height as usize, width as usize);
        let per_image = 3 * h * w;
        let mut data = vec![0.0f32; imgs.len() * per_image];
        for (img, chunk) in imgs.iter().zip(data.chunks_mut(per_image)) {
            self.normalize_into(img, chunk);
        }

        let shape = match self.order {
            ChannelOrder::CHW => (imgs.len(), 3, h, w),
            ChannelOrder::HWC => (imgs.len(), h, w, 3),
        };
        Ok(Tensor4D::from_shape_vec(shape, data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn two_pixel_image() -> RgbImage {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([255, 0, 51]));
        img.put_pixel(1, 0, Rgb([0, 255, 102]));
        img
    }

    #[test]
    fn test_rescale_maps_to_unit_interval() {
        let norm = NormalizeImage::rescale(ChannelOrder::HWC);
        let batch = norm.normalize_batch(&[two_pixel_image()]).unwrap();
        let out = batch.as_slice().unwrap();
        assert_eq!(out.len(), 6);
        assert!(out.iter().all(|v| (0.0..=1.0).contains(v)));
        assert!((out[0] - 1.0).abs() < 1e-6);
        assert!((out[2] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_chw_layout_groups_channels() {
        let norm = NormalizeImage::rescale(ChannelOrder::CHW);
        let batch = norm.normalize_batch(&[two_pixel_image()]).unwrap();
        let out = batch.as_slice().unwrap();
        // red plane, green plane, blue plane
        assert!((out[0] - 1.0).abs() < 1e-6);
        assert!(out[1].abs() < 1e-6);
        assert!(out[2].abs() < 1e-6);
        assert!((out[3] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_batch_shape_follows_order() {
        let imgs = vec![two_pixel_image(), two_pixel_image()];
        let chw = NormalizeImage::rescale(ChannelOrder::CHW)
            .normalize_batch(&imgs)
            .unwrap();
        assert_eq!(chw.shape(), &[2, 3, 1, 2]);
        let hwc = NormalizeImage::rescale(ChannelOrder::HWC)
            .normalize_batch(&imgs)
            .unwrap();
        assert_eq!(hwc.shape(), &[2, 1, 2, 3]);
        assert!((hwc[[1, 0, 1, 1]] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_batch_rejects_mixed_sizes() {
        let imgs = vec![two_pixel_image(), RgbImage::new(3, 3)];
        let result = NormalizeImage::rescale(ChannelOrder::CHW).normalize_batch(&imgs);
        assert!(matches!(result, Err(ClassifierError::InvalidInput { .. })));
    }
}
