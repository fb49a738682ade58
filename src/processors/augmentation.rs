//! Random geometric augmentation for training samples.
//!
//! Each sample gets an affine warp built from a rotation, a translation and
//! a per-axis zoom around the image centre, optionally followed by a
//! horizontal flip. Source coordinates that fall outside the image are
//! clamped to the nearest edge pixel.

use crate::core::config::AugmentationConfig;
use image::{Rgb, RgbImage};
use imageproc::geometric_transformations::{Interpolation, warp_with};
use rand::Rng;

/// Concrete transform parameters for one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineParams {
    /// Rotation in degrees.
    pub rotation_deg: f32,
    /// Horizontal shift in pixels.
    pub shift_x: f32,
    /// Vertical shift in pixels.
    pub shift_y: f32,
    /// Horizontal zoom factor; values above 1 zoom out.
    pub zoom_x: f32,
    /// Vertical zoom factor; values above 1 zoom out.
    pub zoom_y: f32,
    /// Mirror left-right after the warp.
    pub flip_horizontal: bool,
}

impl AffineParams {
    /// Parameters that leave the image unchanged.
    pub const IDENTITY: AffineParams = AffineParams {
        rotation_deg: 0.0,
        shift_x: 0.0,
        shift_y: 0.0,
        zoom_x: 1.0,
        zoom_y: 1.0,
        flip_horizontal: false,
    };

    fn is_identity_warp(&self) -> bool {
        self.rotation_deg == 0.0
            && self.shift_x == 0.0
            && self.shift_y == 0.0
            && self.zoom_x == 1.0
            && self.zoom_y == 1.0
    }

    /// Applies the transform to an image, keeping its dimensions.
    pub fn apply(&self, img: &RgbImage) -> RgbImage {
        let warped = if self.is_identity_warp() {
            img.clone()
        } else {
            self.warp(img)
        };
        if self.flip_horizontal {
            image::imageops::flip_horizontal(&warped)
        } else {
            warped
        }
    }

    fn warp(&self, img: &RgbImage) -> RgbImage {
        let (width, height) = img.dimensions();
        let max_x = width.saturating_sub(1) as f32;
        let max_y = height.saturating_sub(1) as f32;
        let (cx, cy) = (max_x / 2.0, max_y / 2.0);
        let (sin, cos) = self.rotation_deg.to_radians().sin_cos();
        let params = *self;

        // Maps each output pixel back to the input pixel it samples.
        let mapping = move |x: f32, y: f32| {
            let u = (x - cx) * params.zoom_x + params.shift_x;
            let v = (y - cy) * params.zoom_y + params.shift_y;
            let src_x = cos * u - sin * v + cx;
            let src_y = sin * u + cos * v + cy;
            (src_x.clamp(0.0, max_x), src_y.clamp(0.0, max_y))
        };

        warp_with(img, mapping, Interpolation::Nearest, Rgb([0, 0, 0]))
    }
}

/// Draws [`AffineParams`] from the ranges in an [`AugmentationConfig`].
#[derive(Debug, Clone)]
pub struct RandomAffine {
    config: AugmentationConfig,
}

impl RandomAffine {
    pub fn new(config: AugmentationConfig) -> Self {
        Self { config }
    }

    /// Samples parameters for an image of the given size.
    pub fn sample<R: Rng>(&self, rng: &mut R, (height, width): (u32, u32)) -> AffineParams {
        let cfg = &self.config;
        let rotation_deg = symmetric(rng, cfg.rotation_range);
        let shift_y = symmetric(rng, cfg.height_shift_range) * height as f32;
        let shift_x = symmetric(rng, cfg.width_shift_range) * width as f32;
        let (zoom_x, zoom_y) = if cfg.zoom_range > 0.0 {
            let zoom = (1.0 - cfg.zoom_range)..=(1.0 + cfg.zoom_range);
            (rng.gen_range(zoom.clone()), rng.gen_range(zoom))
        } else {
            (1.0, 1.0)
        };
        let flip_horizontal = cfg.horizontal_flip && rng.gen_bool(0.5);

        AffineParams {
            rotation_deg,
            shift_x,
            shift_y,
            zoom_x,
            zoom_y,
            flip_horizontal,
        }
    }
}

fn symmetric<R: Rng>(rng: &mut R, range: f32) -> f32 {
    if range > 0.0 {
        rng.gen_range(-range..=range)
    } else {
        0.0
    }
}
