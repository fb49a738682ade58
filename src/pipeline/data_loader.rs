//! Turns dataset samples into normalized, optionally augmented batches.

use crate::core::batch::{BatchSampler, Tensor4D};
use crate::core::constants::DEFAULT_PARALLEL_THRESHOLD;
use crate::core::errors::ClassifierResult;
use crate::domain::Sample;
use crate::processors::{AffineParams, ChannelOrder, NormalizeImage, RandomAffine};
use crate::utils::load_images_batch_with_threshold;
use image::RgbImage;
use rand::Rng;
use rand::seq::SliceRandom;
use std::path::Path;

/// One training or validation step worth of data.
#[derive(Debug, Clone)]
pub struct Batch {
    /// `(N, 3, H, W)` pixels in `[0, 1]`.
    pub inputs: Tensor4D,
    /// Class index per image.
    pub labels: Vec<u32>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Loads batches of samples resized to a fixed input size.
#[derive(Debug, Clone)]
pub struct BatchLoader {
    image_size: (u32, u32),
    sampler: BatchSampler,
    normalizer: NormalizeImage,
    augmentation: Option<RandomAffine>,
    parallel_threshold: usize,
}

impl BatchLoader {
    pub fn new(batch_size: usize, image_size: (u32, u32)) -> Self {
        Self {
            image_size,
            sampler: BatchSampler::new(batch_size),
            normalizer: NormalizeImage::rescale(ChannelOrder::CHW),
            augmentation: None,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }

    /// Applies random augmentation to every loaded image.
    pub fn with_augmentation(mut self, augmentation: RandomAffine) -> Self {
        self.augmentation = Some(augmentation);
        self
    }

    /// Batches at or below this size are decoded on the calling thread.
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    pub fn num_batches(&self, len: usize) -> usize {
        self.sampler.num_batches(len)
    }

    /// Groups `samples` into batches for one epoch, shuffled when asked.
    pub fn epoch<'a, R: Rng>(
        &self,
        samples: &'a [Sample],
        rng: &mut R,
        shuffle: bool,
    ) -> Vec<Vec<&'a Sample>> {
        let mut order: Vec<&Sample> = samples.iter().collect();
        if shuffle {
            order.shuffle(rng);
        }
        self.sampler
            .batches(&order)
            .map(|chunk| chunk.to_vec())
            .collect()
    }

    /// Decodes, augments and normalizes one batch.
    ///
    /// Augmentation parameters are drawn from `rng` in sample order before
    /// any decoding starts, so a seeded run is reproducible even though
    /// images are decoded in parallel.
    pub fn load<R: Rng>(&self, samples: &[&Sample], rng: &mut R) -> ClassifierResult<Batch> {
        let params: Vec<AffineParams> = samples
            .iter()
            .map(|_| match &self.augmentation {
                Some(aug) => aug.sample(rng, self.image_size),
                None => AffineParams::IDENTITY,
            })
            .collect();

        let paths: Vec<&Path> = samples.iter().map(|s| s.path.as_path()).collect();
        let images = load_images_batch_with_threshold(
            &paths,
            self.image_size,
            Some(self.parallel_threshold),
        )?;
        let images: Vec<RgbImage> = images
            .iter()
            .zip(&params)
            .map(|(img, params)| params.apply(img))
            .collect();

        Ok(Batch {
            inputs: self.normalizer.normalize_batch(&images)?,
            labels: samples.iter().map(|s| s.class_index as u32).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::AugmentationConfig;
    use crate::core::errors::ClassifierError;
    use image::Rgb;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::path::Path;

    fn write_samples(dir: &Path, count: usize) -> Vec<Sample> {
        (0..count)
            .map(|i| {
                let path = dir.join(format!("{i}.png"));
                RgbImage::from_fn(10, 6, |x, y| Rgb([(x * 20) as u8, (y * 40) as u8, i as u8]))
                    .save(&path)
                    .unwrap();
                Sample {
                    path,
                    class_index: i % 3,
                }
            })
            .collect()
    }

    #[test]
    fn test_epoch_covers_every_sample_once() {
        let samples: Vec<Sample> = (0..7)
            .map(|i| Sample {
                path: format!("{i}.png").into(),
                class_index: 0,
            })
            .collect();
        let loader = BatchLoader::new(3, (4, 4));
        let batches = loader.epoch(&samples, &mut StdRng::seed_from_u64(3), true);
        assert_eq!(batches.len(), loader.num_batches(samples.len()));
        assert_eq!(batches.iter().map(Vec::len).collect::<Vec<_>>(), vec![3, 3, 1]);

        let mut seen: Vec<String> = batches
            .iter()
            .flatten()
            .map(|s| s.path.display().to_string())
            .collect();
        seen.sort();
        let mut expected: Vec<String> = samples.iter().map(|s| s.path.display().to_string()).collect();
        expected.sort();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_unshuffled_epoch_keeps_order() {
        let samples: Vec<Sample> = (0..4)
            .map(|i| Sample {
                path: format!("{i}.png").into(),
                class_index: i,
            })
            .collect();
        let loader = BatchLoader::new(4, (4, 4));
        let batches = loader.epoch(&samples, &mut StdRng::seed_from_u64(0), false);
        let labels: Vec<usize> = batches[0].iter().map(|s| s.class_index).collect();
        assert_eq!(labels, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_load_produces_chw_unit_batch() {
        let dir = tempfile::tempdir().unwrap();
        let samples = write_samples(dir.path(), 3);
        let refs: Vec<&Sample> = samples.iter().collect();
        let loader = BatchLoader::new(3, (4, 8));
        let batch = loader.load(&refs, &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(batch.inputs.shape(), &[3, 3, 4, 8]);
        assert_eq!(batch.labels, vec![0, 1, 2]);
        assert!(batch.inputs.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_seeded_augmentation_is_reproducible_in_parallel() {
        let dir = tempfile::tempdir().unwrap();
        let samples = write_samples(dir.path(), 6);
        let refs: Vec<&Sample> = samples.iter().collect();
        let loader = BatchLoader::new(6, (6, 10))
            .with_augmentation(RandomAffine::new(AugmentationConfig::default()))
            .with_parallel_threshold(1);
        let a = loader.load(&refs, &mut StdRng::seed_from_u64(11)).unwrap();
        let b = loader.load(&refs, &mut StdRng::seed_from_u64(11)).unwrap();
        assert_eq!(a.inputs, b.inputs);
    }

    #[test]
    fn test_decode_error_aborts_batch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not a png").unwrap();
        let sample = Sample {
            path,
            class_index: 0,
        };
        let loader = BatchLoader::new(1, (4, 4));
        let err = loader.load(&[&sample], &mut StdRng::seed_from_u64(0)).unwrap_err();
        assert!(matches!(err, ClassifierError::ImageLoad(_)));
    }
}
