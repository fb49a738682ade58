//! Batch utilities and tensor aliases.

/// A 2-dimensional tensor (batch x classes) of f32 values.
pub type Tensor2D = ndarray::Array2<f32>;

/// A 4-dimensional tensor (batch of images) of f32 values.
pub type Tensor4D = ndarray::Array4<f32>;

/// Copies an ndarray batch into a candle tensor of the same shape on `device`.
pub fn to_candle(
    batch: &Tensor4D,
    device: &candle_core::Device,
) -> candle_core::Result<candle_core::Tensor> {
    let data: Vec<f32> = batch.iter().copied().collect();
    candle_core::Tensor::from_vec(data, batch.dim(), device)
}

/// Splits a sequence into fixed-size batches; the last batch may be shorter.
#[derive(Debug, Clone, Copy)]
pub struct BatchSampler {
    batch_size: usize,
}

impl BatchSampler {
    /// Creates a new BatchSampler with the specified batch size.
    pub fn new(batch_size: usize) -> Self {
        Self { batch_size }
    }

    /// Returns the batch size.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of batches needed to cover `len` items.
    pub fn num_batches(&self, len: usize) -> usize {
        if self.batch_size == 0 {
            0
        } else {
            len.div_ceil(self.batch_size)
        }
    }

    /// Creates an iterator over batches of data.
    pub fn batches<'a, T>(&self, data: &'a [T]) -> impl Iterator<Item = &'a [T]> {
        let take = if self.batch_size == 0 { 0 } else { usize::MAX };
        data.chunks(self.batch_size.max(1)).take(take)
    }
}
