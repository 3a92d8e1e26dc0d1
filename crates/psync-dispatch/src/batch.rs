use std::num::NonZeroUsize;

pub const DEFAULT_BATCH_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BatchError {
    #[error("batch size must be greater than zero")]
    ZeroSize,
}

/// Chunk size, guaranteed > 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSize(NonZeroUsize);

impl BatchSize {
    pub fn new(size: usize) -> Result<Self, BatchError> {
        NonZeroUsize::new(size).map(Self).ok_or(BatchError::ZeroSize)
    }

    pub fn get(&self) -> usize {
        self.0.get()
    }
}

impl Default for BatchSize {
    fn default() -> Self {
        Self(NonZeroUsize::new(DEFAULT_BATCH_SIZE).unwrap_or(NonZeroUsize::MIN))
    }
}

/// `ceil(len / size)` chunks in original order; the last may be short and
/// an empty input yields no chunks.
pub fn batch<T>(records: &[T], size: BatchSize) -> Vec<&[T]> {
    records.chunks(size.get()).collect()
}
