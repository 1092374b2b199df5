use async_trait::async_trait;
use std::time::Duration;

/// Source of uniformly distributed integers, injected into the scheduler so
/// batch sizes and pacing intervals can be replayed deterministically.
pub trait RangeSampler: Send {
    /// Returns a value in `min..=max`. Callers guarantee `min <= max`.
    fn sample_inclusive(&mut self, min: u64, max: u64) -> u64;
}

/// Suspends the control flow between two batch submissions.
#[async_trait]
pub trait Pause: Send + Sync {
    async fn pause(&self, duration: Duration);
}

impl<T: RangeSampler + ?Sized> RangeSampler for &mut T {
    fn sample_inclusive(&mut self, min: u64, max: u64) -> u64 {
        (**self).sample_inclusive(min, max)
    }
}
