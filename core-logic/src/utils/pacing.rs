//! # Pacing Primitives
//!
//! Production implementations of [`RangeSampler`] and [`Pause`], plus the
//! scripted doubles used by tests across the workspace (`testing` feature).

use crate::traits::{Pause, RangeSampler};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
#[cfg(any(test, feature = "testing"))]
use std::collections::VecDeque;
#[cfg(any(test, feature = "testing"))]
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

/// Uniform sampler backed by a seedable RNG.
pub struct RandomSampler {
    rng: StdRng,
}

impl RandomSampler {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Same seed, same sequence of draws.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RangeSampler for RandomSampler {
    fn sample_inclusive(&mut self, min: u64, max: u64) -> u64 {
        if min >= max {
            return min;
        }
        self.rng.gen_range(min..=max)
    }
}

/// Sleeps on the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioPause;

#[async_trait]
impl Pause for TokioPause {
    async fn pause(&self, duration: Duration) {
        debug!("Pausing for {:?}", duration);
        tokio::time::sleep(duration).await;
    }
}

#[cfg(any(test, feature = "testing"))]
/// Replays a fixed script of values, clamped into the requested range.
/// Falls back to `min` once the script is exhausted.
#[derive(Debug, Default)]
pub struct ScriptedSampler {
    script: VecDeque<u64>,
    draws: Vec<(u64, u64)>,
}

#[cfg(any(test, feature = "testing"))]
impl ScriptedSampler {
    pub fn new(values: impl IntoIterator<Item = u64>) -> Self {
        Self {
            script: values.into_iter().collect(),
            draws: Vec::new(),
        }
    }

    /// Every `(min, max)` range that was requested, in order.
    pub fn draws(&self) -> &[(u64, u64)] {
        &self.draws
    }
}

#[cfg(any(test, feature = "testing"))]
impl RangeSampler for ScriptedSampler {
    fn sample_inclusive(&mut self, min: u64, max: u64) -> u64 {
        self.draws.push((min, max));
        self.script
            .pop_front()
            .map(|v| v.clamp(min, max))
            .unwrap_or(min)
    }
}

#[cfg(any(test, feature = "testing"))]
/// Records requested pauses without sleeping.
#[derive(Debug, Default)]
pub struct RecordingPause {
    pauses: Mutex<Vec<Duration>>,
}

#[cfg(any(test, feature = "testing"))]
impl RecordingPause {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorded(&self) -> Vec<Duration> {
        self.pauses
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

#[cfg(any(test, feature = "testing"))]
#[async_trait]
impl Pause for RecordingPause {
    async fn pause(&self, duration: Duration) {
        if let Ok(mut pauses) = self.pauses.lock() {
            pauses.push(duration);
        }
    }
}
