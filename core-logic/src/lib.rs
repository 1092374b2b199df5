//! # Core Logic - Shared Utilities for Batch Distribution
//!
//! Chain-agnostic building blocks used by the chain crates under `chains/`.
//!
//! ## Modules
//!
//! - [`config`] - Batch size / pacing bounds and their defaults
//! - [`error`] - Typed error handling with thiserror
//! - [`metrics`] - Per-run metrics collection
//! - [`traits`] - Injected randomness and pause primitives
//! - [`utils`] - Logger, pacing implementations, signer key loading

pub mod config;
pub mod error;
pub mod metrics;
pub mod traits;
pub(crate) mod utils;

pub use config::{interval_duration, BatchConfig, BatchLimits, FundingAccount};
pub use error::{
    ConfigError, CoreError, NetworkError, PreflightError, SubmissionError, WalletError,
};
pub use metrics::{MetricsSnapshot, RunMetrics};
pub use traits::{Pause, RangeSampler};

pub use utils::{
    normalize_private_key, setup_logger, KeyLoader, RandomSampler, SignerKey, TokioPause,
    BATCH_RESULT_TARGET,
};
#[cfg(any(test, feature = "testing"))]
pub use utils::{RecordingPause, ScriptedSampler};
