//! # Utilities Module
//!
//! Internal utility modules for the core-logic crate.
//! These modules are marked as `pub(crate)` to enforce API boundaries.

pub(crate) mod key_loader;
pub(crate) mod logger;
pub(crate) mod pacing;

pub use key_loader::{normalize_private_key, KeyLoader, SignerKey};
pub use logger::{setup_logger, BATCH_RESULT_TARGET};
pub use pacing::{RandomSampler, TokioPause};
#[cfg(any(test, feature = "testing"))]
pub use pacing::{RecordingPause, ScriptedSampler};
