use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Defaults and caps applied when building a [`BatchConfig`].
///
/// Passed explicitly so different runs (and tests) can use different caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchLimits {
    pub hard_cap_batch_size: usize,
    pub default_batch_size: usize,
    pub default_interval_minutes: u64,
}

impl BatchLimits {
    pub const HARD_CAP_BATCH_SIZE: usize = 500;
    pub const DEFAULT_INTERVAL_MINUTES: u64 = 10;
}

impl Default for BatchLimits {
    fn default() -> Self {
        Self {
            hard_cap_batch_size: Self::HARD_CAP_BATCH_SIZE,
            default_batch_size: Self::HARD_CAP_BATCH_SIZE,
            default_interval_minutes: Self::DEFAULT_INTERVAL_MINUTES,
        }
    }
}

/// Batch size and pacing bounds for one distribution run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchConfig {
    pub min_batch_size: usize,
    pub max_batch_size: usize,
    pub min_interval_minutes: u64,
    pub max_interval_minutes: u64,
    pub hard_cap_batch_size: usize,
}

impl BatchConfig {
    /// Builds a config, substituting `limits` defaults for any missing value.
    pub fn from_options(
        limits: &BatchLimits,
        min_batch_size: Option<usize>,
        max_batch_size: Option<usize>,
        min_interval_minutes: Option<u64>,
        max_interval_minutes: Option<u64>,
    ) -> Self {
        Self {
            min_batch_size: min_batch_size.unwrap_or(limits.default_batch_size),
            max_batch_size: max_batch_size.unwrap_or(limits.default_batch_size),
            min_interval_minutes: min_interval_minutes.unwrap_or(limits.default_interval_minutes),
            max_interval_minutes: max_interval_minutes.unwrap_or(limits.default_interval_minutes),
            hard_cap_batch_size: limits.hard_cap_batch_size,
        }
    }

    /// Checks range consistency. Each check fails fast on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_batch_size > self.max_batch_size {
            return Err(ConfigError::InvertedBatchRange {
                min: self.min_batch_size,
                max: self.max_batch_size,
            });
        }
        if self.min_interval_minutes > self.max_interval_minutes {
            return Err(ConfigError::InvertedIntervalRange {
                min: self.min_interval_minutes,
                max: self.max_interval_minutes,
            });
        }
        if self.max_batch_size > self.hard_cap_batch_size {
            return Err(ConfigError::BatchSizeAboveCap {
                max: self.max_batch_size,
                cap: self.hard_cap_batch_size,
            });
        }
        if self.min_batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        Ok(())
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self::from_options(&BatchLimits::default(), None, None, None, None)
    }
}

/// Converts a pacing interval in minutes to a sleep duration.
pub fn interval_duration(minutes: u64) -> Duration {
    Duration::from_secs(minutes.saturating_mul(60))
}

/// Which account's holdings pay for the distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FundingAccount {
    /// The batching contract holds the funds; its owner triggers payouts.
    #[default]
    Batcher,
    /// The operating account funds every call.
    Signer,
}

impl std::str::FromStr for FundingAccount {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "batcher" | "contract" => Ok(FundingAccount::Batcher),
            "signer" | "sender" => Ok(FundingAccount::Signer),
            other => Err(ConfigError::InvalidValue {
                field: "funding_account".to_string(),
                reason: format!("expected 'batcher' or 'signer', got '{}'", other),
            }),
        }
    }
}

impl std::fmt::Display for FundingAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FundingAccount::Batcher => write!(f, "batcher"),
            FundingAccount::Signer => write!(f, "signer"),
        }
    }
}
