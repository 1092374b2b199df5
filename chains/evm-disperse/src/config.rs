use crate::address_list::matches_address_pattern;
use crate::ledger::TransferAsset;
use alloy_primitives::Address;
use anyhow::Result;
use config::{Config, Environment, File};
use core_logic::{BatchConfig, BatchLimits, ConfigError, FundingAccount};
use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "disperse.toml";
pub const ENV_PREFIX: &str = "DISPERSE";
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Settings read from the optional config file and `DISPERSE_*` variables.
/// Every field may be overridden from the command line.
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct DisperseConfig {
    pub rpc_url: Option<String>,
    pub batcher_address: Option<String>,
    pub token_address: Option<String>,
    pub min_batch_size: Option<usize>,
    pub max_batch_size: Option<usize>,
    pub min_interval: Option<u64>,
    pub max_interval: Option<u64>,
    pub funding_account: Option<FundingAccount>,
    pub await_receipt: Option<bool>,
    pub log_dir: Option<String>,
}

impl DisperseConfig {
    /// Loads `path` (when it exists) layered under the environment.
    pub fn load(path: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        settings.try_deserialize().map_err(|e| anyhow::anyhow!(e))
    }

    /// Values set in `overrides` win.
    pub fn merge(self, overrides: DisperseConfig) -> Self {
        Self {
            rpc_url: overrides.rpc_url.or(self.rpc_url),
            batcher_address: overrides.batcher_address.or(self.batcher_address),
            token_address: overrides.token_address.or(self.token_address),
            min_batch_size: overrides.min_batch_size.or(self.min_batch_size),
            max_batch_size: overrides.max_batch_size.or(self.max_batch_size),
            min_interval: overrides.min_interval.or(self.min_interval),
            max_interval: overrides.max_interval.or(self.max_interval),
            funding_account: overrides.funding_account.or(self.funding_account),
            await_receipt: overrides.await_receipt.or(self.await_receipt),
            log_dir: overrides.log_dir.or(self.log_dir),
        }
    }

    pub fn log_dir(&self) -> &str {
        self.log_dir.as_deref().unwrap_or(DEFAULT_LOG_DIR)
    }

    pub fn batch_config(&self, limits: &BatchLimits) -> BatchConfig {
        BatchConfig::from_options(
            limits,
            self.min_batch_size,
            self.max_batch_size,
            self.min_interval,
            self.max_interval,
        )
    }
}

/// Parses a contract or token address parameter.
pub fn parse_address(field: &str, value: &str) -> Result<Address, ConfigError> {
    let value = value.trim();
    let invalid = || ConfigError::InvalidAddress {
        field: field.to_string(),
        value: value.to_string(),
    };

    if !matches_address_pattern(value) {
        return Err(invalid());
    }
    let address = Address::from_str(value).map_err(|_| invalid())?;
    if address == Address::ZERO {
        return Err(invalid());
    }
    Ok(address)
}

/// Validated parameters of one distribution run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionParams {
    pub addresses_path: PathBuf,
    pub asset: TransferAsset,
    pub batcher_address: Address,
    /// Decimal string as entered; normalized once decimals are known.
    pub amount: String,
    pub batch: BatchConfig,
    pub funding_account: FundingAccount,
    pub await_receipt: bool,
}

impl DistributionParams {
    pub fn resolve(
        config: &DisperseConfig,
        addresses_path: impl Into<PathBuf>,
        amount: &str,
        token_native: bool,
        limits: &BatchLimits,
    ) -> Result<Self, ConfigError> {
        let batcher = config
            .batcher_address
            .as_deref()
            .ok_or_else(|| ConfigError::MissingField {
                field: "batcher_address".to_string(),
            })?;
        let batcher_address = parse_address("batcher_address", batcher)?;

        let token = config
            .token_address
            .as_deref()
            .map(|t| parse_address("token_address", t))
            .transpose()?;
        if token_native && token.is_some() {
            warn!("Native transfer requested; token_address is ignored");
        }
        let asset = TransferAsset::from_flag(token_native, token).ok_or_else(|| {
            ConfigError::MissingField {
                field: "token_address".to_string(),
            }
        })?;

        if amount.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "amount".to_string(),
            });
        }

        let batch = config.batch_config(limits);
        batch.validate()?;

        Ok(Self {
            addresses_path: addresses_path.into(),
            asset,
            batcher_address,
            amount: amount.trim().to_string(),
            batch,
            funding_account: config.funding_account.unwrap_or_default(),
            await_receipt: config.await_receipt.unwrap_or(false),
        })
    }
}
