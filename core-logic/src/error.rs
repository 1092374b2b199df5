//! # Core Error Types
//!
//! Centralized error definitions for the core-logic crate.
//! All errors implement `std::error::Error` and `std::fmt::Display`.
//!
//! Every variant here is fatal for a distribution run except parse warnings,
//! which never become errors (they are logged and recorded by the parser).

use thiserror::Error;

/// Unified error type for a distribution run.
///
/// This enum wraps all specific error types and provides a unified
/// error interface for the application layer.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Config(ConfigError),

    #[error(transparent)]
    Preflight(PreflightError),

    #[error(transparent)]
    Submission(SubmissionError),

    #[error(transparent)]
    Network(NetworkError),

    #[error(transparent)]
    Wallet(WalletError),
}

impl From<ConfigError> for CoreError {
    fn from(e: ConfigError) -> Self {
        CoreError::Config(e)
    }
}

impl From<PreflightError> for CoreError {
    fn from(e: PreflightError) -> Self {
        CoreError::Preflight(e)
    }
}

impl From<SubmissionError> for CoreError {
    fn from(e: SubmissionError) -> Self {
        CoreError::Submission(e)
    }
}

impl From<NetworkError> for CoreError {
    fn from(e: NetworkError) -> Self {
        CoreError::Network(e)
    }
}

impl From<WalletError> for CoreError {
    fn from(e: WalletError) -> Self {
        CoreError::Wallet(e)
    }
}

impl CoreError {
    /// Short category name used in logs and the run report.
    pub fn category(&self) -> &'static str {
        match self {
            CoreError::Config(_) => "configuration",
            CoreError::Preflight(PreflightError::InsufficientFunds { .. }) => "insufficient_funds",
            CoreError::Preflight(PreflightError::NotOwner { .. }) => "authorization",
            CoreError::Submission(_) => "submission",
            CoreError::Network(_) => "network",
            CoreError::Wallet(_) => "wallet",
        }
    }
}

/// Configuration-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("min batch size ({min}) is greater than max batch size ({max})")]
    InvertedBatchRange { min: usize, max: usize },

    #[error("min interval ({min} min) is greater than max interval ({max} min)")]
    InvertedIntervalRange { min: u64, max: u64 },

    #[error("max batch size ({max}) exceeds the hard cap of {cap}")]
    BatchSizeAboveCap { max: usize, cap: usize },

    #[error("batch size must be at least 1")]
    ZeroBatchSize,

    #[error("Invalid amount '{value}': {reason}")]
    InvalidAmount { value: String, reason: String },

    #[error("Amount '{value}' has {fraction_digits} fractional digits but the token only has {decimals}")]
    AmountPrecision {
        value: String,
        decimals: u8,
        fraction_digits: usize,
    },

    #[error("Invalid address for '{field}': '{value}'")]
    InvalidAddress { field: String, value: String },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Missing required configuration field: '{field}'")]
    MissingField { field: String },

    #[error("No valid recipient addresses found in {path}")]
    EmptyRecipientList { path: String },

    #[error("Total cost overflows: {count} recipients x {amount} base units")]
    CostOverflow { count: usize, amount: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("I/O error reading {path}: {msg}")]
    IoError { path: String, msg: String },
}

/// Funding and authorization checks that run before the first transfer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreflightError {
    #[error("Insufficient {asset} balance on {account}: required {required}, available {available}")]
    InsufficientFunds {
        asset: String,
        account: String,
        required: String,
        available: String,
    },

    #[error("Caller {caller} is not the owner of batcher {contract} (owner: {owner})")]
    NotOwner {
        contract: String,
        owner: String,
        caller: String,
    },
}

/// A batch submission failed. The loop stops here; nothing is retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("Batch #{batch_index} (recipients {start}..{end}) rejected after {sent} recipients were sent: {reason}")]
    Rejected {
        batch_index: usize,
        start: usize,
        end: usize,
        sent: usize,
        reason: String,
    },

    #[error("Batch #{batch_index} transaction {tx_hash} reverted after {sent} recipients were sent")]
    Reverted {
        batch_index: usize,
        tx_hash: String,
        sent: usize,
    },
}

impl SubmissionError {
    /// Number of recipients that were covered by earlier, accepted batches.
    pub fn recipients_sent(&self) -> usize {
        match self {
            SubmissionError::Rejected { sent, .. } | SubmissionError::Reverted { sent, .. } => *sent,
        }
    }
}

/// Ledger read failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Ledger query '{query}' failed: {reason}")]
    QueryFailed { query: String, reason: String },

    #[error("Invalid RPC URL format: '{url}'")]
    InvalidRpcUrl { url: String },
}

/// Signer key loading errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("No private key found (set {env_var} or provide {file})")]
    MissingKey { env_var: String, file: String },

    #[error("Cannot read key file {file}: {msg}")]
    KeyFileUnreadable { file: String, msg: String },

    #[error("Invalid private key format: expected hex string")]
    InvalidKeyFormat,

    #[error("Private key has wrong length: expected 64 hex chars, got {length}")]
    InvalidKeyLength { length: usize },
}
