//! EVM Disperse - Randomized, paced bulk token distribution
//!
//! Sends a fixed amount of an ERC-20 token (or the native currency) to every
//! address in a list by calling a batching contract once per batch. Batch
//! sizes and the pauses between batches are drawn at random from configured
//! ranges.
//!
//! # Architecture
//!
//! - **[`address_list`]**: reads and filters the recipient file
//! - **[`amount`]**: decimal string to base-unit scaling
//! - **[`preflight`]**: configuration, funding and ownership checks
//! - **[`scheduler`]**: the batching loop
//! - **[`distribution`]**: ties the above together for one run
//! - **[`client`]**: alloy implementation of [`LedgerClient`]
//!
//! # Quick Start
//!
//! ```bash
//! cargo run -p evm-disperse -- \
//!     --addresses recipients.txt \
//!     --batcher 0x... --token 0x... --amount 1.5 \
//!     --min-batch-size 100 --max-batch-size 300 \
//!     --min-interval 5 --max-interval 15 --dry-run
//! ```

pub mod address_list;
pub mod amount;
pub mod client;
pub mod config;
pub mod distribution;
pub mod ledger;
pub mod preflight;
pub mod scheduler;

pub use address_list::{load_recipients, RecipientList, SkipReason, SkippedLine};
pub use amount::{format_base_units, normalize, to_base_units, NATIVE_DECIMALS};
pub use client::{ClientOptions, EvmLedgerClient};
pub use config::{DisperseConfig, DistributionParams};
pub use distribution::{DistributionReport, Distributor, PreparedDistribution};
pub use ledger::{BatchStatus, LedgerClient, SubmittedBatch, TransferAsset, NATIVE_SENTINEL};
pub use preflight::{PreflightInput, PreflightReport, PreflightValidator};
pub use scheduler::{plan_batches, BatchOutcome, BatchScheduler, PlannedBatch, SchedulerState};
