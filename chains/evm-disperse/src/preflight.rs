//! Checks that must pass before the first transfer is issued.
//!
//! Configuration checks run first and never touch the network. Funding and
//! ownership are then read from the ledger once; nothing is retried.

use crate::ledger::{LedgerClient, TransferAsset};
use alloy_primitives::{Address, U256};
use core_logic::{BatchConfig, ConfigError, CoreError, FundingAccount, NetworkError, PreflightError};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct PreflightInput<'a> {
    pub config: &'a BatchConfig,
    pub asset: TransferAsset,
    pub batcher: Address,
    pub funding_account: FundingAccount,
    pub recipient_count: usize,
    pub amount_per_recipient: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreflightReport {
    pub signer: Address,
    pub funding_address: Address,
    pub required: U256,
    pub available: U256,
}

/// `recipient_count * amount`, or a configuration error on overflow.
pub fn total_cost(recipient_count: usize, amount: U256) -> Result<U256, ConfigError> {
    U256::from(recipient_count)
        .checked_mul(amount)
        .ok_or_else(|| ConfigError::CostOverflow {
            count: recipient_count,
            amount: amount.to_string(),
        })
}

fn query_failed(query: &str) -> impl FnOnce(anyhow::Error) -> NetworkError + '_ {
    move |e| NetworkError::QueryFailed {
        query: query.to_string(),
        reason: format!("{:#}", e),
    }
}

pub struct PreflightValidator<'a, L: LedgerClient + ?Sized> {
    ledger: &'a L,
}

impl<'a, L: LedgerClient + ?Sized> PreflightValidator<'a, L> {
    pub fn new(ledger: &'a L) -> Self {
        Self { ledger }
    }

    pub async fn run(&self, input: &PreflightInput<'_>) -> Result<PreflightReport, CoreError> {
        input.config.validate()?;
        let required = total_cost(input.recipient_count, input.amount_per_recipient)?;

        let signer = self
            .ledger
            .signer_identity()
            .await
            .map_err(query_failed("signer_identity"))?;

        let funding_address = match input.funding_account {
            FundingAccount::Batcher => input.batcher,
            FundingAccount::Signer => signer,
        };

        let available = match input.asset {
            TransferAsset::Native => self
                .ledger
                .native_balance(funding_address)
                .await
                .map_err(query_failed("native_balance"))?,
            TransferAsset::Token(token) => self
                .ledger
                .token_balance(token, funding_address)
                .await
                .map_err(query_failed("token_balance"))?,
        };
        debug!(
            "Funding check on {} ({}): required {}, available {}",
            funding_address, input.asset, required, available
        );

        if available < required {
            return Err(PreflightError::InsufficientFunds {
                asset: input.asset.to_string(),
                account: funding_address.to_string(),
                required: required.to_string(),
                available: available.to_string(),
            }
            .into());
        }

        let owner = self
            .ledger
            .contract_owner(input.batcher)
            .await
            .map_err(query_failed("contract_owner"))?;

        if owner != signer {
            return Err(PreflightError::NotOwner {
                contract: input.batcher.to_string(),
                owner: owner.to_string(),
                caller: signer.to_string(),
            }
            .into());
        }

        info!(
            "Preflight passed: {} recipients, {} base units required, {} available",
            input.recipient_count, required, available
        );

        Ok(PreflightReport {
            signer,
            funding_address,
            required,
            available,
        })
    }
}
