use alloy_primitives::{address, Address, U256};
use anyhow::Result;
use async_trait::async_trait;
use std::fmt;

/// Sentinel the batcher contract treats as "native currency".
pub const NATIVE_SENTINEL: Address = address!("eeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee");

/// What is being distributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferAsset {
    Token(Address),
    Native,
}

impl TransferAsset {
    pub fn from_flag(token_native: bool, token: Option<Address>) -> Option<Self> {
        if token_native {
            Some(TransferAsset::Native)
        } else {
            token.map(TransferAsset::Token)
        }
    }

    /// Address passed to the batcher: the token, or [`NATIVE_SENTINEL`].
    pub fn wire_address(&self) -> Address {
        match self {
            TransferAsset::Token(token) => *token,
            TransferAsset::Native => NATIVE_SENTINEL,
        }
    }
}

impl fmt::Display for TransferAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferAsset::Token(token) => write!(f, "token {}", token),
            TransferAsset::Native => write!(f, "native"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    /// Accepted by the node; the receipt was not awaited.
    Accepted,
    Confirmed,
    Reverted,
}

/// A batch the network accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedBatch {
    pub tx_hash: String,
    pub status: BatchStatus,
}

impl SubmittedBatch {
    pub fn accepted(tx_hash: impl Into<String>) -> Self {
        Self {
            tx_hash: tx_hash.into(),
            status: BatchStatus::Accepted,
        }
    }
}

/// Read/write operations against the chain, as seen by the distribution core.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// The operating account.
    async fn signer_identity(&self) -> Result<Address>;

    async fn native_balance(&self, account: Address) -> Result<U256>;

    async fn token_balance(&self, token: Address, account: Address) -> Result<U256>;

    async fn token_decimals(&self, token: Address) -> Result<u8>;

    async fn contract_owner(&self, contract: Address) -> Result<Address>;

    /// Sends one batcher call paying `amount` to each recipient. Resolves once
    /// the network has accepted the transaction.
    async fn submit_batch_transfer(
        &self,
        asset: Address,
        recipients: &[Address],
        amount: U256,
    ) -> Result<SubmittedBatch>;
}
