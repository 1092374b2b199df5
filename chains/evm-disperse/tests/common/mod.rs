#![allow(dead_code)]

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use evm_disperse::{BatchStatus, LedgerClient, SubmittedBatch};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedCall {
    pub asset: Address,
    pub recipients: Vec<Address>,
    pub amount: U256,
}

/// In-memory ledger. Every call is recorded.
pub struct MockLedger {
    pub signer: Address,
    pub owner: Address,
    pub native_balance: U256,
    pub token_balance: U256,
    pub decimals: u8,
    /// 1-based batch number that the node rejects.
    pub reject_batch: Option<usize>,
    /// 1-based batch number whose receipt reports a revert.
    pub revert_batch: Option<usize>,
    pub fail_queries: bool,
    submitted: Mutex<Vec<SubmittedCall>>,
    queries: Mutex<Vec<String>>,
}

impl MockLedger {
    pub fn new() -> Self {
        let signer = Address::repeat_byte(0x5e);
        Self {
            signer,
            owner: signer,
            native_balance: U256::ZERO,
            token_balance: U256::ZERO,
            decimals: 18,
            reject_batch: None,
            revert_batch: None,
            fail_queries: false,
            submitted: Mutex::new(Vec::new()),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn with_token_balance(mut self, balance: U256) -> Self {
        self.token_balance = balance;
        self
    }

    pub fn with_native_balance(mut self, balance: U256) -> Self {
        self.native_balance = balance;
        self
    }

    pub fn with_decimals(mut self, decimals: u8) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn with_owner(mut self, owner: Address) -> Self {
        self.owner = owner;
        self
    }

    pub fn rejecting_batch(mut self, batch: usize) -> Self {
        self.reject_batch = Some(batch);
        self
    }

    pub fn reverting_batch(mut self, batch: usize) -> Self {
        self.revert_batch = Some(batch);
        self
    }

    pub fn failing_queries(mut self) -> Self {
        self.fail_queries = true;
        self
    }

    pub fn submitted(&self) -> Vec<SubmittedCall> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    fn record(&self, query: String) -> anyhow::Result<()> {
        self.queries.lock().unwrap().push(query);
        if self.fail_queries {
            anyhow::bail!("connection refused");
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn signer_identity(&self) -> anyhow::Result<Address> {
        Ok(self.signer)
    }

    async fn native_balance(&self, account: Address) -> anyhow::Result<U256> {
        self.record(format!("native_balance:{}", account))?;
        Ok(self.native_balance)
    }

    async fn token_balance(&self, token: Address, account: Address) -> anyhow::Result<U256> {
        self.record(format!("token_balance:{}:{}", token, account))?;
        Ok(self.token_balance)
    }

    async fn token_decimals(&self, token: Address) -> anyhow::Result<u8> {
        self.record(format!("token_decimals:{}", token))?;
        Ok(self.decimals)
    }

    async fn contract_owner(&self, contract: Address) -> anyhow::Result<Address> {
        self.record(format!("contract_owner:{}", contract))?;
        Ok(self.owner)
    }

    async fn submit_batch_transfer(
        &self,
        asset: Address,
        recipients: &[Address],
        amount: U256,
    ) -> anyhow::Result<SubmittedBatch> {
        let mut submitted = self.submitted.lock().unwrap();
        let number = submitted.len() + 1;
        if self.reject_batch == Some(number) {
            anyhow::bail!("insufficient funds for gas");
        }
        submitted.push(SubmittedCall {
            asset,
            recipients: recipients.to_vec(),
            amount,
        });

        let tx_hash = format!("0x{:064x}", number);
        if self.revert_batch == Some(number) {
            return Ok(SubmittedBatch {
                tx_hash,
                status: BatchStatus::Reverted,
            });
        }
        Ok(SubmittedBatch::accepted(tx_hash))
    }
}

/// `count` distinct non-zero recipients.
pub fn recipients(count: usize) -> Vec<Address> {
    (1..=count)
        .map(|i| {
            let mut bytes = [0u8; 20];
            bytes[12..].copy_from_slice(&(i as u64).to_be_bytes());
            Address::from(bytes)
        })
        .collect()
}

pub fn address_file_content(addresses: &[Address]) -> String {
    addresses
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
