//! Alloy-backed [`LedgerClient`].
//!
//! Reads go through `eth_call` with `sol!` bindings; batches are sent from the
//! local signer wallet to the batcher contract. Nothing here retries.

use crate::ledger::{BatchStatus, LedgerClient, SubmittedBatch, NATIVE_SENTINEL};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{sol, SolCall};
use anyhow::{Context, Result};
use async_trait::async_trait;
use core_logic::{CoreError, FundingAccount, NetworkError, SignerKey};
use std::sync::Arc;
use tracing::debug;
use url::Url;

sol!(
    interface IERC20 {
        function balanceOf(address account) external view returns (uint256);
        function decimals() external view returns (uint8);
    }
);

sol!(
    interface IBatcher {
        function owner() external view returns (address);
        function batchTransfer(address token, address[] calldata recipients, uint256 amount) external payable;
    }
);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientOptions {
    pub funding_account: FundingAccount,
    /// Wait for the receipt and report reverts instead of returning on acceptance.
    pub await_receipt: bool,
}

/// Value attached to a batch call. Only signer-funded native transfers carry one.
pub fn call_value(
    funding_account: FundingAccount,
    asset: Address,
    recipients: usize,
    amount: U256,
) -> Result<U256> {
    if funding_account == FundingAccount::Signer && asset == NATIVE_SENTINEL {
        U256::from(recipients)
            .checked_mul(amount)
            .context("call value overflows uint256")
    } else {
        Ok(U256::ZERO)
    }
}

#[derive(Clone)]
pub struct EvmLedgerClient {
    provider: Arc<dyn Provider + Send + Sync>,
    signer: Address,
    batcher: Address,
    options: ClientOptions,
}

impl EvmLedgerClient {
    pub async fn connect(
        rpc_url: &str,
        key: &SignerKey,
        batcher: Address,
        options: ClientOptions,
    ) -> Result<Self> {
        let url: Url = rpc_url.parse().map_err(|_| {
            CoreError::from(NetworkError::InvalidRpcUrl {
                url: rpc_url.to_string(),
            })
        })?;
        let signer: PrivateKeySigner = key
            .expose()
            .parse()
            .context("Failed to parse private key")?;
        let signer_address = signer.address();

        let provider: Arc<dyn Provider + Send + Sync> =
            Arc::new(ProviderBuilder::new().wallet(signer).connect_http(url));

        let chain_id = provider
            .get_chain_id()
            .await
            .context("RPC endpoint unreachable")?;
        debug!(
            "Connected to chain {} as {} (batcher {})",
            chain_id, signer_address, batcher
        );

        Ok(Self {
            provider,
            signer: signer_address,
            batcher,
            options,
        })
    }

    async fn call(&self, to: Address, input: Vec<u8>) -> Result<Bytes> {
        let query = TransactionRequest::default().to(to).input(input.into());
        let data = self.provider.call(query).await?;
        if data.is_empty() {
            anyhow::bail!("call to {} returned empty data", to);
        }
        Ok(data)
    }
}

#[async_trait]
impl LedgerClient for EvmLedgerClient {
    async fn signer_identity(&self) -> Result<Address> {
        Ok(self.signer)
    }

    async fn native_balance(&self, account: Address) -> Result<U256> {
        self.provider
            .get_balance(account)
            .await
            .with_context(|| format!("eth_getBalance({})", account))
    }

    async fn token_balance(&self, token: Address, account: Address) -> Result<U256> {
        let data = self
            .call(token, IERC20::balanceOfCall { account }.abi_encode())
            .await
            .with_context(|| format!("balanceOf({}) on {}", account, token))?;
        IERC20::balanceOfCall::abi_decode_returns(&data).context("decoding balanceOf")
    }

    async fn token_decimals(&self, token: Address) -> Result<u8> {
        let data = self
            .call(token, IERC20::decimalsCall {}.abi_encode())
            .await
            .with_context(|| format!("decimals() on {}", token))?;
        IERC20::decimalsCall::abi_decode_returns(&data).context("decoding decimals")
    }

    async fn contract_owner(&self, contract: Address) -> Result<Address> {
        let data = self
            .call(contract, IBatcher::ownerCall {}.abi_encode())
            .await
            .with_context(|| format!("owner() on {}", contract))?;
        IBatcher::ownerCall::abi_decode_returns(&data).context("decoding owner")
    }

    async fn submit_batch_transfer(
        &self,
        asset: Address,
        recipients: &[Address],
        amount: U256,
    ) -> Result<SubmittedBatch> {
        let value = call_value(self.options.funding_account, asset, recipients.len(), amount)?;
        let call = IBatcher::batchTransferCall {
            token: asset,
            recipients: recipients.to_vec(),
            amount,
        };

        let tx = TransactionRequest::default()
            .to(self.batcher)
            .from(self.signer)
            .input(call.abi_encode().into())
            .value(value);

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .context("batchTransfer rejected")?;
        let tx_hash = format!("{:?}", *pending.tx_hash());

        if !self.options.await_receipt {
            return Ok(SubmittedBatch::accepted(tx_hash));
        }

        let receipt = pending
            .get_receipt()
            .await
            .context("Failed to get receipt")?;
        let status = if receipt.inner.status() {
            BatchStatus::Confirmed
        } else {
            BatchStatus::Reverted
        };

        Ok(SubmittedBatch { tx_hash, status })
    }
}

impl std::fmt::Debug for EvmLedgerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvmLedgerClient")
            .field("signer", &self.signer)
            .field("batcher", &self.batcher)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
