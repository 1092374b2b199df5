//! End-to-end run: parse, normalize, preflight, schedule.

use crate::address_list::{load_recipients, RecipientList};
use crate::amount::{format_base_units, to_base_units, NATIVE_DECIMALS};
use crate::config::DistributionParams;
use crate::ledger::{LedgerClient, TransferAsset};
use crate::preflight::{PreflightInput, PreflightReport, PreflightValidator};
use crate::scheduler::{plan_batches, BatchOutcome, BatchScheduler, PlannedBatch, ScheduleFailure};
use alloy_primitives::U256;
use anyhow::{Context, Result};
use core_logic::{
    ConfigError, CoreError, MetricsSnapshot, NetworkError, Pause, RangeSampler, RunMetrics,
    SubmissionError,
};
use serde::Serialize;
use std::path::Path;
use tracing::{error, info, warn};

/// Everything checked and ready; no transfer issued yet.
#[derive(Debug, Clone)]
pub struct PreparedDistribution {
    pub recipients: RecipientList,
    pub decimals: u8,
    pub amount: U256,
    pub preflight: PreflightReport,
}

impl PreparedDistribution {
    pub fn display_amount(&self) -> String {
        format_base_units(self.amount, self.decimals)
    }

    pub fn display_total(&self) -> String {
        format_base_units(self.preflight.required, self.decimals)
    }
}

#[derive(Debug, Serialize)]
pub struct DistributionReport {
    pub asset: String,
    /// Base units
    pub amount_per_recipient: String,
    pub recipients_total: usize,
    pub recipients_sent: usize,
    pub batches: Vec<BatchOutcome>,
    pub metrics: MetricsSnapshot,
    pub error: Option<String>,
    #[serde(skip)]
    pub failure: Option<SubmissionError>,
}

impl DistributionReport {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none() && self.recipients_sent == self.recipients_total
    }

    pub async fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("writing report to {}", path.display()))
    }

    /// The run's outcome as an error, if it stopped early.
    pub fn into_result(self) -> Result<Self, CoreError> {
        match self.failure {
            Some(e) => Err(e.into()),
            None => Ok(self),
        }
    }
}

pub struct Distributor<'a, L: LedgerClient + ?Sized> {
    ledger: &'a L,
    params: &'a DistributionParams,
}

impl<'a, L: LedgerClient + ?Sized> Distributor<'a, L> {
    pub fn new(ledger: &'a L, params: &'a DistributionParams) -> Self {
        Self { ledger, params }
    }

    /// Loads recipients, scales the amount and runs preflight.
    pub async fn prepare(&self) -> Result<PreparedDistribution, CoreError> {
        self.params.batch.validate()?;

        let recipients = load_recipients(&self.params.addresses_path).await?;
        if recipients.rejected_count() > 0 {
            warn!(
                "{} invalid lines skipped in {}",
                recipients.rejected_count(),
                self.params.addresses_path.display()
            );
        }
        if recipients.is_empty() {
            return Err(ConfigError::EmptyRecipientList {
                path: self.params.addresses_path.display().to_string(),
            }
            .into());
        }

        let decimals = match self.params.asset {
            TransferAsset::Native => NATIVE_DECIMALS,
            TransferAsset::Token(token) => self.ledger.token_decimals(token).await.map_err(|e| {
                NetworkError::QueryFailed {
                    query: "token_decimals".to_string(),
                    reason: format!("{:#}", e),
                }
            })?,
        };
        let amount = to_base_units(&self.params.amount, decimals)?;
        info!(
            "{} recipients, {} per recipient ({} base units, {} decimals)",
            recipients.len(),
            self.params.amount,
            amount,
            decimals
        );

        let input = PreflightInput {
            config: &self.params.batch,
            asset: self.params.asset,
            batcher: self.params.batcher_address,
            funding_account: self.params.funding_account,
            recipient_count: recipients.len(),
            amount_per_recipient: amount,
        };
        let preflight = PreflightValidator::new(self.ledger).run(&input).await?;

        Ok(PreparedDistribution {
            recipients,
            decimals,
            amount,
            preflight,
        })
    }

    pub fn plan<S: RangeSampler + ?Sized>(
        &self,
        prepared: &PreparedDistribution,
        sampler: &mut S,
    ) -> Vec<PlannedBatch> {
        plan_batches(prepared.recipients.len(), &self.params.batch, sampler)
    }

    /// Runs every batch. A failed batch ends the run; the report says how far it got.
    pub async fn execute<S, P>(
        &self,
        prepared: &PreparedDistribution,
        sampler: &mut S,
        pause: &P,
        metrics: &RunMetrics,
    ) -> DistributionReport
    where
        S: RangeSampler + ?Sized,
        P: Pause + ?Sized,
    {
        let scheduler = BatchScheduler::new(
            self.ledger,
            &self.params.batch,
            self.params.asset,
            prepared.amount,
            metrics,
        );

        let (batches, failure) = match scheduler.run(&prepared.recipients, sampler, pause).await {
            Ok(batches) => (batches, None),
            Err(ScheduleFailure { error, completed }) => (completed, Some(error)),
        };

        let recipients_sent = batches.iter().map(|b| b.size).sum();
        let total = prepared.recipients.len();
        match &failure {
            None => info!(
                "Distribution complete: {} recipients in {} batches",
                recipients_sent,
                batches.len()
            ),
            Some(e) => error!(
                "Distribution stopped: {}. {} of {} recipients were sent; remove them before re-running",
                e, recipients_sent, total
            ),
        }

        DistributionReport {
            asset: self.params.asset.to_string(),
            amount_per_recipient: prepared.amount.to_string(),
            recipients_total: total,
            recipients_sent,
            batches,
            metrics: metrics.snapshot(),
            error: failure.as_ref().map(|e| e.to_string()),
            failure,
        }
    }
}
