//! Batch scheduler
//!
//! Walks the recipient list left to right. Each step draws a batch size from
//! `[min_batch_size, max_batch_size]`, clips it to what is left, submits the
//! slice as one batcher call and then waits a random number of minutes from
//! `[min_interval_minutes, max_interval_minutes]` before the next batch.
//!
//! Randomness and waiting are injected ([`RangeSampler`], [`Pause`]) so a run
//! can be replayed exactly. Submissions are strictly sequential; a rejected
//! batch stops the run and nothing is retried.

use crate::address_list::RecipientList;
use crate::ledger::{BatchStatus, LedgerClient, TransferAsset};
use alloy_primitives::U256;
use core_logic::{
    interval_duration, BatchConfig, Pause, RangeSampler, RunMetrics, SubmissionError,
    BATCH_RESULT_TARGET,
};
use serde::Serialize;
use std::ops::Range;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Cursor over the recipient list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerState {
    cursor: usize,
    remaining: usize,
}

impl SchedulerState {
    pub fn new(total: usize) -> Self {
        Self {
            cursor: 0,
            remaining: total,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.remaining
    }

    pub fn is_done(&self) -> bool {
        self.remaining == 0
    }

    /// Takes the next batch of at most `drawn` recipients and moves the cursor.
    pub fn advance(&mut self, drawn: usize) -> Option<Range<usize>> {
        if self.is_done() {
            return None;
        }
        let size = drawn.clamp(1, self.remaining);
        let range = self.cursor..self.cursor + size;
        self.cursor += size;
        self.remaining -= size;
        Some(range)
    }
}

pub fn draw_batch_size<S: RangeSampler + ?Sized>(sampler: &mut S, config: &BatchConfig) -> usize {
    sampler.sample_inclusive(config.min_batch_size as u64, config.max_batch_size as u64) as usize
}

pub fn draw_interval<S: RangeSampler + ?Sized>(sampler: &mut S, config: &BatchConfig) -> Duration {
    let minutes =
        sampler.sample_inclusive(config.min_interval_minutes, config.max_interval_minutes);
    interval_duration(minutes)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedBatch {
    pub range: Range<usize>,
    /// `None` after the final batch.
    pub pause_after: Option<Duration>,
}

/// Draws the same sequence a real run would, without submitting anything.
pub fn plan_batches<S: RangeSampler + ?Sized>(
    total: usize,
    config: &BatchConfig,
    sampler: &mut S,
) -> Vec<PlannedBatch> {
    let mut state = SchedulerState::new(total);
    let mut plan = Vec::new();

    while let Some(range) = state.advance(draw_batch_size(sampler, config)) {
        let pause_after = if state.is_done() {
            None
        } else {
            Some(draw_interval(sampler, config))
        };
        plan.push(PlannedBatch { range, pause_after });
    }

    plan
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    /// 1-based
    pub index: usize,
    pub start: usize,
    pub size: usize,
    pub tx_hash: String,
}

/// A run stopped by a failed submission, with the batches that went through.
#[derive(Debug)]
pub struct ScheduleFailure {
    pub error: SubmissionError,
    pub completed: Vec<BatchOutcome>,
}

pub struct BatchScheduler<'a, L: LedgerClient + ?Sized> {
    ledger: &'a L,
    config: &'a BatchConfig,
    asset: TransferAsset,
    amount: U256,
    metrics: &'a RunMetrics,
}

impl<'a, L: LedgerClient + ?Sized> BatchScheduler<'a, L> {
    pub fn new(
        ledger: &'a L,
        config: &'a BatchConfig,
        asset: TransferAsset,
        amount: U256,
        metrics: &'a RunMetrics,
    ) -> Self {
        Self {
            ledger,
            config,
            asset,
            amount,
            metrics,
        }
    }

    pub async fn run<S, P>(
        &self,
        recipients: &RecipientList,
        sampler: &mut S,
        pause: &P,
    ) -> Result<Vec<BatchOutcome>, ScheduleFailure>
    where
        S: RangeSampler + ?Sized,
        P: Pause + ?Sized,
    {
        let all = recipients.as_slice();
        let total = all.len();
        let mut state = SchedulerState::new(total);
        let mut outcomes = Vec::new();

        info!(
            "Distributing {} to {} recipients in batches of {}..={}",
            self.asset, total, self.config.min_batch_size, self.config.max_batch_size
        );

        while !state.is_done() {
            let drawn = draw_batch_size(sampler, self.config);
            let sent = state.cursor();
            let Some(range) = state.advance(drawn) else {
                break;
            };
            let index = outcomes.len() + 1;
            let batch = &all[range.clone()];
            debug!(
                "Batch #{}: drew {}, sending recipients {}..{}",
                index, drawn, range.start, range.end
            );

            let started = Instant::now();
            let submitted = self
                .ledger
                .submit_batch_transfer(self.asset.wire_address(), batch, self.amount)
                .await;

            let submitted = match submitted {
                Ok(s) if s.status == BatchStatus::Reverted => {
                    self.metrics.record_failure();
                    error!(
                        target: BATCH_RESULT_TARGET,
                        "FAILED batch #{} | tx {} reverted | {}/{} recipients sent",
                        index, s.tx_hash, sent, total
                    );
                    return Err(ScheduleFailure {
                        error: SubmissionError::Reverted {
                            batch_index: index,
                            tx_hash: s.tx_hash,
                            sent,
                        },
                        completed: outcomes,
                    });
                }
                Ok(s) => s,
                Err(e) => {
                    self.metrics.record_failure();
                    error!(
                        target: BATCH_RESULT_TARGET,
                        "FAILED batch #{} | recipients {}..{} | {}/{} recipients sent | {:#}",
                        index, range.start, range.end, sent, total, e
                    );
                    return Err(ScheduleFailure {
                        error: SubmissionError::Rejected {
                            batch_index: index,
                            start: range.start,
                            end: range.end,
                            sent,
                            reason: format!("{:#}", e),
                        },
                        completed: outcomes,
                    });
                }
            };

            self.metrics.record_batch(batch.len(), started.elapsed());
            info!(
                target: BATCH_RESULT_TARGET,
                "SUCCESS batch #{} | {} recipients ({}..{}) | {}/{} sent | tx {}",
                index,
                batch.len(),
                range.start,
                range.end,
                state.cursor(),
                total,
                submitted.tx_hash
            );

            outcomes.push(BatchOutcome {
                index,
                start: range.start,
                size: batch.len(),
                tx_hash: submitted.tx_hash,
            });

            if !state.is_done() {
                let wait = draw_interval(sampler, self.config);
                info!(
                    "Waiting {} min before next batch ({} recipients left)",
                    wait.as_secs() / 60,
                    state.remaining()
                );
                self.metrics.record_pause(wait);
                pause.pause(wait).await;
            }
        }

        Ok(outcomes)
    }
}
