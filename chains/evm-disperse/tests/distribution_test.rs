mod common;

use alloy_primitives::{Address, U256};
use common::{address_file_content, recipients, MockLedger};
use core_logic::{
    BatchConfig, BatchLimits, ConfigError, CoreError, FundingAccount, RandomSampler,
    RecordingPause, RunMetrics,
};
use evm_disperse::{DistributionParams, Distributor, TransferAsset};
use std::io::Write;
use std::path::Path;
use tempfile::{tempdir, NamedTempFile};

fn params(path: &Path, amount: &str, asset: TransferAsset, batch: BatchConfig) -> DistributionParams {
    DistributionParams {
        addresses_path: path.to_path_buf(),
        asset,
        batcher_address: Address::repeat_byte(0xba),
        amount: amount.to_string(),
        batch,
        funding_account: FundingAccount::Batcher,
        await_receipt: false,
    }
}

fn token() -> TransferAsset {
    TransferAsset::Token(Address::repeat_byte(0x70))
}

fn address_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_full_run_with_token_decimals() {
    let all = recipients(120);
    let mut content = address_file_content(&all);
    content.push_str("\nnot-an-address\n\n");
    let file = address_file(&content);

    let ledger = MockLedger::new()
        .with_decimals(6)
        .with_token_balance(U256::from(180_000_000u64));
    let batch = BatchConfig::from_options(&BatchLimits::default(), Some(30), Some(50), Some(1), Some(2));
    let params = params(file.path(), "1.5", token(), batch);
    let distributor = Distributor::new(&ledger, &params);

    let prepared = distributor.prepare().await.unwrap();
    assert_eq!(prepared.recipients.len(), 120);
    assert_eq!(prepared.recipients.rejected_count(), 1);
    assert_eq!(prepared.amount, U256::from(1_500_000u64));
    assert_eq!(prepared.display_total(), "180");

    let metrics = RunMetrics::new();
    let pause = RecordingPause::new();
    let report = distributor
        .execute(&prepared, &mut RandomSampler::seeded(11), &pause, &metrics)
        .await;

    assert!(report.is_complete());
    assert_eq!(report.recipients_sent, 120);
    assert_eq!(report.amount_per_recipient, "1500000");
    assert_eq!(report.batches.len(), ledger.submitted().len());
    assert_eq!(pause.recorded().len(), report.batches.len() - 1);
    assert!(report.into_result().is_ok());
}

#[tokio::test]
async fn test_dry_run_plan_matches_execution() {
    let file = address_file(&address_file_content(&recipients(333)));
    let ledger = MockLedger::new().with_token_balance(U256::MAX);
    let batch = BatchConfig::from_options(&BatchLimits::default(), Some(20), Some(90), Some(1), Some(30));
    let params = params(file.path(), "2", token(), batch);
    let distributor = Distributor::new(&ledger, &params);
    let prepared = distributor.prepare().await.unwrap();

    let plan = distributor.plan(&prepared, &mut RandomSampler::seeded(99));
    let report = distributor
        .execute(
            &prepared,
            &mut RandomSampler::seeded(99),
            &RecordingPause::new(),
            &RunMetrics::new(),
        )
        .await;

    let planned: Vec<(usize, usize)> = plan.iter().map(|p| (p.range.start, p.range.len())).collect();
    let executed: Vec<(usize, usize)> = report.batches.iter().map(|b| (b.start, b.size)).collect();
    assert_eq!(planned, executed);
}

#[tokio::test]
async fn test_empty_list_fails_before_ledger() {
    let file = address_file("junk\n\n0x0000000000000000000000000000000000000000\n");
    let ledger = MockLedger::new().with_token_balance(U256::MAX);
    let params = params(file.path(), "1", token(), BatchConfig::default());

    let err = Distributor::new(&ledger, &params).prepare().await.unwrap_err();

    assert!(matches!(
        err,
        CoreError::Config(ConfigError::EmptyRecipientList { .. })
    ));
    assert!(ledger.queries().is_empty());
}

#[tokio::test]
async fn test_missing_file() {
    let dir = tempdir().unwrap();
    let ledger = MockLedger::new();
    let params = params(&dir.path().join("nope.txt"), "1", token(), BatchConfig::default());

    let err = Distributor::new(&ledger, &params).prepare().await.unwrap_err();
    assert!(matches!(err, CoreError::Config(ConfigError::FileNotFound { .. })));
}

#[tokio::test]
async fn test_over_precise_amount_rejected() {
    let file = address_file(&address_file_content(&recipients(2)));
    let ledger = MockLedger::new().with_decimals(6).with_token_balance(U256::MAX);
    let params = params(file.path(), "1.1234567", token(), BatchConfig::default());

    let err = Distributor::new(&ledger, &params).prepare().await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::Config(ConfigError::AmountPrecision {
            decimals: 6,
            fraction_digits: 7,
            ..
        })
    ));
}

#[tokio::test]
async fn test_native_skips_decimals_query() {
    let file = address_file(&address_file_content(&recipients(4)));
    let ledger = MockLedger::new().with_native_balance(U256::from(4u64) * U256::from(10u64).pow(U256::from(17u64)));
    let params = params(file.path(), "0.1", TransferAsset::Native, BatchConfig::default());

    let prepared = Distributor::new(&ledger, &params).prepare().await.unwrap();

    assert_eq!(prepared.decimals, 18);
    assert!(!ledger.queries().iter().any(|q| q.starts_with("token_decimals")));
}

#[tokio::test]
async fn test_failed_run_report() {
    let file = address_file(&address_file_content(&recipients(50)));
    let ledger = MockLedger::new()
        .with_token_balance(U256::MAX)
        .rejecting_batch(3);
    let batch = BatchConfig::from_options(&BatchLimits::default(), Some(10), Some(10), Some(1), Some(1));
    let params = params(file.path(), "1", token(), batch);
    let distributor = Distributor::new(&ledger, &params);
    let prepared = distributor.prepare().await.unwrap();

    let report = distributor
        .execute(
            &prepared,
            &mut RandomSampler::seeded(5),
            &RecordingPause::new(),
            &RunMetrics::new(),
        )
        .await;

    assert!(!report.is_complete());
    assert_eq!(report.recipients_sent, 20);
    assert_eq!(report.batches.len(), 2);

    let dir = tempdir().unwrap();
    let path = dir.path().join("report.json");
    report.write_json(&path).await.unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["recipients_sent"], 20);
    assert_eq!(json["batches"].as_array().unwrap().len(), 2);
    assert!(json["error"].as_str().unwrap().contains("20 recipients"));

    let err = report.into_result().unwrap_err();
    assert_eq!(err.category(), "submission");
}
