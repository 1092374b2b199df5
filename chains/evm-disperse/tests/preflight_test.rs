mod common;

use alloy_primitives::{address, Address, U256};
use common::MockLedger;
use core_logic::{
    BatchConfig, BatchLimits, ConfigError, CoreError, FundingAccount, NetworkError, PreflightError,
};
use evm_disperse::preflight::total_cost;
use evm_disperse::{PreflightInput, PreflightValidator, TransferAsset};

const BATCHER: Address = address!("babababababababababababababababababababa");
const TOKEN: Address = address!("7070707070707070707070707070707070707070");

fn input(config: &BatchConfig, count: usize, amount: u64) -> PreflightInput<'_> {
    PreflightInput {
        config,
        asset: TransferAsset::Token(TOKEN),
        batcher: BATCHER,
        funding_account: FundingAccount::Batcher,
        recipient_count: count,
        amount_per_recipient: U256::from(amount),
    }
}

#[tokio::test]
async fn test_passes_when_balance_equals_cost() {
    let ledger = MockLedger::new().with_token_balance(U256::from(1_000u64));
    let config = BatchConfig::default();

    let report = PreflightValidator::new(&ledger)
        .run(&input(&config, 10, 100))
        .await
        .unwrap();

    assert_eq!(report.required, U256::from(1_000u64));
    assert_eq!(report.available, U256::from(1_000u64));
    assert_eq!(report.funding_address, BATCHER);
    assert_eq!(report.signer, ledger.signer);
}

#[tokio::test]
async fn test_fails_one_unit_short() {
    let ledger = MockLedger::new().with_token_balance(U256::from(999u64));
    let config = BatchConfig::default();

    let err = PreflightValidator::new(&ledger)
        .run(&input(&config, 10, 100))
        .await
        .unwrap_err();

    match err {
        CoreError::Preflight(PreflightError::InsufficientFunds {
            required, available, ..
        }) => {
            assert_eq!(required, "1000");
            assert_eq!(available, "999");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    // owner is never asked once funding fails
    assert!(!ledger.queries().iter().any(|q| q.starts_with("contract_owner")));
}

#[tokio::test]
async fn test_rejects_batch_size_above_cap_before_queries() {
    let ledger = MockLedger::new().with_token_balance(U256::MAX);
    let config =
        BatchConfig::from_options(&BatchLimits::default(), Some(600), Some(600), None, None);

    let err = PreflightValidator::new(&ledger)
        .run(&input(&config, 10, 1))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CoreError::Config(ConfigError::BatchSizeAboveCap { max: 600, cap: 500 })
    ));
    assert!(ledger.queries().is_empty());
}

#[tokio::test]
async fn test_rejects_inverted_ranges() {
    let ledger = MockLedger::new().with_token_balance(U256::MAX);
    let limits = BatchLimits::default();

    let batches = BatchConfig::from_options(&limits, Some(200), Some(100), None, None);
    let err = PreflightValidator::new(&ledger)
        .run(&input(&batches, 10, 1))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::Config(ConfigError::InvertedBatchRange { min: 200, max: 100 })
    ));

    let intervals = BatchConfig::from_options(&limits, None, None, Some(30), Some(5));
    let err = PreflightValidator::new(&ledger)
        .run(&input(&intervals, 10, 1))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::Config(ConfigError::InvertedIntervalRange { min: 30, max: 5 })
    ));
}

#[tokio::test]
async fn test_rejects_non_owner() {
    let stranger = Address::repeat_byte(0x99);
    let ledger = MockLedger::new()
        .with_token_balance(U256::MAX)
        .with_owner(stranger);
    let config = BatchConfig::default();

    let err = PreflightValidator::new(&ledger)
        .run(&input(&config, 1, 1))
        .await
        .unwrap_err();

    assert_eq!(err.category(), "authorization");
    assert!(matches!(err, CoreError::Preflight(PreflightError::NotOwner { .. })));
}

#[tokio::test]
async fn test_native_checks_native_balance_of_signer() {
    let ledger = MockLedger::new()
        .with_native_balance(U256::from(50u64))
        .with_token_balance(U256::ZERO);
    let config = BatchConfig::default();
    let input = PreflightInput {
        asset: TransferAsset::Native,
        funding_account: FundingAccount::Signer,
        ..input(&config, 5, 10)
    };

    let report = PreflightValidator::new(&ledger).run(&input).await.unwrap();

    assert_eq!(report.funding_address, ledger.signer);
    assert_eq!(
        ledger.queries()[0],
        format!("native_balance:{}", ledger.signer)
    );
}

#[tokio::test]
async fn test_query_failure_is_network_error() {
    let ledger = MockLedger::new().failing_queries();
    let config = BatchConfig::default();

    let err = PreflightValidator::new(&ledger)
        .run(&input(&config, 1, 1))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CoreError::Network(NetworkError::QueryFailed { .. })
    ));
}

#[test]
fn test_total_cost_overflow() {
    assert_eq!(total_cost(3, U256::from(7u64)).unwrap(), U256::from(21u64));
    assert!(matches!(
        total_cost(2, U256::MAX),
        Err(ConfigError::CostOverflow { count: 2, .. })
    ));
}
