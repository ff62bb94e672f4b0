//! Mint, close and rebalance sequencing against the in-memory vault.

use std::sync::Arc;

use alloy_primitives::U256;
use rangekeeper::application::{AgentSession, ExecutionCoordinator};
use rangekeeper::domain::{Action, Decision, DepositId, TickRange};
use rangekeeper::error::Error;
use rangekeeper::testkit::domain::{funded_deposit, pool_key, snapshot_at};
use rangekeeper::testkit::ledger::MockLedger;

const DEPOSIT: DepositId = DepositId::new(1);

fn setup() -> (Arc<MockLedger>, ExecutionCoordinator, Arc<AgentSession>) {
    let ledger = Arc::new(MockLedger::new(snapshot_at(-201_600)));
    ledger.insert_deposit(funded_deposit(1));
    let session = Arc::new(AgentSession::default());
    let coordinator = ExecutionCoordinator::new(ledger.clone(), session.clone(), pool_key());
    (ledger, coordinator, session)
}

fn range(lower: i32, upper: i32) -> TickRange {
    TickRange::new(lower, upper, 60).unwrap()
}

/// Top the deposit back up so another position can be opened.
fn refill(ledger: &MockLedger) {
    let funded = funded_deposit(1);
    let mut deposit = ledger.deposit_snapshot(DEPOSIT).unwrap();
    deposit.remaining_amount0 = funded.remaining_amount0;
    deposit.remaining_amount1 = funded.remaining_amount1;
    ledger.insert_deposit(deposit);
}

async fn open(coordinator: &ExecutionCoordinator, lower: i32, upper: i32) {
    let decision = Decision::with_range(Action::Mint, range(lower, upper), "open", 75);
    coordinator.execute_decision(DEPOSIT, &decision).await.unwrap();
}

#[tokio::test]
async fn rebalance_closes_then_remints_released_balance() {
    let (ledger, coordinator, session) = setup();
    open(&coordinator, -202_200, -201_000).await;

    let result = coordinator
        .rebalance(DEPOSIT, range(-195_600, -194_400))
        .await
        .unwrap();

    assert_eq!(result.close_tx_hashes.len(), 1);
    let minted = result.mint_result.unwrap();
    assert_eq!(result.new_position_id, Some(minted.position_id));
    assert_eq!((minted.tick_lower, minted.tick_upper), (-195_600, -194_400));

    let entries = session.bounds().entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].0, minted.position_id);
    assert_eq!(ledger.open_position_count(), 1);
}

#[tokio::test]
async fn rebalance_with_nothing_released_skips_the_mint() {
    let (ledger, coordinator, _session) = setup();
    open(&coordinator, -202_200, -201_000).await;
    refill(&ledger);
    open(&coordinator, -202_800, -200_400).await;
    ledger.set_refund_on_close(false);

    let result = coordinator
        .rebalance(DEPOSIT, range(-195_600, -194_400))
        .await
        .unwrap();

    assert_eq!(result.close_tx_hashes.len(), 2);
    assert!(result.mint_result.is_none());
    assert!(result.new_position_id.is_none());
    assert_eq!(ledger.mints().len(), 2);
    assert_eq!(ledger.open_position_count(), 0);
}

#[tokio::test]
async fn failed_close_stops_the_rebalance() {
    let (ledger, coordinator, session) = setup();
    open(&coordinator, -202_200, -201_000).await;
    ledger.fail_next_close("execution reverted");

    let err = coordinator
        .rebalance(DEPOSIT, range(-195_600, -194_400))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Chain(_)));
    assert_eq!(ledger.mints().len(), 1);
    assert_eq!(ledger.open_position_count(), 1);
    assert_eq!(session.bounds().len(), 1);
}

#[tokio::test]
async fn close_decision_closes_positions_in_order() {
    let (ledger, coordinator, _session) = setup();
    open(&coordinator, -202_200, -201_000).await;
    let first = ledger.deposit_snapshot(DEPOSIT).unwrap().open_position_ids[0];
    refill(&ledger);
    open(&coordinator, -202_800, -200_400).await;

    let result = coordinator
        .execute_decision(DEPOSIT, &Decision::close("exit", 90))
        .await
        .unwrap();

    assert_eq!(result.action, Action::Close);
    assert_eq!(result.tx_hashes.len(), 2);
    let closes = ledger.closes();
    assert_eq!(closes[0].position_id, first);
    assert!(closes.iter().all(|c| c.amount0_min == U256::ZERO));
}

#[tokio::test]
async fn close_without_positions_is_a_no_op() {
    let (ledger, coordinator, _session) = setup();

    let result = coordinator
        .execute_decision(DEPOSIT, &Decision::close("exit", 90))
        .await
        .unwrap();

    assert!(result.is_no_op());
    assert!(ledger.closes().is_empty());
}

#[tokio::test]
async fn mint_without_balance_is_a_no_op() {
    let (ledger, coordinator, _session) = setup();
    let mut empty = funded_deposit(1);
    empty.remaining_amount0 = U256::ZERO;
    empty.remaining_amount1 = U256::ZERO;
    ledger.insert_deposit(empty);

    let decision = Decision::with_range(Action::Mint, range(-202_200, -201_000), "open", 75);
    let result = coordinator.execute_decision(DEPOSIT, &decision).await.unwrap();

    assert!(result.is_no_op());
    assert!(ledger.mints().is_empty());
}

#[tokio::test]
async fn range_decision_without_bounds_is_rejected() {
    let (ledger, coordinator, _session) = setup();
    let decision = Decision {
        action: Action::Rebalance,
        tick_lower: None,
        tick_upper: Some(-201_000),
        reason: "half a range".to_string(),
        confidence: 80,
    };

    let err = coordinator
        .execute_decision(DEPOSIT, &decision)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Execution(_)));
    assert!(ledger.closes().is_empty());
}

#[tokio::test]
async fn mint_liquidity_stays_within_deposit_amounts() {
    let (ledger, coordinator, _session) = setup();
    open(&coordinator, -202_200, -201_000).await;

    let request = &ledger.mints()[0];
    let deposit = funded_deposit(1);
    assert!(request.liquidity > 0);
    assert_eq!(request.amount0_max, deposit.remaining_amount0);
    assert_eq!(request.amount1_max, deposit.remaining_amount1);
    assert!(request.deadline > 0);
}
