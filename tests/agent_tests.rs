//! End-to-end passes of the agent over in-memory ports.

mod support;

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use rangekeeper::domain::{
    Action, AgentId, Decision, DepositId, DepositStatus, TickRange, ValidationStatus,
};
use rangekeeper::port::inbound::agent::{AgentFacade, OutcomeStatus};
use rangekeeper::port::outbound::ledger::{AgentAssigned, DepositCreated};
use rangekeeper::testkit::advisor::ScriptedAdvisor;
use rangekeeper::testkit::domain::{funded_deposit, AGENT_ID};

use support::harness;

const DEPOSIT: DepositId = DepositId::new(1);

#[tokio::test]
async fn fresh_deposit_gets_fallback_mint() {
    let h = harness().build();
    h.ledger.insert_deposit(funded_deposit(1));

    let outcomes = h.agent.process_assigned().await.unwrap();

    assert_eq!(outcomes.len(), 1);
    let outcome = &outcomes[0];
    assert_eq!(outcome.status, OutcomeStatus::Processed);
    assert_eq!(outcome.decision_source.as_deref(), Some("fallback"));

    let decision = outcome.decision.as_ref().unwrap();
    assert_eq!(decision.action, Action::Mint);
    assert_eq!(decision.bounds(), Some((-202_200, -201_000)));
    assert_eq!(decision.confidence, 75);

    let execution = outcome.execution.as_ref().unwrap();
    assert!(execution.new_position_id.is_some());
    assert_eq!(h.ledger.mints().len(), 1);
    assert_eq!(h.ledger.mints()[0].range.lower(), -202_200);
}

#[tokio::test]
async fn drift_triggers_rebalance_on_next_pass() {
    let h = harness().build();
    h.ledger.insert_deposit(funded_deposit(1));

    let first = h.agent.process_deposit(DEPOSIT).await;
    let first_position = first.execution.unwrap().new_position_id.unwrap();

    h.ledger.set_tick(-195_000);
    let second = h.agent.process_deposit(DEPOSIT).await;

    assert_eq!(second.status, OutcomeStatus::Processed);
    let decision = second.decision.unwrap();
    assert_eq!(decision.action, Action::Rebalance);
    assert_eq!(decision.confidence, 70);
    assert_eq!(h.ledger.closes().len(), 1);
    assert_eq!(h.ledger.closes()[0].position_id, first_position);
    assert_eq!(h.ledger.mints().len(), 2);

    let new_position = second.execution.unwrap().new_position_id.unwrap();
    assert_ne!(new_position, first_position);
    assert_eq!(h.ledger.open_position_count(), 1);
}

#[tokio::test]
async fn position_inside_threshold_is_held() {
    let h = harness().build();
    h.ledger.insert_deposit(funded_deposit(1));
    h.agent.process_deposit(DEPOSIT).await;

    h.ledger.set_tick(-201_500);
    let outcome = h.agent.process_deposit(DEPOSIT).await;

    assert_eq!(outcome.decision.unwrap().action, Action::Hold);
    assert!(outcome.execution.unwrap().is_no_op());
    assert_eq!(h.ledger.mints().len(), 1);
    assert!(h.ledger.closes().is_empty());
}

#[tokio::test]
async fn inactive_and_foreign_deposits_are_skipped() {
    let h = harness().build();
    let mut completed = funded_deposit(1);
    completed.status = DepositStatus::Completed;
    let mut foreign = funded_deposit(2);
    foreign.assigned_agent = Some(AgentId::new(9));
    let mut unassigned = funded_deposit(3);
    unassigned.assigned_agent = None;
    h.ledger.insert_deposit(completed);
    h.ledger.insert_deposit(foreign);
    h.ledger.insert_deposit(unassigned);

    assert!(h.agent.process_assigned().await.unwrap().is_empty());

    for id in 1..=3 {
        let outcome = h.agent.process_deposit(DepositId::new(id)).await;
        assert_eq!(outcome.status, OutcomeStatus::Skipped, "deposit {id}");
    }
    assert!(h.ledger.mints().is_empty());
}

#[tokio::test]
async fn deposit_in_flight_is_not_processed_twice() {
    let h = harness().build();
    h.ledger.insert_deposit(funded_deposit(1));

    let guard = h.agent.session().try_begin(DEPOSIT);
    assert!(guard.is_some());

    let outcome = h.agent.process_deposit(DEPOSIT).await;
    assert_eq!(outcome.status, OutcomeStatus::Skipped);
    assert!(outcome.message.contains("already being processed"));
    assert!(h.ledger.mints().is_empty());

    drop(guard);
    let outcome = h.agent.process_deposit(DEPOSIT).await;
    assert_eq!(outcome.status, OutcomeStatus::Processed);
    assert!(!h.agent.session().is_in_flight(DEPOSIT));
}

#[tokio::test]
async fn dry_run_decides_without_submitting() {
    let h = harness().dry_run().with_validation().build();
    h.ledger.insert_deposit(funded_deposit(1));

    let outcome = h.agent.process_deposit(DEPOSIT).await;

    assert_eq!(outcome.status, OutcomeStatus::Processed);
    assert!(outcome.message.starts_with("dry run"));
    assert_eq!(outcome.decision.unwrap().action, Action::Mint);
    assert!(outcome.execution.is_none());
    assert!(h.ledger.mints().is_empty());
    assert!(h.registry.requests().is_empty());
}

#[tokio::test]
async fn validation_wraps_execution() {
    let h = harness().with_validation().build();
    h.ledger.insert_deposit(funded_deposit(1));

    let outcome = h.agent.process_deposit(DEPOSIT).await;

    let hash = outcome.validation_hash.unwrap();
    assert_eq!(h.registry.requests(), vec![hash]);
    assert_eq!(h.registry.responses(), vec![(hash, 75)]);
    assert_eq!(
        h.agent.validation().status(hash).await.unwrap(),
        ValidationStatus::Responded { score: Some(75) }
    );

    let reputation = h.agent.validation().reputation(AGENT_ID).await.unwrap();
    assert_eq!(reputation.total_validations, 1);
    assert_eq!(reputation.responded_validations, 1);
}

#[tokio::test]
async fn hold_is_not_validated() {
    let h = harness().with_validation().build();
    h.ledger.insert_deposit(funded_deposit(1));
    h.agent.process_deposit(DEPOSIT).await;

    h.ledger.set_tick(-201_500);
    let outcome = h.agent.process_deposit(DEPOSIT).await;

    assert_eq!(outcome.decision.unwrap().action, Action::Hold);
    assert!(outcome.validation_hash.is_none());
    assert_eq!(h.registry.requests().len(), 1);
    assert_eq!(h.registry.responses().len(), 1);
}

#[tokio::test]
async fn restart_with_untracked_position_skips_the_deposit() {
    let h = harness().build();
    h.ledger.insert_deposit(funded_deposit(1));
    let first = h.agent.process_deposit(DEPOSIT).await;
    let position = first.execution.unwrap().new_position_id.unwrap();

    let restarted = h.restarted();
    let outcome = restarted.process_deposit(DEPOSIT).await;

    assert_eq!(outcome.status, OutcomeStatus::Skipped);
    assert!(outcome.message.contains(&format!("#{position}")));
    assert!(outcome.decision.is_none());
    assert_eq!(h.ledger.mints().len(), 1);
    assert_eq!(h.ledger.open_position_count(), 1);
}

#[tokio::test]
async fn validation_failure_does_not_block_execution() {
    let h = harness().with_validation().build();
    h.ledger.insert_deposit(funded_deposit(1));
    h.registry.set_fail_writes(true);

    let outcome = h.agent.process_deposit(DEPOSIT).await;

    assert_eq!(outcome.status, OutcomeStatus::Processed);
    assert!(outcome.validation_hash.is_none());
    assert_eq!(h.ledger.mints().len(), 1);
}

#[tokio::test]
async fn failed_execution_leaves_validation_pending() {
    let h = harness().with_validation().build();
    h.ledger.insert_deposit(funded_deposit(1));
    h.ledger.fail_next_mint("execution reverted");

    let outcome = h.agent.process_deposit(DEPOSIT).await;

    assert_eq!(outcome.status, OutcomeStatus::Error);
    assert_eq!(outcome.decision.unwrap().action, Action::Mint);
    let hash = outcome.validation_hash.unwrap();
    assert!(h.registry.responses().is_empty());
    assert_eq!(
        h.agent.validation().status(hash).await.unwrap(),
        ValidationStatus::Pending
    );
}

#[tokio::test]
async fn advisor_decision_is_normalized_and_executed() {
    let advisor = Arc::new(ScriptedAdvisor::new(vec![Decision {
        action: Action::Mint,
        tick_lower: Some(-202_230),
        tick_upper: Some(-200_990),
        reason: "wider range".to_string(),
        confidence: 88,
    }]));
    let h = harness().advisor(advisor.clone()).build();
    h.ledger.insert_deposit(funded_deposit(1));

    let outcome = h.agent.process_deposit(DEPOSIT).await;

    assert_eq!(advisor.calls(), 1);
    assert_eq!(outcome.decision_source.as_deref(), Some("scripted"));
    let decision = outcome.decision.unwrap();
    assert_eq!(decision.bounds(), Some((-202_260, -201_000)));
    assert_eq!(decision.confidence, 88);
    assert_eq!(
        h.ledger.mints()[0].range,
        TickRange::new(-202_260, -201_000, 60).unwrap()
    );
}

#[tokio::test]
async fn failing_advisor_falls_back() {
    let h = harness().advisor(Arc::new(ScriptedAdvisor::failing())).build();
    h.ledger.insert_deposit(funded_deposit(1));

    let outcome = h.agent.process_deposit(DEPOSIT).await;

    assert_eq!(outcome.status, OutcomeStatus::Processed);
    assert_eq!(outcome.decision_source.as_deref(), Some("fallback"));
    assert_eq!(outcome.decision.unwrap().confidence, 75);
}

#[tokio::test]
async fn unregistered_agent_cannot_process() {
    let h = harness().unregistered().build();
    h.ledger.insert_deposit(funded_deposit(1));

    assert!(h.agent.process_assigned().await.is_err());

    let outcome = h.agent.process_deposit(DEPOSIT).await;
    assert_eq!(outcome.status, OutcomeStatus::Error);
    assert!(outcome.message.contains("not registered"));
}

#[tokio::test]
async fn read_failure_is_reported_per_deposit() {
    let h = harness().build();
    h.ledger.insert_deposit(funded_deposit(1));
    h.ledger.set_fail_reads(true);

    let outcome = h.agent.process_deposit(DEPOSIT).await;
    assert_eq!(outcome.status, OutcomeStatus::Error);
    assert!(outcome.decision.is_none());
}

#[tokio::test]
async fn close_all_positions_empties_the_deposit() {
    let h = harness().build();
    h.ledger.insert_deposit(funded_deposit(1));
    h.agent.process_deposit(DEPOSIT).await;
    assert_eq!(h.ledger.open_position_count(), 1);

    let outcome = h.agent.close_all_positions(DEPOSIT).await;

    assert_eq!(outcome.status, OutcomeStatus::Processed);
    assert_eq!(outcome.execution.unwrap().action, Action::Close);
    assert_eq!(h.ledger.open_position_count(), 0);
    assert!(h.agent.session().bounds().is_empty());

    let deposit = h.ledger.deposit_snapshot(DEPOSIT).unwrap();
    assert!(deposit.open_position_ids.is_empty());
    assert!(deposit.remaining_amount0 > U256::ZERO);
}

#[tokio::test]
async fn reconcile_processes_new_assignments() {
    let h = harness().build();
    h.ledger.insert_deposit(funded_deposit(1));
    h.ledger.set_block_number(500);
    h.ledger.push_deposit_created(DepositCreated {
        deposit_id: DEPOSIT,
        owner: Address::repeat_byte(0xD0),
        amount0: U256::from(1u64),
        amount1: U256::from(2u64),
        strategy: None,
        block_number: Some(440),
    });
    h.ledger.push_agent_assigned(AgentAssigned {
        deposit_id: DEPOSIT,
        agent_id: AGENT_ID,
        block_number: Some(450),
    });

    let outcomes = h.agent.reconcile().await.unwrap();

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].deposit_id, DEPOSIT);
    assert_eq!(h.ledger.mints().len(), 1);
    assert_eq!(h.ledger.event_queries(), vec![(401, 500)]);

    // Nothing new until the head moves.
    assert!(h.agent.reconcile().await.unwrap().is_empty());
}

#[tokio::test]
async fn status_reports_tracked_positions_and_notifications() {
    let h = harness().build();
    h.ledger.insert_deposit(funded_deposit(1));
    h.ledger.set_block_number(10);
    h.ledger.push_deposit_created(DepositCreated {
        deposit_id: DEPOSIT,
        owner: Address::repeat_byte(0xD0),
        amount0: U256::from(1u64),
        amount1: U256::ZERO,
        strategy: None,
        block_number: Some(5),
    });
    h.agent.reconcile().await.unwrap();
    h.agent.process_deposit(DEPOSIT).await;

    let status = h.agent.status().await.unwrap();

    assert_eq!(status.identity.id, AGENT_ID);
    assert_eq!(status.watermark, Some(10));
    assert_eq!(status.tracked_positions.len(), 1);
    assert_eq!(status.tracked_positions[0].tick_lower, -202_200);
    assert_eq!(status.recent_deposits.len(), 1);
    assert_eq!(status.pending_validations, 0);
    assert_eq!(status.reputation.unwrap().reputation_score, 50);
    assert!(!status.dry_run);
}
