//! Agent facade: the operations exposed to external drivers.
//!
//! Batch and single-deposit operations never propagate per-deposit errors;
//! they return a [`ProcessOutcome`] carrying a status and a message.

use std::fmt;

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{
    AgentIdentity, AgentReputation, Decision, DepositId, ExecutionResult, PositionId, Strategy,
};
use crate::error::Result;

/// Coarse result of processing one deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    /// A decision was made (and executed unless dry-run).
    Processed,
    /// Nothing was attempted.
    Skipped,
    /// A read or write failed.
    Error,
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Processed => "processed",
            Self::Skipped => "skipped",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

/// Structured result of processing one deposit.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessOutcome {
    /// Deposit processed.
    pub deposit_id: DepositId,
    /// Coarse status.
    pub status: OutcomeStatus,
    /// Human-readable summary.
    pub message: String,
    /// Decision taken, if the pass got that far.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<Decision>,
    /// Name of the decision source (advisor name or `fallback`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision_source: Option<String>,
    /// What execution submitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution: Option<ExecutionResult>,
    /// Correlation hash of the validation request, if one was opened.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_hash: Option<B256>,
}

impl ProcessOutcome {
    /// Outcome for a deposit that was not acted on.
    #[must_use]
    pub fn skipped(deposit_id: DepositId, message: impl Into<String>) -> Self {
        Self::bare(deposit_id, OutcomeStatus::Skipped, message)
    }

    /// Outcome for a deposit whose pass failed.
    #[must_use]
    pub fn error(deposit_id: DepositId, message: impl Into<String>) -> Self {
        Self::bare(deposit_id, OutcomeStatus::Error, message)
    }

    /// Outcome for a deposit that was processed.
    #[must_use]
    pub fn processed(deposit_id: DepositId, message: impl Into<String>) -> Self {
        Self::bare(deposit_id, OutcomeStatus::Processed, message)
    }

    fn bare(deposit_id: DepositId, status: OutcomeStatus, message: impl Into<String>) -> Self {
        Self {
            deposit_id,
            status,
            message: message.into(),
            decision: None,
            decision_source: None,
            execution: None,
            validation_hash: None,
        }
    }
}

/// A newly created deposit seen by the reconciliation loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositNotification {
    /// New deposit.
    pub deposit_id: DepositId,
    /// Depositor.
    pub owner: Address,
    /// Token0 deposited.
    pub amount0: U256,
    /// Token1 deposited.
    pub amount1: U256,
    /// Chosen strategy, if known.
    pub strategy: Option<Strategy>,
    /// Block of the creation event.
    pub block_number: Option<u64>,
    /// When the agent saw the event.
    pub received_at: DateTime<Utc>,
}

/// Bounds the agent holds for an open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedPosition {
    /// Position id.
    pub position_id: PositionId,
    /// Lower tick.
    pub tick_lower: i32,
    /// Upper tick.
    pub tick_upper: i32,
}

/// Snapshot of the agent's own state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentStatus {
    /// Resolved identity.
    pub identity: AgentIdentity,
    /// Last block scanned by the reconciliation loop.
    pub watermark: Option<u64>,
    /// Positions in the bounds cache.
    pub tracked_positions: Vec<TrackedPosition>,
    /// Validation requests awaiting a response.
    pub pending_validations: usize,
    /// Most recent deposit notifications, newest first.
    pub recent_deposits: Vec<DepositNotification>,
    /// Reputation, if it could be computed.
    pub reputation: Option<AgentReputation>,
    /// Whether writes are suppressed.
    pub dry_run: bool,
}

/// Operations a driver may invoke on the agent.
#[async_trait]
pub trait AgentFacade: Send + Sync {
    /// Process every active deposit assigned to this agent.
    ///
    /// # Errors
    ///
    /// Fails only if the agent's identity or the deposit count cannot be
    /// read; per-deposit failures are reported in the outcomes.
    async fn process_assigned(&self) -> Result<Vec<ProcessOutcome>>;

    /// Process a single deposit.
    async fn process_deposit(&self, deposit_id: DepositId) -> ProcessOutcome;

    /// Close every open position of a deposit.
    async fn close_all_positions(&self, deposit_id: DepositId) -> ProcessOutcome;

    /// Report the agent's state.
    ///
    /// # Errors
    ///
    /// Fails if the agent's identity cannot be resolved.
    async fn status(&self) -> Result<AgentStatus>;
}
