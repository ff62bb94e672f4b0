//! Per-deposit processing pipeline and the agent facade.
//!
//! One pass over a deposit reads pool, deposit and position state, asks the
//! decision engine, optionally opens a validation record, executes, and
//! closes the validation record with a score. Passes for the same deposit
//! never overlap.

use std::sync::Arc;

use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::application::decision::{DecisionEngine, EngineDecision};
use crate::application::execution::{ExecutionCoordinator, DEFAULT_DEADLINE_SECS};
use crate::application::reconcile::{Reconciler, DEFAULT_LOOKBACK_BLOCKS};
use crate::application::session::AgentSession;
use crate::application::validation::{DecisionPayload, ValidationTracker};
use crate::domain::{
    Action, AgentId, AgentIdentity, Decision, Deposit, DepositId, ExecutionResult, PoolAnalysis, PoolKey,
};
use crate::error::{ExecutionError, Result};
use crate::port::inbound::agent::{
    AgentFacade, AgentStatus, OutcomeStatus, ProcessOutcome, TrackedPosition,
};
use crate::port::outbound::ledger::Ledger;
use crate::port::outbound::registry::AgentRegistry;

/// Static settings of a running agent.
#[derive(Debug, Clone)]
pub struct AgentSettings {
    /// Signing address; the agent's identity is resolved from it.
    pub address: Address,
    /// Pool the agent manages.
    pub pool_key: PoolKey,
    /// Token0 decimals, for display prices.
    pub decimals0: u8,
    /// Token1 decimals, for display prices.
    pub decimals1: u8,
    /// Validator to request attestations from; `None` disables validation.
    pub validator: Option<AgentId>,
    /// Compute and log decisions without submitting anything.
    pub dry_run: bool,
    /// Validity window of submitted operations.
    pub deadline_secs: u64,
    /// Initial reconciliation lookback.
    pub lookback_blocks: u64,
}

impl AgentSettings {
    /// Settings with defaults for everything but the address and pool.
    #[must_use]
    pub const fn new(address: Address, pool_key: PoolKey) -> Self {
        Self {
            address,
            pool_key,
            decimals0: 18,
            decimals1: 18,
            validator: None,
            dry_run: false,
            deadline_secs: DEFAULT_DEADLINE_SECS,
            lookback_blocks: DEFAULT_LOOKBACK_BLOCKS,
        }
    }
}

/// The liquidity-management agent.
pub struct Agent {
    ledger: Arc<dyn Ledger>,
    registry: Arc<dyn AgentRegistry>,
    session: Arc<AgentSession>,
    engine: DecisionEngine,
    executor: ExecutionCoordinator,
    validation: ValidationTracker,
    reconciler: Reconciler,
    settings: AgentSettings,
}

impl Agent {
    /// Wire an agent around its ports.
    pub fn new(
        ledger: Arc<dyn Ledger>,
        registry: Arc<dyn AgentRegistry>,
        session: Arc<AgentSession>,
        engine: DecisionEngine,
        settings: AgentSettings,
    ) -> Self {
        let executor = ExecutionCoordinator::new(ledger.clone(), session.clone(), settings.pool_key)
            .with_deadline_secs(settings.deadline_secs);
        let validation = ValidationTracker::new(registry.clone(), session.clone());
        let reconciler = Reconciler::new(ledger.clone(), session.clone())
            .with_lookback_blocks(settings.lookback_blocks);

        Self {
            ledger,
            registry,
            session,
            engine,
            executor,
            validation,
            reconciler,
            settings,
        }
    }

    /// Shared session state.
    #[must_use]
    pub fn session(&self) -> &Arc<AgentSession> {
        &self.session
    }

    /// Validation tracker.
    #[must_use]
    pub const fn validation(&self) -> &ValidationTracker {
        &self.validation
    }

    /// Execution coordinator.
    #[must_use]
    pub const fn executor(&self) -> &ExecutionCoordinator {
        &self.executor
    }

    /// Name of the decision source consulted first.
    #[must_use]
    pub fn advisor_name(&self) -> &'static str {
        self.engine.advisor_name()
    }

    /// Resolve this agent's identity, once per process.
    ///
    /// # Errors
    ///
    /// Fails if the registry cannot be read or the address is not registered.
    pub async fn identity(&self) -> Result<AgentIdentity> {
        if let Some(identity) = self.session.identity() {
            return Ok(identity);
        }

        let identity = self
            .registry
            .resolve_by_address(self.settings.address)
            .await?
            .ok_or(ExecutionError::AgentNotRegistered {
                address: self.settings.address,
            })?;

        info!(
            agent_id = %identity.id,
            domain = %identity.domain,
            address = %identity.address,
            "Agent identity resolved"
        );
        self.session.set_identity(identity.clone());
        Ok(identity)
    }

    /// Scan new vault events and immediately process deposits newly assigned
    /// to this agent.
    ///
    /// # Errors
    ///
    /// Fails if the identity or the chain head cannot be read.
    pub async fn reconcile(&self) -> Result<Vec<ProcessOutcome>> {
        let identity = self.identity().await?;
        let Some(report) = self.reconciler.poll(identity.id).await? else {
            return Ok(Vec::new());
        };

        let mut outcomes = Vec::with_capacity(report.assigned.len());
        for deposit_id in report.assigned {
            info!(deposit_id = %deposit_id, "Processing newly assigned deposit");
            outcomes.push(self.process_deposit(deposit_id).await);
        }
        Ok(outcomes)
    }

    async fn analyze_pool(&self) -> Result<PoolAnalysis> {
        let snapshot = self.ledger.pool_state(&self.settings.pool_key).await?;
        Ok(PoolAnalysis::from_snapshot(
            &snapshot,
            self.settings.pool_key.tick_spacing,
            self.settings.decimals0,
            self.settings.decimals1,
        )?)
    }

    /// Read a deposit and decide whether this agent may act on it.
    async fn actionable_deposit(
        &self,
        deposit_id: DepositId,
    ) -> Result<std::result::Result<(AgentIdentity, Deposit), ProcessOutcome>> {
        let identity = self.identity().await?;
        let deposit = self.ledger.deposit(deposit_id).await?;

        if !deposit.is_active() {
            return Ok(Err(ProcessOutcome::skipped(
                deposit_id,
                format!("deposit is {}", deposit.status),
            )));
        }
        if !deposit.is_assigned_to(identity.id) {
            return Ok(Err(ProcessOutcome::skipped(
                deposit_id,
                "deposit is not assigned to this agent",
            )));
        }
        Ok(Ok((identity, deposit)))
    }

    async fn run_deposit(&self, deposit_id: DepositId) -> Result<ProcessOutcome> {
        let (identity, deposit) = match self.actionable_deposit(deposit_id).await? {
            Ok(found) => found,
            Err(skipped) => return Ok(skipped),
        };

        let view = self.executor.active_positions(&deposit).await?;
        if !view.is_complete() {
            let ids: Vec<String> = view.untracked.iter().map(|id| format!("#{id}")).collect();
            warn!(
                deposit_id = %deposit_id,
                untracked = view.untracked.len(),
                "Open positions with unknown bounds, not deciding on a partial view"
            );
            return Ok(ProcessOutcome::skipped(
                deposit_id,
                format!("open positions with unknown bounds: {}", ids.join(", ")),
            ));
        }
        let positions = view.positions;

        let analysis = self.analyze_pool().await?;
        let EngineDecision { decision, source } = self
            .engine
            .analyze(&analysis, deposit.strategy, &positions)
            .await?;

        info!(
            deposit_id = %deposit_id,
            strategy = %deposit.strategy,
            tick = analysis.current_tick,
            positions = positions.len(),
            source = %source,
            %decision,
            "Decision made"
        );

        let mut outcome = ProcessOutcome::processed(deposit_id, decision.reason.clone());
        outcome.decision_source = Some(source.to_string());

        if self.settings.dry_run {
            outcome.message = format!("dry run: {} not submitted", decision.action);
            outcome.decision = Some(decision);
            return Ok(outcome);
        }

        // HOLD submits nothing, so there is nothing to attest.
        let validation_hash = if matches!(decision.action, Action::Hold) {
            None
        } else {
            self.open_validation(identity.id, &deposit, analysis.current_tick, &decision)
                .await
        };
        outcome.validation_hash = validation_hash;

        let execution = match self.executor.execute_decision(deposit_id, &decision).await {
            Ok(execution) => execution,
            Err(e) => {
                warn!(deposit_id = %deposit_id, action = %decision.action, error = %e, "Execution failed");
                outcome.status = OutcomeStatus::Error;
                outcome.message = e.to_string();
                outcome.decision = Some(decision);
                return Ok(outcome);
            }
        };

        if let Some(hash) = validation_hash {
            self.close_validation(hash, decision.confidence).await;
        }

        outcome.message = describe(&execution);
        outcome.decision = Some(decision);
        outcome.execution = Some(execution);
        Ok(outcome)
    }

    async fn open_validation(
        &self,
        server: AgentId,
        deposit: &Deposit,
        current_tick: i32,
        decision: &Decision,
    ) -> Option<B256> {
        let validator = self.settings.validator?;
        let payload = DecisionPayload {
            deposit_id: deposit.id,
            strategy: deposit.strategy,
            current_tick,
            decision: decision.clone(),
            timestamp: Utc::now(),
        };
        match self
            .validation
            .request_validation(validator, server, &payload)
            .await
        {
            Ok(hash) => Some(hash),
            Err(e) => {
                warn!(deposit_id = %deposit.id, error = %e, "Validation request failed, continuing");
                None
            }
        }
    }

    async fn close_validation(&self, hash: B256, score: u8) {
        if let Err(e) = self.validation.submit_response(hash, score).await {
            warn!(hash = %hash, error = %e, "Validation response failed, continuing");
        }
    }

    async fn run_close(&self, deposit_id: DepositId) -> Result<ProcessOutcome> {
        let deposit = match self.actionable_deposit(deposit_id).await? {
            Ok((_, deposit)) => deposit,
            Err(skipped) => return Ok(skipped),
        };

        let decision = Decision::close("close requested", 100);
        if self.settings.dry_run {
            let mut outcome = ProcessOutcome::skipped(
                deposit_id,
                format!("dry run: {} position(s) left open", deposit.open_position_ids.len()),
            );
            outcome.decision = Some(decision);
            return Ok(outcome);
        }

        let execution = self.executor.execute_decision(deposit_id, &decision).await?;
        let mut outcome = ProcessOutcome::processed(deposit_id, describe(&execution));
        outcome.decision = Some(decision);
        outcome.execution = Some(execution);
        Ok(outcome)
    }
}

fn describe(execution: &ExecutionResult) -> String {
    if let Some(note) = &execution.note {
        return format!("{}: {note}", execution.action);
    }
    match execution.new_position_id {
        Some(id) => format!(
            "{} confirmed in {} transaction(s), new position {id}",
            execution.action,
            execution.tx_hashes.len()
        ),
        None => format!(
            "{} confirmed in {} transaction(s)",
            execution.action,
            execution.tx_hashes.len()
        ),
    }
}

#[async_trait]
impl AgentFacade for Agent {
    async fn process_assigned(&self) -> Result<Vec<ProcessOutcome>> {
        let identity = self.identity().await?;
        let next = self.ledger.next_deposit_id().await?;
        let mut outcomes = Vec::new();

        // Deposit ids are 1-based; `next` is the id the vault will assign next.
        for raw in 1..next {
            let deposit_id = DepositId::new(raw);
            let deposit = match self.ledger.deposit(deposit_id).await {
                Ok(deposit) => deposit,
                Err(e) => {
                    warn!(deposit_id = %deposit_id, error = %e, "Failed to read deposit");
                    outcomes.push(ProcessOutcome::error(deposit_id, e.to_string()));
                    continue;
                }
            };
            if !deposit.is_active() || !deposit.is_assigned_to(identity.id) {
                continue;
            }
            outcomes.push(self.process_deposit(deposit_id).await);
        }

        debug!(processed = outcomes.len(), "Assigned deposits processed");
        Ok(outcomes)
    }

    async fn process_deposit(&self, deposit_id: DepositId) -> ProcessOutcome {
        let Some(_guard) = self.session.try_begin(deposit_id) else {
            return ProcessOutcome::skipped(deposit_id, "deposit is already being processed");
        };

        match self.run_deposit(deposit_id).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(deposit_id = %deposit_id, error = %e, "Deposit pass failed");
                ProcessOutcome::error(deposit_id, e.to_string())
            }
        }
    }

    async fn close_all_positions(&self, deposit_id: DepositId) -> ProcessOutcome {
        let Some(_guard) = self.session.try_begin(deposit_id) else {
            return ProcessOutcome::skipped(deposit_id, "deposit is already being processed");
        };

        match self.run_close(deposit_id).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(deposit_id = %deposit_id, error = %e, "Close failed");
                ProcessOutcome::error(deposit_id, e.to_string())
            }
        }
    }

    async fn status(&self) -> Result<AgentStatus> {
        let identity = self.identity().await?;

        let tracked_positions = self
            .session
            .bounds()
            .entries()
            .into_iter()
            .map(|(position_id, bounds)| TrackedPosition {
                position_id,
                tick_lower: bounds.tick_lower,
                tick_upper: bounds.tick_upper,
            })
            .collect();
        let pending_validations = self.session.validations().pending_count();
        let recent_deposits = self.session.notifications().recent();

        let reputation = match self.validation.reputation(identity.id).await {
            Ok(reputation) => Some(reputation),
            Err(e) => {
                debug!(error = %e, "Reputation unavailable");
                None
            }
        };

        Ok(AgentStatus {
            identity,
            watermark: self.session.watermark(),
            tracked_positions,
            pending_validations,
            recent_deposits,
            reputation,
            dry_run: self.settings.dry_run,
        })
    }
}
