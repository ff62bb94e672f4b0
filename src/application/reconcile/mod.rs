//! Block-height reconciliation.
//!
//! Scans vault events between the watermark and the chain head. New deposits
//! go into the notification buffer; assignments naming this agent are
//! returned so the caller can process them right away. The watermark always
//! advances to the scanned head, even when an event query fails.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::application::session::AgentSession;
use crate::domain::{AgentId, DepositId};
use crate::error::Result;
use crate::port::inbound::agent::DepositNotification;
use crate::port::outbound::ledger::Ledger;

/// Blocks scanned behind the head on the first pass.
pub const DEFAULT_LOOKBACK_BLOCKS: u64 = 100;

/// What one reconciliation pass found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    /// First block scanned.
    pub from_block: u64,
    /// Last block scanned (new watermark).
    pub to_block: u64,
    /// Deposit-created events seen.
    pub new_deposits: usize,
    /// Deposits newly assigned to this agent, in event order, without repeats.
    pub assigned: Vec<DepositId>,
}

/// Maintains the watermark and scans event windows.
pub struct Reconciler {
    ledger: Arc<dyn Ledger>,
    session: Arc<AgentSession>,
    lookback_blocks: u64,
}

impl Reconciler {
    pub fn new(ledger: Arc<dyn Ledger>, session: Arc<AgentSession>) -> Self {
        Self {
            ledger,
            session,
            lookback_blocks: DEFAULT_LOOKBACK_BLOCKS,
        }
    }

    /// Override the initial lookback.
    #[must_use]
    pub const fn with_lookback_blocks(mut self, blocks: u64) -> Self {
        self.lookback_blocks = blocks;
        self
    }

    /// Scan everything after the watermark for `agent`.
    ///
    /// Returns `None` when the head has not moved past the watermark.
    ///
    /// # Errors
    ///
    /// Fails only if the chain head cannot be read; the watermark is then
    /// unchanged.
    pub async fn poll(&self, agent: AgentId) -> Result<Option<ReconcileReport>> {
        let head = self.ledger.block_number().await?;

        let watermark = match self.session.watermark() {
            Some(watermark) => watermark,
            None => {
                let initial = head.saturating_sub(self.lookback_blocks);
                debug!(head, watermark = initial, "Initializing watermark");
                self.session.set_watermark(initial);
                initial
            }
        };

        if head <= watermark {
            return Ok(None);
        }

        let from_block = watermark + 1;
        let new_deposits = self.scan_created(from_block, head).await;
        let assigned = self.scan_assigned(agent, from_block, head).await;

        self.session.set_watermark(head);

        if new_deposits > 0 || !assigned.is_empty() {
            info!(
                from_block,
                to_block = head,
                new_deposits,
                assigned = assigned.len(),
                "Reconciled vault events"
            );
        }

        Ok(Some(ReconcileReport {
            from_block,
            to_block: head,
            new_deposits,
            assigned,
        }))
    }

    async fn scan_created(&self, from: u64, to: u64) -> usize {
        let events = match self.ledger.deposit_created_events(from, to).await {
            Ok(events) => events,
            Err(e) => {
                warn!(from, to, error = %e, "Failed to query deposit events");
                return 0;
            }
        };

        let received_at = Utc::now();
        let mut buffer = self.session.notifications_mut();
        for event in &events {
            buffer.push(DepositNotification {
                deposit_id: event.deposit_id,
                owner: event.owner,
                amount0: event.amount0,
                amount1: event.amount1,
                strategy: event.strategy,
                block_number: event.block_number,
                received_at,
            });
        }
        events.len()
    }

    async fn scan_assigned(&self, agent: AgentId, from: u64, to: u64) -> Vec<DepositId> {
        let events = match self.ledger.agent_assigned_events(from, to).await {
            Ok(events) => events,
            Err(e) => {
                warn!(from, to, error = %e, "Failed to query assignment events");
                return Vec::new();
            }
        };

        let mut assigned = Vec::new();
        for event in events.into_iter().filter(|e| e.agent_id == agent) {
            if !assigned.contains(&event.deposit_id) {
                assigned.push(event.deposit_id);
            }
        }
        assigned
    }
}
