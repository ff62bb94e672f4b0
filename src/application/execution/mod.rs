//! Execution coordinator.
//!
//! Turns decisions into vault operations and keeps the position bounds cache
//! in step with confirmed mints and closes. Every write waits for
//! confirmation before the next step runs.

use std::sync::Arc;

use alloy_primitives::{TxHash, U256};
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::application::session::AgentSession;
use crate::domain::liquidity::{amounts_for_liquidity, apply_safety_margin, liquidity_for_amounts};
use crate::domain::tick_math::tick_to_sqrt_price;
use crate::domain::{
    Action, ActivePosition, CloseResult, Decision, Deposit, DepositId, ExecutionResult, MintResult,
    PoolKey, PositionId, RebalanceResult, TickRange,
};
use crate::error::{ExecutionError, Result};
use crate::port::outbound::ledger::{CloseRequest, Ledger, MintRequest};

/// Default validity window for submitted operations.
pub const DEFAULT_DEADLINE_SECS: u64 = 300;

/// Open positions of a deposit as this agent knows them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionView {
    /// Positions with known bounds.
    pub positions: Vec<ActivePosition>,
    /// Open positions whose bounds neither the cache nor the vault can supply.
    pub untracked: Vec<PositionId>,
}

impl PositionView {
    /// `true` when every open position has known bounds.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.untracked.is_empty()
    }
}

/// Sequences mint and close operations for one pool.
pub struct ExecutionCoordinator {
    ledger: Arc<dyn Ledger>,
    session: Arc<AgentSession>,
    pool_key: PoolKey,
    deadline_secs: u64,
}

impl ExecutionCoordinator {
    /// Create a coordinator for `pool_key`.
    #[must_use]
    pub fn new(ledger: Arc<dyn Ledger>, session: Arc<AgentSession>, pool_key: PoolKey) -> Self {
        Self {
            ledger,
            session,
            pool_key,
            deadline_secs: DEFAULT_DEADLINE_SECS,
        }
    }

    /// Override the operation deadline.
    #[must_use]
    pub const fn with_deadline_secs(mut self, secs: u64) -> Self {
        self.deadline_secs = secs;
        self
    }

    /// Pool this coordinator trades.
    #[must_use]
    pub const fn pool_key(&self) -> &PoolKey {
        &self.pool_key
    }

    fn deadline(&self) -> u64 {
        let now = u64::try_from(Utc::now().timestamp()).unwrap_or(0);
        now.saturating_add(self.deadline_secs)
    }

    fn range_of(&self, decision: &Decision) -> Result<TickRange> {
        let (lower, upper) = decision.bounds().ok_or(ExecutionError::MissingRange {
            action: decision.action,
        })?;
        Ok(TickRange::normalized(lower, upper, self.pool_key.tick_spacing)?)
    }

    /// Open a position for `deposit_id` over `range`.
    ///
    /// Liquidity is computed from the maximum amounts at the current pool
    /// price and scaled down by the safety margin. Returns `None` without
    /// submitting anything when that liquidity is zero.
    ///
    /// # Errors
    ///
    /// Fails on a pool read error, a math error, or a failed submission.
    pub async fn mint(
        &self,
        deposit_id: DepositId,
        range: TickRange,
        amount0_max: U256,
        amount1_max: U256,
    ) -> Result<Option<MintResult>> {
        let pool = self.ledger.pool_state(&self.pool_key).await?;
        let sqrt_lower = tick_to_sqrt_price(range.lower())?;
        let sqrt_upper = tick_to_sqrt_price(range.upper())?;

        let theoretical = liquidity_for_amounts(
            pool.sqrt_price_x96,
            sqrt_lower,
            sqrt_upper,
            amount0_max,
            amount1_max,
        )?;
        let liquidity = apply_safety_margin(theoretical);
        if liquidity == 0 {
            info!(deposit_id = %deposit_id, range = %range, "Liquidity rounds to zero, skipping mint");
            return Ok(None);
        }

        let (amount0, amount1) =
            amounts_for_liquidity(pool.sqrt_price_x96, sqrt_lower, sqrt_upper, liquidity)?;

        let request = MintRequest {
            deposit_id,
            range,
            liquidity,
            amount0_max,
            amount1_max,
            deadline: self.deadline(),
        };
        let receipt = self.ledger.mint_position(&request).await?;

        self.session
            .bounds_mut()
            .insert(receipt.position_id, range.into());

        info!(
            deposit_id = %deposit_id,
            position_id = %receipt.position_id,
            tx_hash = %receipt.tx_hash,
            liquidity,
            "Position minted"
        );

        Ok(Some(MintResult {
            position_id: receipt.position_id,
            tx_hash: receipt.tx_hash,
            liquidity,
            amount0,
            amount1,
            tick_lower: range.lower(),
            tick_upper: range.upper(),
        }))
    }

    /// Close one position.
    ///
    /// Minimum outputs are zero: no slippage protection is applied here.
    ///
    /// # Errors
    ///
    /// Fails if the submission or confirmation fails. The cache entry is kept
    /// in that case.
    pub async fn close(&self, deposit_id: DepositId, position_id: PositionId) -> Result<CloseResult> {
        let request = CloseRequest {
            deposit_id,
            position_id,
            amount0_min: U256::ZERO,
            amount1_min: U256::ZERO,
            deadline: self.deadline(),
        };
        let tx_hash = self.ledger.close_position(&request).await?;

        self.session.bounds_mut().remove(position_id);
        info!(
            deposit_id = %deposit_id,
            position_id = %position_id,
            tx_hash = %tx_hash,
            "Position closed"
        );

        Ok(CloseResult {
            position_id,
            tx_hash,
        })
    }

    async fn close_all(&self, deposit: &Deposit) -> Result<Vec<TxHash>> {
        let mut hashes = Vec::with_capacity(deposit.open_position_ids.len());
        // Sequential: each close settles before the next is submitted.
        for &position_id in &deposit.open_position_ids {
            let closed = self.close(deposit.id, position_id).await?;
            hashes.push(closed.tx_hash);
        }
        Ok(hashes)
    }

    /// Close every open position, then re-mint the released balance at `range`.
    ///
    /// The deposit is re-read after all closes confirm. If both balances are
    /// zero at that point no mint is attempted.
    ///
    /// # Errors
    ///
    /// Fails on the first failed read or write. Positions closed before the
    /// failure stay closed.
    pub async fn rebalance(&self, deposit_id: DepositId, range: TickRange) -> Result<RebalanceResult> {
        let deposit = self.ledger.deposit(deposit_id).await?;
        let close_tx_hashes = self.close_all(&deposit).await?;

        let deposit = self.ledger.deposit(deposit_id).await?;
        if !deposit.has_balance() {
            info!(
                deposit_id = %deposit_id,
                closed = close_tx_hashes.len(),
                "Nothing left to re-mint after closing"
            );
            return Ok(RebalanceResult {
                close_tx_hashes,
                mint_result: None,
                new_position_id: None,
            });
        }

        let mint_result = self
            .mint(
                deposit_id,
                range,
                deposit.remaining_amount0,
                deposit.remaining_amount1,
            )
            .await?;
        let new_position_id = mint_result.as_ref().map(|m| m.position_id);

        Ok(RebalanceResult {
            close_tx_hashes,
            mint_result,
            new_position_id,
        })
    }

    /// Carry out `decision` for a deposit.
    ///
    /// # Errors
    ///
    /// Fails if a MINT or REBALANCE carries no usable range, or on any read or
    /// write failure.
    pub async fn execute_decision(
        &self,
        deposit_id: DepositId,
        decision: &Decision,
    ) -> Result<ExecutionResult> {
        debug!(deposit_id = %deposit_id, %decision, "Executing decision");

        match decision.action {
            Action::Hold => {
                info!(deposit_id = %deposit_id, reason = %decision.reason, "Holding");
                Ok(ExecutionResult::no_op(Action::Hold, decision.reason.clone()))
            }
            Action::Mint => {
                let range = self.range_of(decision)?;
                let deposit = self.ledger.deposit(deposit_id).await?;
                if !deposit.has_balance() {
                    return Ok(ExecutionResult::no_op(Action::Mint, "no remaining balance"));
                }
                let minted = self
                    .mint(
                        deposit_id,
                        range,
                        deposit.remaining_amount0,
                        deposit.remaining_amount1,
                    )
                    .await?;
                Ok(ExecutionResult::from_mint(Action::Mint, minted))
            }
            Action::Close => {
                let deposit = self.ledger.deposit(deposit_id).await?;
                if deposit.open_position_ids.is_empty() {
                    return Ok(ExecutionResult::no_op(Action::Close, "no open positions"));
                }
                let tx_hashes = self.close_all(&deposit).await?;
                Ok(ExecutionResult {
                    action: Action::Close,
                    tx_hashes,
                    new_position_id: None,
                    tick_lower: None,
                    tick_upper: None,
                    note: None,
                })
            }
            Action::Rebalance => {
                let range = self.range_of(decision)?;
                Ok(self.rebalance(deposit_id, range).await?.into())
            }
        }
    }

    /// Open positions of `deposit` with authoritative bounds.
    ///
    /// Bounds come from the cache. The vault's own bounds are used only when
    /// the cache has no entry and they form a valid range; positions with
    /// neither are reported as untracked (after a restart, for example).
    ///
    /// # Errors
    ///
    /// Fails if a position cannot be read.
    pub async fn active_positions(&self, deposit: &Deposit) -> Result<PositionView> {
        let mut view = PositionView {
            positions: Vec::with_capacity(deposit.open_position_ids.len()),
            untracked: Vec::new(),
        };

        for &id in &deposit.open_position_ids {
            let onchain = self.ledger.position(id).await?;
            let cached = self.session.bounds().get(id);

            let (tick_lower, tick_upper) = match cached {
                Some(bounds) => (bounds.tick_lower, bounds.tick_upper),
                None if onchain.tick_lower < onchain.tick_upper => {
                    (onchain.tick_lower, onchain.tick_upper)
                }
                None => {
                    warn!(deposit_id = %deposit.id, position_id = %id, "Open position has no known bounds");
                    view.untracked.push(id);
                    continue;
                }
            };

            view.positions.push(ActivePosition {
                id,
                tick_lower,
                tick_upper,
                liquidity: onchain.liquidity,
            });
        }

        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::domain::{active_deposit, pool_key, snapshot_at};
    use crate::testkit::ledger::MockLedger;

    fn coordinator(ledger: &Arc<MockLedger>) -> (ExecutionCoordinator, Arc<AgentSession>) {
        let session = Arc::new(AgentSession::default());
        let coordinator = ExecutionCoordinator::new(ledger.clone(), session.clone(), pool_key());
        (coordinator, session)
    }

    #[tokio::test]
    async fn mint_caches_bounds() {
        let ledger = Arc::new(MockLedger::new(snapshot_at(-201_600)));
        ledger.insert_deposit(active_deposit(1, 10u64.pow(18), 3_000_000_000));
        let (coordinator, session) = coordinator(&ledger);

        let range = TickRange::new(-202_200, -201_000, 60).unwrap();
        let minted = coordinator
            .mint(
                DepositId::new(1),
                range,
                U256::from(10u64.pow(18)),
                U256::from(3_000_000_000u64),
            )
            .await
            .unwrap()
            .unwrap();

        assert!(minted.liquidity > 0);
        let cached = session.bounds().get(minted.position_id).unwrap();
        assert_eq!(cached.tick_lower, -202_200);
        assert_eq!(cached.tick_upper, -201_000);
        assert_eq!(ledger.mints().len(), 1);
    }

    #[tokio::test]
    async fn zero_liquidity_submits_nothing() {
        let ledger = Arc::new(MockLedger::new(snapshot_at(-201_600)));
        let (coordinator, session) = coordinator(&ledger);

        let range = TickRange::new(-202_200, -201_000, 60).unwrap();
        let minted = coordinator
            .mint(DepositId::new(1), range, U256::ZERO, U256::ZERO)
            .await
            .unwrap();

        assert!(minted.is_none());
        assert!(ledger.mints().is_empty());
        assert!(session.bounds().is_empty());
    }

    #[tokio::test]
    async fn close_uses_zero_minimums_and_clears_cache() {
        let ledger = Arc::new(MockLedger::new(snapshot_at(-201_600)));
        ledger.insert_deposit(active_deposit(1, 10u64.pow(18), 3_000_000_000));
        let (coordinator, session) = coordinator(&ledger);

        let decision = Decision::with_range(
            Action::Mint,
            TickRange::new(-202_200, -201_000, 60).unwrap(),
            "open",
            75,
        );
        let minted = coordinator
            .execute_decision(DepositId::new(1), &decision)
            .await
            .unwrap();
        let position_id = minted.new_position_id.unwrap();

        coordinator.close(DepositId::new(1), position_id).await.unwrap();

        let close = &ledger.closes()[0];
        assert_eq!(close.amount0_min, U256::ZERO);
        assert_eq!(close.amount1_min, U256::ZERO);
        assert!(!session.bounds().contains(position_id));
    }

    #[tokio::test]
    async fn active_positions_prefer_cached_bounds() {
        let ledger = Arc::new(MockLedger::new(snapshot_at(-201_600)));
        ledger.insert_deposit(active_deposit(1, 10u64.pow(18), 3_000_000_000));
        let (coordinator, _session) = coordinator(&ledger);

        let decision = Decision::with_range(
            Action::Mint,
            TickRange::new(-202_200, -201_000, 60).unwrap(),
            "open",
            75,
        );
        coordinator
            .execute_decision(DepositId::new(1), &decision)
            .await
            .unwrap();

        // The mock reports zero bounds for positions, like the vault does.
        let deposit = ledger.deposit_snapshot(DepositId::new(1)).unwrap();
        let view = coordinator.active_positions(&deposit).await.unwrap();
        assert!(view.is_complete());
        assert_eq!(view.positions.len(), 1);
        assert_eq!(view.positions[0].tick_lower, -202_200);
        assert_eq!(view.positions[0].tick_upper, -201_000);
    }

    #[tokio::test]
    async fn positions_minted_before_a_restart_are_untracked() {
        let ledger = Arc::new(MockLedger::new(snapshot_at(-201_600)));
        ledger.insert_deposit(active_deposit(1, 10u64.pow(18), 3_000_000_000));
        let (before, _) = coordinator(&ledger);
        let range = TickRange::new(-202_200, -201_000, 60).unwrap();
        let minted = before
            .mint(
                DepositId::new(1),
                range,
                U256::from(10u64.pow(18)),
                U256::from(3_000_000_000u64),
            )
            .await
            .unwrap()
            .unwrap();
        let position_id = minted.position_id;

        let (after, _) = coordinator(&ledger);
        let deposit = ledger.deposit_snapshot(DepositId::new(1)).unwrap();
        let view = after.active_positions(&deposit).await.unwrap();

        assert!(!view.is_complete());
        assert!(view.positions.is_empty());
        assert_eq!(view.untracked, vec![position_id]);
    }

    #[tokio::test]
    async fn hold_is_a_no_op() {
        let ledger = Arc::new(MockLedger::new(snapshot_at(-201_600)));
        let (coordinator, _session) = coordinator(&ledger);

        let result = coordinator
            .execute_decision(DepositId::new(1), &Decision::hold("steady", 60))
            .await
            .unwrap();
        assert!(result.is_no_op());
        assert_eq!(result.action, Action::Hold);
        assert_eq!(result.note.as_deref(), Some("steady"));
    }
}
