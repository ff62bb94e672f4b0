//! In-memory vault and pool.
//!
//! Mints consume deposit balances and closes refund them, so rebalance
//! sequencing can be observed. Position reads return zero bounds, matching
//! the vault's stale read path.

use std::collections::{BTreeMap, HashMap};

use alloy_primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::tick_math::tick_to_sqrt_price;
use crate::domain::{Deposit, DepositId, PoolKey, PoolSnapshot, Position, PositionId};
use crate::error::{ChainError, Result};
use crate::port::outbound::ledger::{
    AgentAssigned, CloseRequest, DepositCreated, Ledger, MintReceipt, MintRequest,
};

#[derive(Debug, Clone)]
struct MockPosition {
    deposit_id: DepositId,
    liquidity: u128,
    amount0: U256,
    amount1: U256,
}

#[derive(Debug)]
struct State {
    pool: PoolSnapshot,
    block: u64,
    deposits: BTreeMap<DepositId, Deposit>,
    positions: HashMap<PositionId, MockPosition>,
    next_position: u64,
    next_tx: u64,
    mints: Vec<MintRequest>,
    closes: Vec<CloseRequest>,
    created: Vec<DepositCreated>,
    assigned: Vec<AgentAssigned>,
    event_queries: Vec<(u64, u64)>,
    refund_on_close: bool,
    fail_next_mint: Option<String>,
    fail_next_close: Option<String>,
    fail_reads: bool,
    fail_events: bool,
}

/// In-memory [`Ledger`].
#[derive(Debug)]
pub struct MockLedger {
    state: Mutex<State>,
}

impl MockLedger {
    /// Ledger whose pool is at `pool`, at block 0, with no deposits.
    pub fn new(pool: PoolSnapshot) -> Self {
        Self {
            state: Mutex::new(State {
                pool,
                block: 0,
                deposits: BTreeMap::new(),
                positions: HashMap::new(),
                next_position: 1,
                next_tx: 1,
                mints: Vec::new(),
                closes: Vec::new(),
                created: Vec::new(),
                assigned: Vec::new(),
                event_queries: Vec::new(),
                refund_on_close: true,
                fail_next_mint: None,
                fail_next_close: None,
                fail_reads: false,
                fail_events: false,
            }),
        }
    }

    /// Add or replace a deposit.
    pub fn insert_deposit(&self, deposit: Deposit) {
        self.state.lock().deposits.insert(deposit.id, deposit);
    }

    /// Current copy of a deposit.
    pub fn deposit_snapshot(&self, id: DepositId) -> Option<Deposit> {
        self.state.lock().deposits.get(&id).cloned()
    }

    /// Move the pool to `tick`.
    pub fn set_tick(&self, tick: i32) {
        let mut state = self.state.lock();
        state.pool.tick = tick;
        if let Ok(sqrt) = tick_to_sqrt_price(tick) {
            state.pool.sqrt_price_x96 = sqrt;
        }
    }

    /// Set the chain height.
    pub fn set_block_number(&self, block: u64) {
        self.state.lock().block = block;
    }

    /// Whether closes return the position's tokens to the deposit.
    pub fn set_refund_on_close(&self, refund: bool) {
        self.state.lock().refund_on_close = refund;
    }

    /// Make the next mint submission fail.
    pub fn fail_next_mint(&self, reason: &str) {
        self.state.lock().fail_next_mint = Some(reason.to_string());
    }

    /// Make the next close submission fail.
    pub fn fail_next_close(&self, reason: &str) {
        self.state.lock().fail_next_close = Some(reason.to_string());
    }

    /// Make every deposit and pool read fail.
    pub fn set_fail_reads(&self, fail: bool) {
        self.state.lock().fail_reads = fail;
    }

    /// Make every event query fail.
    pub fn set_fail_events(&self, fail: bool) {
        self.state.lock().fail_events = fail;
    }

    /// Record a deposit-created event.
    pub fn push_deposit_created(&self, event: DepositCreated) {
        self.state.lock().created.push(event);
    }

    /// Record an agent-assigned event.
    pub fn push_agent_assigned(&self, event: AgentAssigned) {
        self.state.lock().assigned.push(event);
    }

    /// Submitted mints, in order.
    pub fn mints(&self) -> Vec<MintRequest> {
        self.state.lock().mints.clone()
    }

    /// Submitted closes, in order.
    pub fn closes(&self) -> Vec<CloseRequest> {
        self.state.lock().closes.clone()
    }

    /// `(from, to)` windows queried for events.
    pub fn event_queries(&self) -> Vec<(u64, u64)> {
        self.state.lock().event_queries.clone()
    }

    /// Number of positions currently open across all deposits.
    pub fn open_position_count(&self) -> usize {
        self.state.lock().positions.len()
    }

    fn next_tx(state: &mut State) -> TxHash {
        let hash = TxHash::from(U256::from(state.next_tx));
        state.next_tx += 1;
        hash
    }

    fn check_reads(state: &State, operation: &'static str) -> Result<()> {
        if state.fail_reads {
            return Err(ChainError::read(operation, "rpc unavailable").into());
        }
        Ok(())
    }
}

#[async_trait]
impl Ledger for MockLedger {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn block_number(&self) -> Result<u64> {
        Ok(self.state.lock().block)
    }

    async fn pool_state(&self, _key: &PoolKey) -> Result<PoolSnapshot> {
        let state = self.state.lock();
        Self::check_reads(&state, "getSlot0")?;
        Ok(state.pool.clone())
    }

    async fn deposit(&self, id: DepositId) -> Result<Deposit> {
        let state = self.state.lock();
        Self::check_reads(&state, "getDeposit")?;
        state
            .deposits
            .get(&id)
            .cloned()
            .ok_or_else(|| ChainError::read("getDeposit", format!("deposit {id} not found")).into())
    }

    async fn position(&self, id: PositionId) -> Result<Position> {
        let state = self.state.lock();
        Self::check_reads(&state, "getPosition")?;
        let liquidity = state.positions.get(&id).map_or(0, |p| p.liquidity);
        Ok(Position {
            id,
            liquidity,
            tick_lower: 0,
            tick_upper: 0,
            current_tick: state.pool.tick,
        })
    }

    async fn user_deposits(&self, owner: Address) -> Result<Vec<DepositId>> {
        let state = self.state.lock();
        Self::check_reads(&state, "getUserDeposits")?;
        Ok(state
            .deposits
            .values()
            .filter(|d| d.owner == owner)
            .map(|d| d.id)
            .collect())
    }

    async fn next_deposit_id(&self) -> Result<u64> {
        let state = self.state.lock();
        Self::check_reads(&state, "nextDepositId")?;
        Ok(state
            .deposits
            .keys()
            .next_back()
            .map_or(1, |id| id.value() + 1))
    }

    async fn mint_position(&self, request: &MintRequest) -> Result<MintReceipt> {
        let mut state = self.state.lock();
        state.mints.push(request.clone());

        if let Some(reason) = state.fail_next_mint.take() {
            return Err(ChainError::submit("mintPosition", reason).into());
        }

        let position_id = PositionId::new(state.next_position);
        let tx_hash = Self::next_tx(&mut state);

        let deposit = state
            .deposits
            .get_mut(&request.deposit_id)
            .ok_or_else(|| ChainError::Reverted {
                operation: "mintPosition",
                tx_hash: tx_hash.to_string(),
            })?;

        let amount0 = request.amount0_max.min(deposit.remaining_amount0);
        let amount1 = request.amount1_max.min(deposit.remaining_amount1);
        deposit.remaining_amount0 -= amount0;
        deposit.remaining_amount1 -= amount1;
        deposit.open_position_ids.push(position_id);

        state.next_position += 1;
        state.positions.insert(
            position_id,
            MockPosition {
                deposit_id: request.deposit_id,
                liquidity: request.liquidity,
                amount0,
                amount1,
            },
        );

        Ok(MintReceipt {
            tx_hash,
            position_id,
        })
    }

    async fn close_position(&self, request: &CloseRequest) -> Result<TxHash> {
        let mut state = self.state.lock();
        state.closes.push(request.clone());

        if let Some(reason) = state.fail_next_close.take() {
            return Err(ChainError::submit("closePosition", reason).into());
        }

        let tx_hash = Self::next_tx(&mut state);
        let position = state
            .positions
            .remove(&request.position_id)
            .filter(|p| p.deposit_id == request.deposit_id)
            .ok_or_else(|| ChainError::Reverted {
                operation: "closePosition",
                tx_hash: tx_hash.to_string(),
            })?;

        let refund = state.refund_on_close;
        if let Some(deposit) = state.deposits.get_mut(&request.deposit_id) {
            deposit
                .open_position_ids
                .retain(|id| *id != request.position_id);
            if refund {
                deposit.remaining_amount0 += position.amount0;
                deposit.remaining_amount1 += position.amount1;
            }
        }

        Ok(tx_hash)
    }

    async fn deposit_created_events(&self, from: u64, to: u64) -> Result<Vec<DepositCreated>> {
        let mut state = self.state.lock();
        state.event_queries.push((from, to));
        if state.fail_events {
            return Err(ChainError::read("DepositCreated logs", "range not supported").into());
        }
        Ok(state
            .created
            .iter()
            .filter(|e| e.block_number.is_some_and(|b| b >= from && b <= to))
            .cloned()
            .collect())
    }

    async fn agent_assigned_events(&self, from: u64, to: u64) -> Result<Vec<AgentAssigned>> {
        let state = self.state.lock();
        if state.fail_events {
            return Err(ChainError::read("AgentAssigned logs", "range not supported").into());
        }
        Ok(state
            .assigned
            .iter()
            .filter(|e| e.block_number.is_some_and(|b| b >= from && b <= to))
            .copied()
            .collect())
    }
}
