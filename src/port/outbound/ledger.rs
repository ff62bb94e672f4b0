//! Ledger port: the vault and pool state the agent reads and mutates.
//!
//! The chain is treated as an asynchronous request/response service with
//! eventual confirmation. Every method is a suspension point; write methods
//! return only once the transaction is confirmed.

use alloy_primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{AgentId, Deposit, DepositId, PoolKey, PoolSnapshot, Position, PositionId, Strategy, TickRange};
use crate::error::Result;

/// Parameters for minting a position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintRequest {
    /// Deposit funding the position.
    pub deposit_id: DepositId,
    /// Tick bounds.
    pub range: TickRange,
    /// Liquidity to add.
    pub liquidity: u128,
    /// Maximum token0 the pool may pull.
    pub amount0_max: U256,
    /// Maximum token1 the pool may pull.
    pub amount1_max: U256,
    /// Unix timestamp after which the mint must revert.
    pub deadline: u64,
}

/// Parameters for closing a position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseRequest {
    /// Deposit owning the position.
    pub deposit_id: DepositId,
    /// Position to close.
    pub position_id: PositionId,
    /// Minimum token0 to receive.
    pub amount0_min: U256,
    /// Minimum token1 to receive.
    pub amount1_min: U256,
    /// Unix timestamp after which the close must revert.
    pub deadline: u64,
}

/// A confirmed mint and the position id taken from its creation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintReceipt {
    /// Confirmed transaction.
    pub tx_hash: TxHash,
    /// Position created by the mint.
    pub position_id: PositionId,
}

/// A deposit-creation event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositCreated {
    /// New deposit.
    pub deposit_id: DepositId,
    /// Depositor.
    pub owner: Address,
    /// Token0 deposited.
    pub amount0: U256,
    /// Token1 deposited.
    pub amount1: U256,
    /// Chosen strategy, if the index is known.
    pub strategy: Option<Strategy>,
    /// Block the event was emitted in.
    pub block_number: Option<u64>,
}

/// An agent-assignment event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentAssigned {
    /// Deposit assigned.
    pub deposit_id: DepositId,
    /// Agent now managing it.
    pub agent_id: AgentId,
    /// Block the event was emitted in.
    pub block_number: Option<u64>,
}

/// Read and write access to the vault and its pool.
///
/// # Errors
///
/// Read methods fail with [`ChainError::Read`](crate::error::ChainError::Read);
/// write methods with a submit, confirm, revert or missing-event variant.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Return the backend name for logging.
    fn name(&self) -> &'static str;

    /// Latest block height.
    async fn block_number(&self) -> Result<u64>;

    /// Current state of the pool identified by `key`.
    async fn pool_state(&self, key: &PoolKey) -> Result<PoolSnapshot>;

    /// A deposit by id.
    async fn deposit(&self, id: DepositId) -> Result<Deposit>;

    /// A position by id. Its bounds are unreliable once minted.
    async fn position(&self, id: PositionId) -> Result<Position>;

    /// Deposits owned by `owner`.
    async fn user_deposits(&self, owner: Address) -> Result<Vec<DepositId>>;

    /// The id the next deposit will receive. Existing deposits are `1..next`.
    async fn next_deposit_id(&self) -> Result<u64>;

    /// Submit a mint and wait for confirmation.
    async fn mint_position(&self, request: &MintRequest) -> Result<MintReceipt>;

    /// Submit a close and wait for confirmation.
    async fn close_position(&self, request: &CloseRequest) -> Result<TxHash>;

    /// Deposit-creation events in `from..=to`.
    async fn deposit_created_events(&self, from: u64, to: u64) -> Result<Vec<DepositCreated>>;

    /// Agent-assignment events in `from..=to`.
    async fn agent_assigned_events(&self, from: u64, to: u64) -> Result<Vec<AgentAssigned>>;
}
