//! Vault deposits as seen by the agent.
//!
//! Deposits are owned and mutated by the vault contract. The agent only reads
//! them and affects them indirectly through mint and close calls.

use std::fmt;

use alloy_primitives::{Address, U256};
use serde::Serialize;

use super::id::{AgentId, DepositId, PositionId};
use super::strategy::Strategy;

/// Lifecycle status of a deposit.
///
/// `Completed` and `Cancelled` are terminal; the agent must not act on a
/// deposit once it leaves `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DepositStatus {
    /// Deposit is live and managed by its agent.
    Active,
    /// Owner withdrew after the lock expired.
    Completed,
    /// Deposit was cancelled.
    Cancelled,
}

impl DepositStatus {
    /// Status stored at `index` in the vault's enum.
    #[must_use]
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Active),
            1 => Some(Self::Completed),
            2 => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Return `true` for terminal statuses.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Active)
    }
}

impl fmt::Display for DepositStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

/// A user's custodied balance plus its strategy and agent assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deposit {
    /// Deposit id.
    pub id: DepositId,
    /// Depositor address.
    pub owner: Address,
    /// Token0 not currently committed to a position.
    pub remaining_amount0: U256,
    /// Token1 not currently committed to a position.
    pub remaining_amount1: U256,
    /// Unix timestamp before which the owner cannot withdraw.
    pub lock_until: u64,
    /// Risk profile.
    pub strategy: Strategy,
    /// Agent managing this deposit, if any.
    pub assigned_agent: Option<AgentId>,
    /// Lifecycle status.
    pub status: DepositStatus,
    /// Positions currently open for this deposit.
    pub open_position_ids: Vec<PositionId>,
}

impl Deposit {
    /// Return `true` if the deposit is still active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == DepositStatus::Active
    }

    /// Return `true` if either remaining balance is nonzero.
    #[must_use]
    pub fn has_balance(&self) -> bool {
        !self.remaining_amount0.is_zero() || !self.remaining_amount1.is_zero()
    }

    /// Return `true` if `agent` manages this deposit.
    #[must_use]
    pub fn is_assigned_to(&self, agent: AgentId) -> bool {
        self.assigned_agent == Some(agent)
    }
}
