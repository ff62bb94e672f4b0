//! Chain-agnostic domain types and pure math.
//!
//! Nothing in this module performs I/O.
//!
//! - [`tick_math`], [`liquidity`], [`tick`] - exact fixed-point math matching
//!   the pool protocol
//! - [`price`] - display-only price conversion
//! - [`pool`], [`deposit`], [`position`] - ledger state snapshots
//! - [`strategy`] - static risk profiles
//! - [`decision`], [`execution`] - what the agent decides and what happened
//! - [`validation`], [`identity`] - registry bookkeeping

pub mod decision;
pub mod deposit;
pub mod error;
pub mod execution;
pub mod id;
pub mod identity;
pub mod liquidity;
pub mod pool;
pub mod position;
pub mod price;
pub mod strategy;
pub mod tick;
pub mod tick_math;
pub mod validation;

pub use decision::{Action, Decision};
pub use deposit::{Deposit, DepositStatus};
pub use error::MathError;
pub use execution::{CloseResult, ExecutionResult, MintResult, RebalanceResult};
pub use id::{AgentId, DepositId, PositionId};
pub use identity::AgentIdentity;
pub use pool::{PoolAnalysis, PoolKey, PoolSnapshot};
pub use position::{ActivePosition, Position, PositionBounds};
pub use strategy::{Strategy, StrategyConfig};
pub use tick::{align_tick, TickRange};
pub use validation::{AgentReputation, ValidationRecord, ValidationStatus};
