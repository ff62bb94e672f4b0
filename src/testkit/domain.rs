//! Builders for domain primitives used across tests.
//!
//! The canonical fixture is a WETH/USDC style pool (18 and 6 decimals, tick
//! spacing 60) sitting around tick -201600, and agent 1 at a fixed address.

use alloy_primitives::{Address, U256};

use crate::domain::tick_math::tick_to_sqrt_price;
use crate::domain::{
    AgentId, AgentIdentity, Deposit, DepositId, DepositStatus, PoolAnalysis, PoolKey, PoolSnapshot,
    Strategy,
};

/// Tick spacing of the fixture pool.
pub const TICK_SPACING: i32 = 60;

/// Id of the agent under test.
pub const AGENT_ID: AgentId = AgentId::new(1);

/// Address of the agent under test.
pub fn agent_address() -> Address {
    Address::repeat_byte(0xA1)
}

/// Identity of the agent under test.
pub fn agent_identity() -> AgentIdentity {
    AgentIdentity {
        id: AGENT_ID,
        domain: "agent.rangekeeper.test".to_string(),
        address: agent_address(),
    }
}

/// Identity of another registered agent.
pub fn peer_identity(id: u64) -> AgentIdentity {
    AgentIdentity {
        id: AgentId::new(id),
        domain: format!("peer{id}.rangekeeper.test"),
        address: Address::repeat_byte(u8::try_from(id % 200).unwrap_or(0) + 0x10),
    }
}

/// Key of the fixture pool.
pub fn pool_key() -> PoolKey {
    PoolKey {
        currency0: Address::repeat_byte(0x01),
        currency1: Address::repeat_byte(0x02),
        fee: 3000,
        tick_spacing: TICK_SPACING,
        hooks: Address::ZERO,
    }
}

/// Pool snapshot at `tick` with a consistent sqrt price.
pub fn snapshot_at(tick: i32) -> PoolSnapshot {
    PoolSnapshot {
        sqrt_price_x96: tick_to_sqrt_price(tick).unwrap_or(U256::ZERO),
        tick,
        liquidity: 10u128.pow(18),
        fee_growth_global0: U256::ZERO,
        fee_growth_global1: U256::ZERO,
    }
}

/// Pool analysis at `tick` for the fixture pool.
pub fn analysis_at(tick: i32) -> PoolAnalysis {
    let snapshot = snapshot_at(tick);
    PoolAnalysis {
        current_tick: tick,
        aligned_tick: tick.div_euclid(TICK_SPACING) * TICK_SPACING,
        tick_spacing: TICK_SPACING,
        sqrt_price_x96: snapshot.sqrt_price_x96,
        liquidity: snapshot.liquidity,
        price: crate::domain::price::tick_to_price(tick, 18, 6),
    }
}

/// Active, balanced-strategy deposit assigned to [`AGENT_ID`].
pub fn active_deposit(id: u64, amount0: u64, amount1: u64) -> Deposit {
    Deposit {
        id: DepositId::new(id),
        owner: Address::repeat_byte(0xD0),
        remaining_amount0: U256::from(amount0),
        remaining_amount1: U256::from(amount1),
        lock_until: 0,
        strategy: Strategy::Balanced,
        assigned_agent: Some(AGENT_ID),
        status: DepositStatus::Active,
        open_position_ids: Vec::new(),
    }
}

/// One ether in wei.
pub const ONE_ETHER: u64 = 1_000_000_000_000_000_000;

/// Three thousand USDC in base units.
pub const THREE_THOUSAND_USDC: u64 = 3_000_000_000;

/// Funded deposit with the canonical amounts.
pub fn funded_deposit(id: u64) -> Deposit {
    active_deposit(id, ONE_ETHER, THREE_THOUSAND_USDC)
}
