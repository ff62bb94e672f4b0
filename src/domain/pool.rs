//! Pool identity and state snapshots.

use alloy_primitives::{keccak256, Address, B256, U256};
use serde::{Deserialize, Serialize};

use super::error::MathError;
use super::price::tick_to_price;
use super::tick::align_tick;

/// Key identifying a pool: its token pair, fee tier, spacing and hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolKey {
    /// Lower-sorted token of the pair.
    pub currency0: Address,
    /// Higher-sorted token of the pair.
    pub currency1: Address,
    /// Fee tier in hundredths of a basis point.
    pub fee: u32,
    /// Minimum distance between usable ticks.
    pub tick_spacing: i32,
    /// Hooks contract, zero if none.
    #[serde(default)]
    pub hooks: Address,
}

impl PoolKey {
    /// Pool id: `keccak256(abi.encode(key))`.
    ///
    /// Each field occupies one 32-byte word; `tick_spacing` is sign-extended.
    #[must_use]
    pub fn id(&self) -> B256 {
        let mut encoded = [0u8; 160];
        encoded[12..32].copy_from_slice(self.currency0.as_slice());
        encoded[44..64].copy_from_slice(self.currency1.as_slice());
        encoded[92..96].copy_from_slice(&self.fee.to_be_bytes());
        if self.tick_spacing < 0 {
            encoded[96..124].fill(0xff);
        }
        encoded[124..128].copy_from_slice(&self.tick_spacing.to_be_bytes());
        encoded[140..160].copy_from_slice(self.hooks.as_slice());
        keccak256(encoded)
    }
}

/// Point-in-time pool state. Re-fetched every cycle and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolSnapshot {
    /// Current Q64.96 square-root price.
    pub sqrt_price_x96: U256,
    /// Current tick.
    pub tick: i32,
    /// In-range liquidity.
    pub liquidity: u128,
    /// Global fee growth for token0.
    pub fee_growth_global0: U256,
    /// Global fee growth for token1.
    pub fee_growth_global1: U256,
}

/// Pool state digested for decision making.
///
/// This is what advisory backends receive; it carries display values next
/// to the raw snapshot so prompts can be rendered without further lookups.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolAnalysis {
    /// Current tick.
    pub current_tick: i32,
    /// Current tick floored to the spacing.
    pub aligned_tick: i32,
    /// Pool tick spacing.
    pub tick_spacing: i32,
    /// Current Q64.96 square-root price.
    pub sqrt_price_x96: U256,
    /// In-range liquidity.
    pub liquidity: u128,
    /// Decimal-adjusted price of token0 in token1 (display only).
    pub price: f64,
}

impl PoolAnalysis {
    /// Build an analysis from a snapshot.
    ///
    /// # Errors
    ///
    /// Fails if the tick spacing is not positive.
    pub fn from_snapshot(
        snapshot: &PoolSnapshot,
        tick_spacing: i32,
        decimals0: u8,
        decimals1: u8,
    ) -> Result<Self, MathError> {
        Ok(Self {
            current_tick: snapshot.tick,
            aligned_tick: align_tick(snapshot.tick, tick_spacing)?,
            tick_spacing,
            sqrt_price_x96: snapshot.sqrt_price_x96,
            liquidity: snapshot.liquidity,
            price: tick_to_price(snapshot.tick, decimals0, decimals1),
        })
    }
}
