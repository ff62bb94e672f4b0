//! Liquidity positions.

use serde::{Deserialize, Serialize};

use super::id::PositionId;
use super::tick::TickRange;

/// A position as returned by the vault's read path.
///
/// The vault is known to report stale or zero bounds once a position
/// exists; use [`PositionBounds`] from the agent's bounds cache instead of
/// `tick_lower`/`tick_upper` here when deciding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    /// Position id.
    pub id: PositionId,
    /// Liquidity held by the position.
    pub liquidity: u128,
    /// Lower bound as reported by the vault (unreliable after mint).
    pub tick_lower: i32,
    /// Upper bound as reported by the vault (unreliable after mint).
    pub tick_upper: i32,
    /// Pool tick at read time.
    pub current_tick: i32,
}

/// Authoritative bounds of an open position, recorded when its mint confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionBounds {
    /// Lower tick.
    pub tick_lower: i32,
    /// Upper tick.
    pub tick_upper: i32,
}

impl From<TickRange> for PositionBounds {
    fn from(range: TickRange) -> Self {
        Self {
            tick_lower: range.lower(),
            tick_upper: range.upper(),
        }
    }
}

/// An open position handed to the decision engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivePosition {
    /// Position id.
    pub id: PositionId,
    /// Lower tick, from the bounds cache.
    pub tick_lower: i32,
    /// Upper tick, from the bounds cache.
    pub tick_upper: i32,
    /// Liquidity held by the position.
    pub liquidity: u128,
}

impl ActivePosition {
    /// Midpoint of the position's range.
    #[must_use]
    pub const fn center(&self) -> i32 {
        self.tick_lower + (self.tick_upper - self.tick_lower) / 2
    }

    /// Half the width of the position's range.
    #[must_use]
    pub const fn half_width(&self) -> i32 {
        (self.tick_upper - self.tick_lower) / 2
    }

    /// Return `true` if `tick` lies inside the range.
    #[must_use]
    pub const fn in_range(&self, tick: i32) -> bool {
        tick >= self.tick_lower && tick < self.tick_upper
    }
}
