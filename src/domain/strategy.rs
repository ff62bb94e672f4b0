//! Deposit risk profiles.
//!
//! Each deposit carries one of three strategies. The table is static: the
//! vault stores only the strategy index.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Named risk profile controlling range width and rebalance sensitivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Wide range, rebalances rarely.
    Conservative,
    /// Default profile.
    Balanced,
    /// Narrow range, rebalances eagerly.
    Aggressive,
}

/// Parameters attached to a [`Strategy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyConfig {
    /// Number of tick spacings on each side of the current tick.
    pub tick_range_multiplier: i32,
    /// Maximum tolerated slippage as a fraction (0.01 = 1%).
    pub max_slippage: Decimal,
    /// Fraction of a position's half-width the price may drift from its
    /// center before a rebalance is due.
    pub rebalance_threshold: Decimal,
    /// Short human description.
    pub description: &'static str,
}

const CONSERVATIVE: StrategyConfig = StrategyConfig {
    tick_range_multiplier: 20,
    max_slippage: dec!(0.005),
    rebalance_threshold: dec!(0.90),
    description: "Wide range with infrequent rebalancing",
};

const BALANCED: StrategyConfig = StrategyConfig {
    tick_range_multiplier: 10,
    max_slippage: dec!(0.01),
    rebalance_threshold: dec!(0.85),
    description: "Moderate range balancing fees and rebalance cost",
};

const AGGRESSIVE: StrategyConfig = StrategyConfig {
    tick_range_multiplier: 5,
    max_slippage: dec!(0.02),
    rebalance_threshold: dec!(0.75),
    description: "Narrow range for maximum fee capture",
};

impl Strategy {
    /// All strategies in on-chain index order.
    pub const ALL: [Self; 3] = [Self::Conservative, Self::Balanced, Self::Aggressive];

    /// Strategy stored at `index` in the vault's enum.
    #[must_use]
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Conservative),
            1 => Some(Self::Balanced),
            2 => Some(Self::Aggressive),
            _ => None,
        }
    }

    /// On-chain enum index.
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::Conservative => 0,
            Self::Balanced => 1,
            Self::Aggressive => 2,
        }
    }

    /// Static parameters for this strategy.
    #[must_use]
    pub const fn config(self) -> StrategyConfig {
        match self {
            Self::Conservative => CONSERVATIVE,
            Self::Balanced => BALANCED,
            Self::Aggressive => AGGRESSIVE,
        }
    }

    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Conservative => "conservative",
            Self::Balanced => "balanced",
            Self::Aggressive => "aggressive",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "conservative" | "0" => Ok(Self::Conservative),
            "balanced" | "1" => Ok(Self::Balanced),
            "aggressive" | "2" => Ok(Self::Aggressive),
            other => Err(format!("unknown strategy '{other}'")),
        }
    }
}
