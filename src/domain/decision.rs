//! Decisions produced by the decision engine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::tick::TickRange;

/// Prefix carried by the reason of a decision that failed to parse.
pub const PARSE_FAILURE_MARKER: &str = "PARSE_FAILURE";

/// Highest confidence a decision can carry.
pub const MAX_CONFIDENCE: u8 = 100;

/// What to do with a deposit this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    /// Open a new position.
    Mint,
    /// Close every open position.
    Close,
    /// Do nothing.
    Hold,
    /// Close every open position and reopen at new bounds.
    Rebalance,
}

impl Action {
    /// Uppercase label used in prompts, logs and results.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mint => "MINT",
            Self::Close => "CLOSE",
            Self::Hold => "HOLD",
            Self::Rebalance => "REBALANCE",
        }
    }

    /// Return `true` for actions that open a position and need bounds.
    #[must_use]
    pub const fn needs_range(self) -> bool {
        matches!(self, Self::Mint | Self::Rebalance)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MINT" => Ok(Self::Mint),
            "CLOSE" => Ok(Self::Close),
            "HOLD" => Ok(Self::Hold),
            "REBALANCE" => Ok(Self::Rebalance),
            other => Err(format!("unknown action '{other}'")),
        }
    }
}

/// A single decision for one deposit. Produced fresh every cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    /// Chosen action.
    pub action: Action,
    /// Lower bound for `Mint`/`Rebalance`.
    #[serde(default)]
    pub tick_lower: Option<i32>,
    /// Upper bound for `Mint`/`Rebalance`.
    #[serde(default)]
    pub tick_upper: Option<i32>,
    /// Explanation.
    pub reason: String,
    /// Confidence, 0 to 100.
    pub confidence: u8,
}

impl Decision {
    /// Decision that opens or moves liquidity to `range`.
    #[must_use]
    pub fn with_range(
        action: Action,
        range: TickRange,
        reason: impl Into<String>,
        confidence: u8,
    ) -> Self {
        Self {
            action,
            tick_lower: Some(range.lower()),
            tick_upper: Some(range.upper()),
            reason: reason.into(),
            confidence: confidence.min(MAX_CONFIDENCE),
        }
    }

    /// Decision to do nothing.
    #[must_use]
    pub fn hold(reason: impl Into<String>, confidence: u8) -> Self {
        Self {
            action: Action::Hold,
            tick_lower: None,
            tick_upper: None,
            reason: reason.into(),
            confidence: confidence.min(MAX_CONFIDENCE),
        }
    }

    /// Decision to close everything.
    #[must_use]
    pub fn close(reason: impl Into<String>, confidence: u8) -> Self {
        Self {
            action: Action::Close,
            tick_lower: None,
            tick_upper: None,
            reason: reason.into(),
            confidence: confidence.min(MAX_CONFIDENCE),
        }
    }

    /// Decision signalling that a backend's answer could not be parsed.
    #[must_use]
    pub fn parse_failure(detail: impl fmt::Display) -> Self {
        Self::hold(format!("{PARSE_FAILURE_MARKER}: {detail}"), 0)
    }

    /// Return `true` if this decision reports a backend failure.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.confidence == 0 || self.reason.starts_with(PARSE_FAILURE_MARKER)
    }

    /// Both bounds, if present.
    #[must_use]
    pub const fn bounds(&self) -> Option<(i32, i32)> {
        match (self.tick_lower, self.tick_upper) {
            (Some(lower), Some(upper)) => Some((lower, upper)),
            _ => None,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}%)", self.action, self.confidence)?;
        if let Some((lower, upper)) = self.bounds() {
            write!(f, " [{lower}, {upper}]")?;
        }
        Ok(())
    }
}
