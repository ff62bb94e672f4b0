//! Results of ledger-mutating operations.

use alloy_primitives::{TxHash, U256};
use serde::Serialize;

use super::decision::Action;
use super::id::PositionId;

/// Outcome of a confirmed mint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MintResult {
    /// Id of the newly created position.
    pub position_id: PositionId,
    /// Mint transaction.
    pub tx_hash: TxHash,
    /// Liquidity submitted (after the safety margin).
    pub liquidity: u128,
    /// Expected token0 consumed.
    pub amount0: U256,
    /// Expected token1 consumed.
    pub amount1: U256,
    /// Lower tick of the new position.
    pub tick_lower: i32,
    /// Upper tick of the new position.
    pub tick_upper: i32,
}

/// Outcome of a confirmed close.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseResult {
    /// Closed position.
    pub position_id: PositionId,
    /// Close transaction.
    pub tx_hash: TxHash,
}

/// Outcome of closing every position and reopening once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalanceResult {
    /// One transaction per closed position, in close order.
    pub close_tx_hashes: Vec<TxHash>,
    /// The re-mint, if any balance remained.
    pub mint_result: Option<MintResult>,
    /// Id of the re-minted position.
    pub new_position_id: Option<PositionId>,
}

/// Structured result of executing one decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    /// The action that was executed.
    pub action: Action,
    /// Every transaction submitted, in order.
    pub tx_hashes: Vec<TxHash>,
    /// Newly created position, if any.
    pub new_position_id: Option<PositionId>,
    /// Lower bound of the new position.
    pub tick_lower: Option<i32>,
    /// Upper bound of the new position.
    pub tick_upper: Option<i32>,
    /// Why nothing happened, for no-op results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ExecutionResult {
    /// A result that submitted nothing.
    #[must_use]
    pub fn no_op(action: Action, note: impl Into<String>) -> Self {
        Self {
            action,
            tx_hashes: Vec::new(),
            new_position_id: None,
            tick_lower: None,
            tick_upper: None,
            note: Some(note.into()),
        }
    }

    /// Return `true` if no transaction was submitted.
    #[must_use]
    pub fn is_no_op(&self) -> bool {
        self.tx_hashes.is_empty()
    }

    /// Result of a single mint, if it produced a position.
    #[must_use]
    pub fn from_mint(action: Action, mint: Option<MintResult>) -> Self {
        match mint {
            Some(m) => Self {
                action,
                tx_hashes: vec![m.tx_hash],
                new_position_id: Some(m.position_id),
                tick_lower: Some(m.tick_lower),
                tick_upper: Some(m.tick_upper),
                note: None,
            },
            None => Self::no_op(action, "liquidity rounds to zero"),
        }
    }
}

impl From<RebalanceResult> for ExecutionResult {
    fn from(result: RebalanceResult) -> Self {
        let mut tx_hashes = result.close_tx_hashes;
        let (tick_lower, tick_upper, note) = match &result.mint_result {
            Some(m) => {
                tx_hashes.push(m.tx_hash);
                (Some(m.tick_lower), Some(m.tick_upper), None)
            }
            None => (None, None, Some("no balance left to re-mint".to_string())),
        };
        Self {
            action: Action::Rebalance,
            tx_hashes,
            new_position_id: result.new_position_id,
            tick_lower,
            tick_upper,
            note,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rebalance_without_mint_keeps_close_hashes() {
        let result = RebalanceResult {
            close_tx_hashes: vec![TxHash::with_last_byte(1), TxHash::with_last_byte(2)],
            mint_result: None,
            new_position_id: None,
        };
        let exec = ExecutionResult::from(result);
        assert_eq!(exec.tx_hashes.len(), 2);
        assert_eq!(exec.new_position_id, None);
        assert!(exec.note.is_some());
    }

    #[test]
    fn empty_mint_is_no_op() {
        let exec = ExecutionResult::from_mint(Action::Mint, None);
        assert!(exec.is_no_op());
    }
}
