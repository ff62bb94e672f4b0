//! Validation records and agent reputation.
//!
//! A validation record correlates one off-chain decision with an attestation
//! in the validation registry, keyed by the content hash of the decision
//! payload.

use std::collections::HashMap;
use std::fmt;

use alloy_primitives::B256;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::id::AgentId;

/// Reputation reported for an agent with no history at all.
pub const NEUTRAL_REPUTATION: u32 = 50;

const SCORE_WEIGHT: f64 = 0.6;
const RESPONSE_RATE_WEIGHT: f64 = 0.2;
const TRUST_WEIGHT: f64 = 0.2;

/// One validation request and, once answered, its response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRecord {
    /// Content hash of the validated payload.
    pub hash: B256,
    /// Agent whose work is validated.
    pub server_agent_id: AgentId,
    /// Agent asked to validate.
    pub validator_agent_id: AgentId,
    /// Score 0..=100, once responded.
    pub score: Option<u8>,
    /// Whether a response was recorded.
    pub responded: bool,
    /// When the request was made.
    pub timestamp: DateTime<Utc>,
}

impl ValidationRecord {
    /// A freshly requested, unanswered record.
    #[must_use]
    pub fn requested(hash: B256, server: AgentId, validator: AgentId) -> Self {
        Self {
            hash,
            server_agent_id: server,
            validator_agent_id: validator,
            score: None,
            responded: false,
            timestamp: Utc::now(),
        }
    }
}

/// Status of a validation by hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationStatus {
    /// No request with this hash exists anywhere.
    NotFound,
    /// Requested, not yet answered.
    Pending,
    /// Answered.
    Responded {
        /// Score, if known.
        score: Option<u8>,
    },
}

impl ValidationStatus {
    /// Uppercase status label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::Pending => "PENDING",
            Self::Responded { .. } => "RESPONDED",
        }
    }

    /// Score, if responded.
    #[must_use]
    pub const fn score(&self) -> Option<u8> {
        match self {
            Self::Responded { score } => *score,
            _ => None,
        }
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Aggregate reputation of one agent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentReputation {
    /// Agent described.
    pub agent_id: AgentId,
    /// Distinct validations requested for this agent.
    pub total_validations: usize,
    /// Validations with a response.
    pub responded_validations: usize,
    /// Mean score over scored responses (0 if none).
    pub average_score: f64,
    /// Responded / total, as a percentage.
    pub response_rate: f64,
    /// Other agents that authorized feedback for this agent.
    pub feedback_authorizations: u64,
    /// Feedback authorizations / (registered agents - 1), as a percentage.
    pub trust_ratio: f64,
    /// Weighted score, rounded.
    pub reputation_score: u32,
}

impl AgentReputation {
    /// Compute reputation from an agent's records.
    ///
    /// Records are deduplicated by hash; a responded copy wins over a pending
    /// one. Records for other agents are ignored.
    #[must_use]
    pub fn compute(
        agent_id: AgentId,
        records: &[ValidationRecord],
        feedback_authorizations: u64,
        total_agents: u64,
    ) -> Self {
        let unique = dedup_by_hash(records.iter().filter(|r| r.server_agent_id == agent_id));

        let total = unique.len();
        let responded = unique.iter().filter(|r| r.responded).count();
        let scores: Vec<f64> = unique
            .iter()
            .filter(|r| r.responded)
            .filter_map(|r| r.score)
            .map(f64::from)
            .collect();

        let average_score = if scores.is_empty() {
            0.0
        } else {
            scores.iter().sum::<f64>() / scores.len() as f64
        };
        let response_rate = if total == 0 {
            0.0
        } else {
            responded as f64 / total as f64 * 100.0
        };
        let peers = total_agents.saturating_sub(1).max(1);
        let trust_ratio = feedback_authorizations as f64 / peers as f64 * 100.0;

        let reputation_score = if total == 0 && feedback_authorizations == 0 {
            NEUTRAL_REPUTATION
        } else {
            let weighted = SCORE_WEIGHT * average_score
                + RESPONSE_RATE_WEIGHT * response_rate
                + TRUST_WEIGHT * trust_ratio;
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let rounded = weighted.round().max(0.0) as u32;
            rounded
        };

        Self {
            agent_id,
            total_validations: total,
            responded_validations: responded,
            average_score,
            response_rate,
            feedback_authorizations,
            trust_ratio,
            reputation_score,
        }
    }
}

fn dedup_by_hash<'a>(records: impl Iterator<Item = &'a ValidationRecord>) -> Vec<&'a ValidationRecord> {
    let mut by_hash: HashMap<B256, &ValidationRecord> = HashMap::new();
    let mut order = Vec::new();
    for record in records {
        match by_hash.get(&record.hash) {
            Some(existing) if existing.responded || !record.responded => {}
            Some(_) => {
                by_hash.insert(record.hash, record);
            }
            None => {
                order.push(record.hash);
                by_hash.insert(record.hash, record);
            }
        }
    }
    order.iter().filter_map(|h| by_hash.get(h).copied()).collect()
}
