//! Validation and reputation tracking.
//!
//! Correlates each decision with a validation request in the registry. The
//! correlation key is the keccak256 hash of the decision payload's JSON
//! encoding. Validation is bookkeeping only: callers log and ignore its
//! failures.

use std::sync::Arc;

use alloy_primitives::{keccak256, B256};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::application::session::AgentSession;
use crate::domain::{
    AgentId, AgentReputation, Decision, DepositId, Strategy, ValidationRecord, ValidationStatus,
};
use crate::error::Result;
use crate::port::outbound::registry::AgentRegistry;

/// What gets hashed and attested for one decision.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionPayload {
    pub deposit_id: DepositId,
    pub strategy: Strategy,
    pub current_tick: i32,
    pub decision: Decision,
    pub timestamp: DateTime<Utc>,
}

/// Deterministic correlation hash of a serializable payload.
///
/// # Errors
///
/// Fails if the payload cannot be serialized.
pub fn correlation_hash<T: Serialize>(payload: &T) -> Result<B256> {
    Ok(keccak256(serde_json::to_vec(payload)?))
}

/// Opens and closes validation records and computes reputation.
pub struct ValidationTracker {
    registry: Arc<dyn AgentRegistry>,
    session: Arc<AgentSession>,
}

impl ValidationTracker {
    pub fn new(registry: Arc<dyn AgentRegistry>, session: Arc<AgentSession>) -> Self {
        Self { registry, session }
    }

    /// Request validation of `payload` by `validator` for work done by `server`.
    ///
    /// The record is stored locally only after the registry accepts the
    /// request.
    ///
    /// # Errors
    ///
    /// Fails if the payload cannot be hashed or the request is not confirmed.
    pub async fn request_validation<T: Serialize + Sync>(
        &self,
        validator: AgentId,
        server: AgentId,
        payload: &T,
    ) -> Result<B256> {
        let hash = correlation_hash(payload)?;
        let tx_hash = self
            .registry
            .request_validation(validator, server, hash)
            .await?;

        self.session
            .validations_mut()
            .open(ValidationRecord::requested(hash, server, validator));

        info!(
            hash = %hash,
            tx_hash = %tx_hash,
            validator = %validator,
            server = %server,
            "Validation requested"
        );
        Ok(hash)
    }

    /// Respond to the validation identified by `hash`.
    ///
    /// A missing local record is tolerated.
    ///
    /// # Errors
    ///
    /// Fails if the response is not confirmed; the local record is then left
    /// pending.
    pub async fn submit_response(&self, hash: B256, score: u8) -> Result<()> {
        let tx_hash = self.registry.respond_validation(hash, score).await?;

        if !self.session.validations_mut().respond(hash, score) {
            debug!(hash = %hash, "No local record for validation response");
        }

        info!(hash = %hash, tx_hash = %tx_hash, score, "Validation responded");
        Ok(())
    }

    /// Status of a validation, from memory first and the registry otherwise.
    ///
    /// # Errors
    ///
    /// Fails if the hash is unknown locally and the registry query fails.
    pub async fn status(&self, hash: B256) -> Result<ValidationStatus> {
        let local = self.session.validations().get(hash).cloned();
        if let Some(record) = local {
            return Ok(if record.responded {
                ValidationStatus::Responded {
                    score: record.score,
                }
            } else {
                ValidationStatus::Pending
            });
        }
        self.registry.validation_status(hash).await
    }

    /// Reputation of `agent`.
    ///
    /// Local records are supplemented with registry event replay when
    /// available. Replay and individual feedback lookups are best effort.
    ///
    /// # Errors
    ///
    /// Fails if the registered agent count cannot be read.
    pub async fn reputation(&self, agent: AgentId) -> Result<AgentReputation> {
        let mut records = self.session.validations().for_agent(agent);

        match self.registry.validation_history(agent).await {
            Ok(history) => records.extend(history),
            Err(e) => debug!(agent = %agent, error = %e, "Validation history unavailable"),
        }

        let total_agents = self.registry.total_agents().await?;
        let mut feedback = 0u64;
        for id in 1..=total_agents {
            let client = AgentId::new(id);
            if client == agent {
                continue;
            }
            match self.registry.is_feedback_authorized(client, agent).await {
                Ok(true) => feedback += 1,
                Ok(false) => {}
                Err(e) => debug!(client = %client, error = %e, "Feedback lookup failed"),
            }
        }

        Ok(AgentReputation::compute(agent, &records, feedback, total_agents))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::validation::NEUTRAL_REPUTATION;
    use crate::testkit::domain::{agent_identity, peer_identity, AGENT_ID};
    use crate::testkit::registry::MockRegistry;

    fn tracker(registry: &Arc<MockRegistry>) -> (ValidationTracker, Arc<AgentSession>) {
        let session = Arc::new(AgentSession::default());
        (ValidationTracker::new(registry.clone(), session.clone()), session)
    }

    #[test]
    fn hash_is_deterministic() {
        let a = correlation_hash(&serde_json::json!({"x": 1})).unwrap();
        let b = correlation_hash(&serde_json::json!({"x": 1})).unwrap();
        let c = correlation_hash(&serde_json::json!({"x": 2})).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[tokio::test]
    async fn request_then_respond() {
        let registry = Arc::new(MockRegistry::with_agents(vec![agent_identity(), peer_identity(2)]));
        let (tracker, session) = tracker(&registry);

        let hash = tracker
            .request_validation(AgentId::new(2), AGENT_ID, &serde_json::json!({"d": 1}))
            .await
            .unwrap();
        assert_eq!(tracker.status(hash).await.unwrap(), ValidationStatus::Pending);
        assert_eq!(session.validations().pending_count(), 1);

        tracker.submit_response(hash, 80).await.unwrap();
        assert_eq!(
            tracker.status(hash).await.unwrap(),
            ValidationStatus::Responded { score: Some(80) }
        );
        assert_eq!(registry.responses(), vec![(hash, 80)]);
    }

    #[tokio::test]
    async fn unknown_hash_is_not_found() {
        let registry = Arc::new(MockRegistry::default());
        let (tracker, _) = tracker(&registry);
        let status = tracker.status(B256::repeat_byte(0x42)).await.unwrap();
        assert_eq!(status, ValidationStatus::NotFound);
    }

    #[tokio::test]
    async fn failed_request_stores_nothing() {
        let registry = Arc::new(MockRegistry::default());
        registry.set_fail_writes(true);
        let (tracker, session) = tracker(&registry);

        let result = tracker
            .request_validation(AgentId::new(2), AGENT_ID, &serde_json::json!({}))
            .await;
        assert!(result.is_err());
        assert!(session.validations().is_empty());
    }

    #[tokio::test]
    async fn fresh_agent_has_neutral_reputation() {
        let registry = Arc::new(MockRegistry::with_agents(vec![agent_identity(), peer_identity(2)]));
        let (tracker, _) = tracker(&registry);
        let rep = tracker.reputation(AGENT_ID).await.unwrap();
        assert_eq!(rep.reputation_score, NEUTRAL_REPUTATION);
    }

    #[tokio::test]
    async fn reputation_survives_missing_history() {
        let registry = Arc::new(MockRegistry::with_agents(vec![
            agent_identity(),
            peer_identity(2),
            peer_identity(3),
        ]));
        registry.set_history_unavailable(true);
        registry.authorize_feedback(AgentId::new(2), AGENT_ID);
        let (tracker, _) = tracker(&registry);

        let hash = tracker
            .request_validation(AgentId::new(2), AGENT_ID, &serde_json::json!({"d": 1}))
            .await
            .unwrap();
        tracker.submit_response(hash, 90).await.unwrap();

        let rep = tracker.reputation(AGENT_ID).await.unwrap();
        assert_eq!(rep.total_validations, 1);
        assert_eq!(rep.feedback_authorizations, 1);
        // 0.6 * 90 + 0.2 * 100 + 0.2 * 50 = 84
        assert_eq!(rep.reputation_score, 84);
    }

    #[tokio::test]
    async fn local_and_replayed_records_are_deduplicated() {
        let registry = Arc::new(MockRegistry::with_agents(vec![agent_identity(), peer_identity(2)]));
        let (tracker, _) = tracker(&registry);

        let hash = tracker
            .request_validation(AgentId::new(2), AGENT_ID, &serde_json::json!({"d": 7}))
            .await
            .unwrap();

        // The registry replays the same request the session holds locally.
        let rep = tracker.reputation(AGENT_ID).await.unwrap();
        assert_eq!(rep.total_validations, 1);
        assert_eq!(rep.responded_validations, 0);
        assert!(registry.requests().contains(&hash));
    }
}
