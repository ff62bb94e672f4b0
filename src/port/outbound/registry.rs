//! Registry port: agent identity, validation and reputation registries.

use alloy_primitives::{Address, TxHash, B256};
use async_trait::async_trait;

use crate::domain::{AgentId, AgentIdentity, ValidationRecord, ValidationStatus};
use crate::error::Result;

/// Access to the identity, validation and reputation registries.
///
/// Implementations must be thread-safe (`Send + Sync`).
#[async_trait]
pub trait AgentRegistry: Send + Sync {
    /// Return the backend name for logging.
    fn name(&self) -> &'static str;

    /// Identity registered for `address`, if any.
    async fn resolve_by_address(&self, address: Address) -> Result<Option<AgentIdentity>>;

    /// Identity registered under `id`, if any.
    async fn resolve_by_id(&self, id: AgentId) -> Result<Option<AgentIdentity>>;

    /// Ask `validator` to validate work by `server` identified by `hash`.
    async fn request_validation(&self, validator: AgentId, server: AgentId, hash: B256) -> Result<TxHash>;

    /// Record a response score (0..=100) for `hash`.
    async fn respond_validation(&self, hash: B256, score: u8) -> Result<TxHash>;

    /// On-chain state of the validation identified by `hash`.
    async fn validation_status(&self, hash: B256) -> Result<ValidationStatus>;

    /// Whether `client` has authorized feedback for `server`.
    async fn is_feedback_authorized(&self, client: AgentId, server: AgentId) -> Result<bool>;

    /// Number of registered agents. Agent ids are `1..=total`.
    async fn total_agents(&self) -> Result<u64>;

    /// Replay request and response events concerning `agent`.
    ///
    /// Some deployments cannot serve historical events; callers treat an
    /// error here as "no history available".
    async fn validation_history(&self, agent: AgentId) -> Result<Vec<ValidationRecord>>;
}
