//! Agent identity from the identity registry.

use alloy_primitives::Address;
use serde::Serialize;

use super::id::AgentId;

/// A registered agent. Resolved once and cached for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentIdentity {
    /// Registry id.
    pub id: AgentId,
    /// Domain the agent registered under.
    pub domain: String,
    /// Signing address.
    pub address: Address,
}
