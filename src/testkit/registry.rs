//! In-memory identity, validation and reputation registries.

use std::collections::{HashMap, HashSet};

use alloy_primitives::{Address, TxHash, B256, U256};
use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{AgentId, AgentIdentity, ValidationRecord, ValidationStatus};
use crate::error::{ChainError, Result};
use crate::port::outbound::registry::AgentRegistry;

#[derive(Debug, Default)]
struct State {
    agents: Vec<AgentIdentity>,
    validations: HashMap<B256, ValidationRecord>,
    history: Vec<ValidationRecord>,
    feedback: HashSet<(AgentId, AgentId)>,
    requests: Vec<B256>,
    responses: Vec<(B256, u8)>,
    next_tx: u64,
    history_unavailable: bool,
    fail_writes: bool,
}

/// In-memory [`AgentRegistry`].
#[derive(Debug, Default)]
pub struct MockRegistry {
    state: Mutex<State>,
}

impl MockRegistry {
    /// Registry with the given agents registered.
    pub fn with_agents(agents: Vec<AgentIdentity>) -> Self {
        let registry = Self::default();
        registry.state.lock().agents = agents;
        registry
    }

    /// Register another agent.
    pub fn register(&self, identity: AgentIdentity) {
        self.state.lock().agents.push(identity);
    }

    /// Authorize `client` to leave feedback for `server`.
    pub fn authorize_feedback(&self, client: AgentId, server: AgentId) {
        self.state.lock().feedback.insert((client, server));
    }

    /// Add a record visible only through event replay.
    pub fn push_history(&self, record: ValidationRecord) {
        self.state.lock().history.push(record);
    }

    /// Make event replay fail, as on deployments without log access.
    pub fn set_history_unavailable(&self, unavailable: bool) {
        self.state.lock().history_unavailable = unavailable;
    }

    /// Make validation requests and responses fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.state.lock().fail_writes = fail;
    }

    /// Hashes submitted as validation requests.
    pub fn requests(&self) -> Vec<B256> {
        self.state.lock().requests.clone()
    }

    /// Responses submitted.
    pub fn responses(&self) -> Vec<(B256, u8)> {
        self.state.lock().responses.clone()
    }

    fn next_tx(state: &mut State) -> TxHash {
        state.next_tx += 1;
        TxHash::from(U256::from(state.next_tx) << 128)
    }
}

#[async_trait]
impl AgentRegistry for MockRegistry {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn resolve_by_address(&self, address: Address) -> Result<Option<AgentIdentity>> {
        Ok(self
            .state
            .lock()
            .agents
            .iter()
            .find(|a| a.address == address)
            .cloned())
    }

    async fn resolve_by_id(&self, id: AgentId) -> Result<Option<AgentIdentity>> {
        Ok(self
            .state
            .lock()
            .agents
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn request_validation(
        &self,
        validator: AgentId,
        server: AgentId,
        hash: B256,
    ) -> Result<TxHash> {
        let mut state = self.state.lock();
        if state.fail_writes {
            return Err(ChainError::submit("validationRequest", "execution reverted").into());
        }
        state.requests.push(hash);
        state
            .validations
            .insert(hash, ValidationRecord::requested(hash, server, validator));
        Ok(Self::next_tx(&mut state))
    }

    async fn respond_validation(&self, hash: B256, score: u8) -> Result<TxHash> {
        let mut state = self.state.lock();
        if state.fail_writes {
            return Err(ChainError::submit("validationResponse", "execution reverted").into());
        }
        state.responses.push((hash, score));
        if let Some(record) = state.validations.get_mut(&hash) {
            record.responded = true;
            record.score = Some(score);
        }
        Ok(Self::next_tx(&mut state))
    }

    async fn validation_status(&self, hash: B256) -> Result<ValidationStatus> {
        Ok(match self.state.lock().validations.get(&hash) {
            Some(record) if record.responded => ValidationStatus::Responded {
                score: record.score,
            },
            Some(_) => ValidationStatus::Pending,
            None => ValidationStatus::NotFound,
        })
    }

    async fn is_feedback_authorized(&self, client: AgentId, server: AgentId) -> Result<bool> {
        Ok(self.state.lock().feedback.contains(&(client, server)))
    }

    async fn total_agents(&self) -> Result<u64> {
        Ok(self.state.lock().agents.len() as u64)
    }

    async fn validation_history(&self, agent: AgentId) -> Result<Vec<ValidationRecord>> {
        let state = self.state.lock();
        if state.history_unavailable {
            return Err(ChainError::read("validation events", "eth_getLogs not supported").into());
        }
        Ok(state
            .validations
            .values()
            .chain(state.history.iter())
            .filter(|r| r.server_agent_id == agent)
            .cloned()
            .collect())
    }
}
