//! Identity, validation and reputation registries over JSON-RPC.

use std::collections::HashMap;

use alloy_primitives::{Address, TxHash, B256, U256};
use alloy_provider::DynProvider;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use super::contracts::{AgentInfo, IdentityRegistry, ReputationRegistry, ValidationRegistry};
use super::to_u64;
use crate::domain::{AgentId, AgentIdentity, ValidationRecord, ValidationStatus};
use crate::error::{ChainError, Result};
use crate::port::outbound::registry::AgentRegistry;

/// [`AgentRegistry`] backed by the three registry contracts.
pub struct EvmRegistry {
    identity: IdentityRegistry::IdentityRegistryInstance<DynProvider>,
    validation: ValidationRegistry::ValidationRegistryInstance<DynProvider>,
    reputation: ReputationRegistry::ReputationRegistryInstance<DynProvider>,
}

impl EvmRegistry {
    /// Create a registry client over `provider`.
    #[must_use]
    pub fn new(
        provider: DynProvider,
        identity: Address,
        validation: Address,
        reputation: Address,
    ) -> Self {
        Self {
            identity: IdentityRegistry::new(identity, provider.clone()),
            validation: ValidationRegistry::new(validation, provider.clone()),
            reputation: ReputationRegistry::new(reputation, provider),
        }
    }

    async fn confirm(
        operation: &'static str,
        pending: alloy_provider::PendingTransactionBuilder<alloy_provider::network::Ethereum>,
    ) -> Result<TxHash> {
        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| ChainError::confirm(operation, e))?;
        if !receipt.status() {
            return Err(ChainError::Reverted {
                operation,
                tx_hash: receipt.transaction_hash.to_string(),
            }
            .into());
        }
        Ok(receipt.transaction_hash)
    }
}

/// Registries revert for unknown agents and return a zero id on some
/// deployments; both mean "not registered".
fn identity_from(
    operation: &'static str,
    result: std::result::Result<AgentInfo, alloy_contract::Error>,
) -> Result<Option<AgentIdentity>> {
    let info = match result {
        Ok(info) => info,
        Err(e) if e.as_revert_data().is_some() => return Ok(None),
        Err(e) => return Err(ChainError::read(operation, e).into()),
    };
    let id = to_u64("agentId", info.agentId)?;
    if id == 0 {
        return Ok(None);
    }
    Ok(Some(AgentIdentity {
        id: AgentId::new(id),
        domain: info.agentDomain,
        address: info.agentAddress,
    }))
}

fn block_time(timestamp: Option<u64>) -> DateTime<Utc> {
    timestamp
        .and_then(|secs| i64::try_from(secs).ok())
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .unwrap_or_else(Utc::now)
}

#[async_trait]
impl AgentRegistry for EvmRegistry {
    fn name(&self) -> &'static str {
        "evm"
    }

    async fn resolve_by_address(&self, address: Address) -> Result<Option<AgentIdentity>> {
        let result = self.identity.resolveByAddress(address).call().await;
        identity_from("resolveByAddress", result)
    }

    async fn resolve_by_id(&self, id: AgentId) -> Result<Option<AgentIdentity>> {
        let result = self.identity.getAgent(U256::from(id.value())).call().await;
        identity_from("getAgent", result)
    }

    async fn request_validation(
        &self,
        validator: AgentId,
        server: AgentId,
        hash: B256,
    ) -> Result<TxHash> {
        let pending = self
            .validation
            .validationRequest(U256::from(validator.value()), U256::from(server.value()), hash)
            .send()
            .await
            .map_err(|e| ChainError::submit("validationRequest", e))?;
        let tx_hash = Self::confirm("validationRequest", pending).await?;
        debug!(hash = %hash, tx_hash = %tx_hash, "Validation requested");
        Ok(tx_hash)
    }

    async fn respond_validation(&self, hash: B256, score: u8) -> Result<TxHash> {
        let pending = self
            .validation
            .validationResponse(hash, score)
            .send()
            .await
            .map_err(|e| ChainError::submit("validationResponse", e))?;
        let tx_hash = Self::confirm("validationResponse", pending).await?;
        debug!(hash = %hash, score, tx_hash = %tx_hash, "Validation response recorded");
        Ok(tx_hash)
    }

    async fn validation_status(&self, hash: B256) -> Result<ValidationStatus> {
        let pending = self
            .validation
            .isValidationPending(hash)
            .call()
            .await
            .map_err(|e| ChainError::read("isValidationPending", e))?;
        if !pending.exists {
            return Ok(ValidationStatus::NotFound);
        }
        if pending.pending {
            return Ok(ValidationStatus::Pending);
        }

        let response = self
            .validation
            .getValidationResponse(hash)
            .call()
            .await
            .map_err(|e| ChainError::read("getValidationResponse", e))?;
        Ok(ValidationStatus::Responded {
            score: response.hasResponse.then_some(response.response),
        })
    }

    async fn is_feedback_authorized(&self, client: AgentId, server: AgentId) -> Result<bool> {
        let authorized = self
            .reputation
            .isFeedbackAuthorized(U256::from(client.value()), U256::from(server.value()))
            .call()
            .await
            .map_err(|e| ChainError::read("isFeedbackAuthorized", e))?;
        Ok(authorized.isAuthorized)
    }

    async fn total_agents(&self) -> Result<u64> {
        let count = self
            .identity
            .getAgentCount()
            .call()
            .await
            .map_err(|e| ChainError::read("getAgentCount", e))?;
        to_u64("agentCount", count)
    }

    async fn validation_history(&self, agent: AgentId) -> Result<Vec<ValidationRecord>> {
        let server = B256::from(U256::from(agent.value()));

        let requests = self
            .validation
            .ValidationRequestEvent_filter()
            .topic2(server)
            .from_block(0)
            .query()
            .await
            .map_err(|e| ChainError::read("ValidationRequestEvent", e))?;
        let responses = self
            .validation
            .ValidationResponseEvent_filter()
            .topic2(server)
            .from_block(0)
            .query()
            .await
            .map_err(|e| ChainError::read("ValidationResponseEvent", e))?;

        let mut records: HashMap<B256, ValidationRecord> = HashMap::new();
        let mut order = Vec::new();
        for (event, log) in requests {
            let validator = AgentId::new(to_u64("agentValidatorId", event.agentValidatorId)?);
            let mut record = ValidationRecord::requested(event.dataHash, agent, validator);
            record.timestamp = block_time(log.block_timestamp);
            if records.insert(event.dataHash, record).is_none() {
                order.push(event.dataHash);
            }
        }
        for (event, log) in responses {
            let record = records.entry(event.dataHash).or_insert_with(|| {
                order.push(event.dataHash);
                let validator = AgentId::new(
                    u64::try_from(event.agentValidatorId).unwrap_or_default(),
                );
                let mut record = ValidationRecord::requested(event.dataHash, agent, validator);
                record.timestamp = block_time(log.block_timestamp);
                record
            });
            record.score = Some(event.response);
            record.responded = true;
        }

        Ok(order
            .into_iter()
            .filter_map(|hash| records.remove(&hash))
            .collect())
    }
}
