//! Chain adapter factory.

use std::sync::Arc;

use alloy_primitives::Address;
use tracing::info;

use crate::adapter::outbound::chain::{self, EvmLedger, EvmRegistry};
use crate::error::{ConfigError, Result};
use crate::infrastructure::config::chain::parse_address;
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::ledger::Ledger;
use crate::port::outbound::registry::AgentRegistry;

/// Ledger, registry and the agent's address, all over one provider.
pub struct ChainPorts {
    pub ledger: Arc<dyn Ledger>,
    pub registry: Arc<dyn AgentRegistry>,
    pub address: Address,
}

/// Connect to the configured chain.
///
/// The agent address comes from the signing key when one is set, otherwise
/// from `agent.address` (read-only use).
///
/// # Errors
///
/// Returns an error if the key is malformed, or neither a key nor an agent
/// address is configured.
pub fn build_chain(config: &Config) -> Result<ChainPorts> {
    let contracts = config.chain.contracts()?;
    let private_key = config.chain.private_key.as_deref();

    let address = match (private_key, config.agent.address.as_deref()) {
        (Some(key), _) => chain::signer_address(key)?,
        (None, Some(address)) => parse_address("agent.address", address)?,
        (None, None) => {
            return Err(ConfigError::MissingField {
                field: "WALLET_PRIVATE_KEY",
            }
            .into())
        }
    };

    let provider = chain::connect(config.chain.rpc_url()?, private_key, config.chain.chain_id)?;
    info!(
        address = %address,
        chain_id = config.chain.chain_id,
        signing = private_key.is_some(),
        "Chain provider connected"
    );

    Ok(ChainPorts {
        ledger: Arc::new(EvmLedger::new(
            provider.clone(),
            contracts.vault,
            contracts.state_view,
        )),
        registry: Arc::new(EvmRegistry::new(
            provider,
            contracts.identity_registry,
            contracts.validation_registry,
            contracts.reputation_registry,
        )),
        address,
    })
}
