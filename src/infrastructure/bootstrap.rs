//! Composition root: wire an [`Agent`] from configuration.

use std::sync::Arc;

use alloy_primitives::Address;
use tracing::{info, warn};

use crate::application::session::AgentSession;
use crate::application::{Agent, AgentSettings, DecisionEngine};
use crate::domain::AgentId;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::factory::advisor::build_decision_engine;
use crate::port::outbound::ledger::Ledger;
use crate::port::outbound::registry::AgentRegistry;

/// Agent settings derived from `config` for the agent at `address`.
///
/// # Errors
///
/// Returns an error if the pool key is invalid.
pub fn agent_settings(config: &Config, address: Address) -> Result<AgentSettings> {
    let mut settings = AgentSettings::new(address, config.chain.pool_key()?);
    settings.decimals0 = config.chain.pool.decimals0;
    settings.decimals1 = config.chain.pool.decimals1;
    settings.dry_run = config.agent.dry_run;
    settings.deadline_secs = config.chain.deadline_secs;
    settings.lookback_blocks = config.agent.lookback_blocks;
    settings.validator = if config.agent.validation_enabled {
        config.agent.validator_agent_id.map(AgentId::new)
    } else {
        None
    };
    Ok(settings)
}

/// Wire an agent around the given ports.
///
/// # Errors
///
/// Returns an error if the pool key is invalid or the advisor cannot be built.
pub fn assemble(
    config: &Config,
    ledger: Arc<dyn Ledger>,
    registry: Arc<dyn AgentRegistry>,
    address: Address,
) -> Result<Agent> {
    let settings = agent_settings(config, address)?;
    let engine: DecisionEngine = build_decision_engine(config)?;
    let session = Arc::new(AgentSession::new(config.agent.notification_capacity));

    info!(
        address = %address,
        advisor = engine.advisor_name(),
        confidence_threshold = engine.confidence_threshold(),
        validation = settings.validator.is_some(),
        dry_run = settings.dry_run,
        "Agent assembled"
    );
    if settings.dry_run {
        warn!("Dry-run mode: decisions are logged, nothing is submitted");
    }

    Ok(Agent::new(ledger, registry, session, engine, settings))
}

/// Build the agent against the configured chain.
///
/// # Errors
///
/// Returns an error if the chain cannot be reached or configuration is
/// incomplete.
#[cfg(feature = "chain")]
pub async fn build_agent(config: &Config) -> Result<Agent> {
    let ports = crate::infrastructure::factory::chain::build_chain(config)?;
    let agent = assemble(config, ports.ledger, ports.registry, ports.address)?;

    let identity = agent.identity().await?;
    if let Some(expected) = config.agent.domain.as_deref() {
        if expected != identity.domain {
            warn!(
                expected,
                registered = %identity.domain,
                "Registered domain differs from configuration"
            );
        }
    }
    Ok(agent)
}

/// Without chain support there is no ledger to build against.
///
/// # Errors
///
/// Always fails.
#[cfg(not(feature = "chain"))]
#[allow(clippy::unused_async)]
pub async fn build_agent(_config: &Config) -> Result<Agent> {
    Err(crate::error::ConfigError::InvalidValue {
        field: "chain",
        reason: "built without the `chain` feature".to_string(),
    }
    .into())
}
