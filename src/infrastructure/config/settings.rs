//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all settings.
//! Configuration is loaded from a TOML file; the signing key comes only from
//! the `WALLET_PRIVATE_KEY` environment variable.
//!
//! # Example
//!
//! ```no_run
//! use rangekeeper::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use serde::Deserialize;

use super::advisor::AdvisorConfig;
use super::agent::AgentConfig;
use super::chain::ChainConfig;
use super::llm::LlmConfig;
use super::logging::LoggingConfig;
use crate::domain::decision::MAX_CONFIDENCE;
use crate::error::{ConfigError, Result};

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// RPC endpoint, contracts and pool.
    #[serde(default)]
    pub chain: ChainConfig,

    /// Loop timing, validation and dry-run settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Advisory backend selection.
    #[serde(default)]
    pub advisor: AdvisorConfig,

    /// LLM settings for the LLM backends.
    #[serde(default)]
    pub llm: LlmConfig,
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// Loads the signing key from `WALLET_PRIVATE_KEY`, then validates.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;

        config.chain.private_key = std::env::var("WALLET_PRIVATE_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML is malformed,
    /// or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Install the tracing subscriber described by `[logging]`.
    pub fn init_logging(&self) {
        self.logging.init();
    }

    /// Check required settings and value ranges.
    #[allow(clippy::result_large_err)]
    fn validate(&self) -> Result<()> {
        self.chain.rpc_url()?;
        self.chain.contracts()?;
        self.chain.pool_key()?;

        if self.chain.deadline_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "deadline_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        let agent = &self.agent;
        if agent.process_interval_secs == 0 || agent.poll_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "interval_secs",
                reason: "intervals must be greater than 0".to_string(),
            }
            .into());
        }
        if agent.notification_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "notification_capacity",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if agent.confidence_threshold > MAX_CONFIDENCE {
            return Err(ConfigError::InvalidValue {
                field: "confidence_threshold",
                reason: format!("must be at most {MAX_CONFIDENCE}"),
            }
            .into());
        }
        if agent.validation_enabled && agent.validator_agent_id.is_none() {
            return Err(ConfigError::MissingField {
                field: "validator_agent_id",
            }
            .into());
        }
        if let Some(address) = &agent.address {
            super::chain::parse_address("agent.address", address)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::infrastructure::config::advisor::AdvisorBackend;

    const ZERO: &str = "0x0000000000000000000000000000000000000000";

    fn minimal() -> String {
        format!(
            r#"
[chain]
rpc_url = "http://localhost:8545"
vault_address = "0x00000000000000000000000000000000000000a1"
state_view_address = "{ZERO}"
identity_registry = "{ZERO}"
validation_registry = "{ZERO}"
reputation_registry = "{ZERO}"

[chain.pool]
currency0 = "0x0000000000000000000000000000000000000001"
currency1 = "0x0000000000000000000000000000000000000002"
"#
        )
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config = Config::parse_toml(&minimal()).unwrap();
        assert_eq!(config.agent.lookback_blocks, 100);
        assert_eq!(config.agent.notification_capacity, 50);
        assert_eq!(config.agent.confidence_threshold, 60);
        assert_eq!(config.advisor.backend, AdvisorBackend::Fallback);
        assert_eq!(config.chain.pool_key().unwrap().tick_spacing, 60);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.llm.openai.model, "gpt-4o");
    }

    #[test]
    fn missing_rpc_url_is_fatal() {
        let content = minimal().replace("rpc_url = \"http://localhost:8545\"\n", "");
        let err = Config::parse_toml(&content).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::MissingField { field: "rpc_url" })
        ));
    }

    #[test]
    fn malformed_vault_address_names_the_field() {
        let content = minimal().replace(
            "0x00000000000000000000000000000000000000a1",
            "not-an-address",
        );
        let err = Config::parse_toml(&content).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidValue {
                field: "vault_address",
                ..
            })
        ));
    }

    #[test]
    fn validation_requires_validator() {
        let content = format!("{}\n[agent]\nvalidation_enabled = true\n", minimal());
        assert!(Config::parse_toml(&content).is_err());

        let content = format!(
            "{}\n[agent]\nvalidation_enabled = true\nvalidator_agent_id = 2\n",
            minimal()
        );
        assert!(Config::parse_toml(&content).is_ok());
    }

    #[test]
    fn backend_names_parse() {
        let content = format!("{}\n[advisor]\nbackend = \"openai\"\n", minimal());
        let config = Config::parse_toml(&content).unwrap();
        assert_eq!(config.advisor.backend, AdvisorBackend::OpenAi);
    }
}
