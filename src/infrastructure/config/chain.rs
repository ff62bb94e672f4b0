//! Chain, contract and pool configuration.
//!
//! Addresses are kept as strings in the file and parsed during validation so
//! a bad address is reported with the field that holds it.

use std::str::FromStr;

use alloy_primitives::Address;
use serde::Deserialize;
use url::Url;

use crate::domain::PoolKey;
use crate::error::{ConfigError, Result};

/// Connection and contract settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChainConfig {
    /// JSON-RPC endpoint.
    #[serde(default)]
    pub rpc_url: String,

    /// Chain id used for signing.
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,

    /// Deposit vault holding user funds and positions.
    #[serde(default)]
    pub vault_address: String,

    /// Pool state view contract.
    #[serde(default)]
    pub state_view_address: String,

    /// Agent identity registry.
    #[serde(default)]
    pub identity_registry: String,

    /// Validation registry.
    #[serde(default)]
    pub validation_registry: String,

    /// Reputation registry.
    #[serde(default)]
    pub reputation_registry: String,

    /// Pool the agent manages.
    #[serde(default)]
    pub pool: PoolConfig,

    /// Validity window of submitted operations, in seconds.
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,

    /// Signing key, loaded from `WALLET_PRIVATE_KEY` (never from the file).
    #[serde(skip)]
    pub private_key: Option<String>,
}

/// Pool key and token metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct PoolConfig {
    #[serde(default)]
    pub currency0: String,
    #[serde(default)]
    pub currency1: String,
    /// Fee in hundredths of a basis point.
    #[serde(default = "default_fee")]
    pub fee: u32,
    #[serde(default = "default_tick_spacing")]
    pub tick_spacing: i32,
    /// Hooks contract; zero address when absent.
    #[serde(default)]
    pub hooks: Option<String>,
    #[serde(default = "default_decimals")]
    pub decimals0: u8,
    #[serde(default = "default_decimals")]
    pub decimals1: u8,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            currency0: String::new(),
            currency1: String::new(),
            fee: default_fee(),
            tick_spacing: default_tick_spacing(),
            hooks: None,
            decimals0: default_decimals(),
            decimals1: default_decimals(),
        }
    }
}

/// Parsed contract addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractAddresses {
    pub vault: Address,
    pub state_view: Address,
    pub identity_registry: Address,
    pub validation_registry: Address,
    pub reputation_registry: Address,
}

/// Parse a required address field.
pub(crate) fn parse_address(field: &'static str, value: &str) -> Result<Address> {
    if value.trim().is_empty() {
        return Err(ConfigError::MissingField { field }.into());
    }
    Address::from_str(value.trim()).map_err(|e| {
        ConfigError::InvalidValue {
            field,
            reason: e.to_string(),
        }
        .into()
    })
}

impl ChainConfig {
    /// Parsed RPC endpoint.
    ///
    /// # Errors
    ///
    /// Fails if the URL is missing or malformed.
    pub fn rpc_url(&self) -> Result<Url> {
        if self.rpc_url.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "rpc_url" }.into());
        }
        Url::parse(self.rpc_url.trim()).map_err(|e| {
            ConfigError::InvalidValue {
                field: "rpc_url",
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Parsed contract addresses.
    ///
    /// # Errors
    ///
    /// Fails on the first missing or malformed address.
    pub fn contracts(&self) -> Result<ContractAddresses> {
        Ok(ContractAddresses {
            vault: parse_address("vault_address", &self.vault_address)?,
            state_view: parse_address("state_view_address", &self.state_view_address)?,
            identity_registry: parse_address("identity_registry", &self.identity_registry)?,
            validation_registry: parse_address("validation_registry", &self.validation_registry)?,
            reputation_registry: parse_address("reputation_registry", &self.reputation_registry)?,
        })
    }

    /// The managed pool's key.
    ///
    /// # Errors
    ///
    /// Fails if a currency or hooks address is malformed or the spacing is
    /// not positive.
    pub fn pool_key(&self) -> Result<PoolKey> {
        let pool = &self.pool;
        if pool.tick_spacing <= 0 {
            return Err(ConfigError::InvalidValue {
                field: "tick_spacing",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        let hooks = match pool.hooks.as_deref() {
            Some(hooks) if !hooks.trim().is_empty() => parse_address("hooks", hooks)?,
            _ => Address::ZERO,
        };
        Ok(PoolKey {
            currency0: parse_address("currency0", &pool.currency0)?,
            currency1: parse_address("currency1", &pool.currency1)?,
            fee: pool.fee,
            tick_spacing: pool.tick_spacing,
            hooks,
        })
    }
}

const fn default_chain_id() -> u64 {
    1
}

const fn default_deadline_secs() -> u64 {
    300
}

const fn default_fee() -> u32 {
    3000
}

const fn default_tick_spacing() -> i32 {
    60
}

const fn default_decimals() -> u8 {
    18
}
