//! EVM chain adapters.
//!
//! [`EvmLedger`] talks to the deposit vault and the pool state view;
//! [`EvmRegistry`] to the identity, validation and reputation registries.
//! Both share one signing provider.

mod contracts;
pub mod ledger;
pub mod registry;

use std::str::FromStr;

use alloy_primitives::aliases::I24;
use alloy_primitives::{Address, U256};
use alloy_provider::network::EthereumWallet;
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_signer::Signer as _;
use alloy_signer_local::PrivateKeySigner;
use url::Url;

use crate::error::{ChainError, ConfigError, Result};

pub use ledger::EvmLedger;
pub use registry::EvmRegistry;

/// Build a provider for `rpc_url`, signing with `private_key` when given.
///
/// Without a key the provider can only read.
///
/// # Errors
///
/// Returns an error if the private key cannot be parsed.
pub fn connect(rpc_url: Url, private_key: Option<&str>, chain_id: u64) -> Result<DynProvider> {
    let Some(key) = private_key else {
        return Ok(ProviderBuilder::new().connect_http(rpc_url).erased());
    };
    let signer = signer(key, chain_id)?;
    let wallet = EthereumWallet::from(signer);
    Ok(ProviderBuilder::new()
        .wallet(wallet)
        .connect_http(rpc_url)
        .erased())
}

/// Parse a hex private key into a chain-bound signer.
///
/// # Errors
///
/// Returns an error if the key is empty or malformed.
pub fn signer(private_key: &str, chain_id: u64) -> Result<PrivateKeySigner> {
    if private_key.trim().is_empty() {
        return Err(ConfigError::MissingField {
            field: "WALLET_PRIVATE_KEY",
        }
        .into());
    }
    let signer = PrivateKeySigner::from_str(private_key.trim()).map_err(|e| {
        ConfigError::InvalidValue {
            field: "WALLET_PRIVATE_KEY",
            reason: e.to_string(),
        }
    })?;
    Ok(signer.with_chain_id(Some(chain_id)))
}

/// Address that signs for `private_key`.
///
/// # Errors
///
/// Returns an error if the key is empty or malformed.
pub fn signer_address(private_key: &str) -> Result<Address> {
    Ok(signer(private_key, 1)?.address())
}

/// Latest block height seen by `provider`.
pub(crate) async fn block_number(provider: &DynProvider) -> Result<u64> {
    provider
        .get_block_number()
        .await
        .map_err(|e| ChainError::read("blockNumber", e).into())
}

pub(crate) fn to_u64(field: &'static str, value: U256) -> Result<u64> {
    u64::try_from(value).map_err(|e| ChainError::decode(field, e).into())
}

pub(crate) fn to_i32(field: &'static str, value: I24) -> Result<i32> {
    i32::try_from(value).map_err(|e| ChainError::decode(field, e).into())
}

pub(crate) fn to_i24(field: &'static str, value: i32) -> Result<I24> {
    I24::try_from(value).map_err(|e| ChainError::decode(field, e).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

    #[test]
    fn signer_address_is_derived_from_key() {
        let address = signer_address(KEY).unwrap();
        assert_eq!(
            address,
            Address::from_str("0x70997970C51812dc3A010C7d01b50e0d17dc79C8").unwrap()
        );
    }

    #[test]
    fn signer_is_bound_to_chain() {
        let signer = signer(KEY, 31_337).unwrap();
        assert_eq!(alloy_signer::Signer::chain_id(&signer), Some(31_337));
    }

    #[test]
    fn bad_keys_are_config_errors() {
        assert!(signer_address("").is_err());
        assert!(signer_address("0x1234").is_err());
    }

    #[test]
    fn tick_conversions_respect_int24() {
        assert_eq!(to_i32("tick", to_i24("tick", -201_600).unwrap()).unwrap(), -201_600);
        assert!(to_i24("tick", 8_388_608).is_err());
    }

    #[test]
    fn ids_must_fit_u64() {
        assert_eq!(to_u64("id", U256::from(42u8)).unwrap(), 42);
        assert!(to_u64("id", U256::MAX).is_err());
    }
}
