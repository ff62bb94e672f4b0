use alloy_primitives::Address;
use thiserror::Error;

use crate::domain::error::MathError;
use crate::domain::Action;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Ledger and registry access errors.
///
/// Read failures abort only the current deposit pass; write failures abort
/// the current action. Neither is retried within a pass.
#[derive(Error, Debug, Clone)]
pub enum ChainError {
    #[error("{operation} read failed: {reason}")]
    Read {
        operation: &'static str,
        reason: String,
    },

    #[error("{operation} submission failed: {reason}")]
    Submit {
        operation: &'static str,
        reason: String,
    },

    #[error("{operation} confirmation failed: {reason}")]
    Confirm {
        operation: &'static str,
        reason: String,
    },

    #[error("{operation} reverted in {tx_hash}")]
    Reverted {
        operation: &'static str,
        tx_hash: String,
    },

    #[error("{event} not emitted by {tx_hash}")]
    MissingEvent {
        event: &'static str,
        tx_hash: String,
    },

    #[error("cannot decode {field}: {reason}")]
    Decode { field: &'static str, reason: String },
}

impl ChainError {
    pub fn read(operation: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Read {
            operation,
            reason: err.to_string(),
        }
    }

    pub fn submit(operation: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Submit {
            operation,
            reason: err.to_string(),
        }
    }

    pub fn confirm(operation: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Confirm {
            operation,
            reason: err.to_string(),
        }
    }

    pub fn decode(field: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Decode {
            field,
            reason: err.to_string(),
        }
    }
}

/// Errors raised while turning a decision into ledger operations.
#[derive(Error, Debug, Clone)]
pub enum ExecutionError {
    #[error("{action} decision carries no tick range")]
    MissingRange { action: Action },

    #[error("agent {address} is not registered")]
    AgentNotRegistered { address: Address },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Math(#[from] MathError),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("parse error: {0}")]
    Parse(String),
}

impl Error {
    /// Return `true` for ledger or registry read failures.
    #[must_use]
    pub const fn is_read_failure(&self) -> bool {
        matches!(
            self,
            Self::Chain(ChainError::Read { .. } | ChainError::Decode { .. })
        )
    }

    /// Return `true` for failed submissions or confirmations.
    #[must_use]
    pub const fn is_write_failure(&self) -> bool {
        matches!(
            self,
            Self::Chain(
                ChainError::Submit { .. }
                    | ChainError::Confirm { .. }
                    | ChainError::Reverted { .. }
                    | ChainError::MissingEvent { .. }
            )
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
