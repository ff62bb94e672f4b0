//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the agent's external dependencies: the vault
//! ledger, the agent registries, advisory backends and language models.

pub mod advisor;
pub mod ledger;
pub mod llm;
pub mod registry;
