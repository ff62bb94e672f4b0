//! Outbound adapters (driven side).

pub mod advisor;
#[cfg(feature = "chain")]
pub mod chain;
pub mod llm;
