//! Factories turning configuration into port implementations.

pub mod advisor;
#[cfg(feature = "chain")]
pub mod chain;
pub mod llm;
