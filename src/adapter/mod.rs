//! Implementations of ports (hexagonal adapters).
//!
//! - [`inbound`]: drivers that call into the agent (the CLI)
//! - [`outbound`]: ledger, registry, advisor and LLM implementations

pub mod inbound;
pub mod outbound;
