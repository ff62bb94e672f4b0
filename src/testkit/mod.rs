//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`ledger`] - In-memory [`Ledger`](crate::port::outbound::ledger::Ledger)
//!   that mimics the vault, including its stale position bounds.
//! - [`registry`] - In-memory
//!   [`AgentRegistry`](crate::port::outbound::registry::AgentRegistry).
//! - [`advisor`] - `ScriptedAdvisor` and `ScriptedLlm` returning canned answers.
//! - [`domain`] - Builders for pools, deposits and identities.

pub mod advisor;
pub mod domain;
pub mod ledger;
pub mod registry;
