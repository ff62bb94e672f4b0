//! Application services (use cases).
//!
//! These services orchestrate domain logic and coordinate adapters through
//! the outbound ports.
//!
//! - [`decision`] - advisor selection, normalization and fallback
//! - [`execution`] - mint, close and rebalance sequencing
//! - [`validation`] - validation records and reputation
//! - [`reconcile`] - watermark-driven event scanning
//! - [`agent`] - the per-deposit pipeline behind the agent facade
//! - [`session`], [`cache`] - state owned by one running agent

pub mod agent;
pub mod cache;
pub mod decision;
pub mod execution;
pub mod reconcile;
pub mod session;
pub mod validation;

pub use agent::{Agent, AgentSettings};
pub use decision::{DecisionEngine, DecisionSource, FallbackPolicy};
pub use execution::{ExecutionCoordinator, PositionView};
pub use reconcile::{ReconcileReport, Reconciler};
pub use session::AgentSession;
pub use validation::ValidationTracker;
