//! Rangekeeper - an autonomous concentrated-liquidity agent.
//!
//! The agent watches a deposit vault, decides for each assigned deposit
//! whether to mint, close, hold or rebalance a position in one pool, and
//! executes the decision on chain. An optional LLM advisor proposes
//! decisions; a deterministic fallback policy takes over whenever the advisor
//! is missing, fails, or is not confident enough. Decisions can be wrapped
//! in validation records on an agent registry.
//!
//! # Architecture
//!
//! The crate follows a hexagonal layout:
//!
//! - [`domain`] - pure types and fixed-point pool math
//! - [`port`] - traits at the boundaries (ledger, registry, advisor, LLM,
//!   and the agent facade)
//! - [`application`] - the decision engine, execution, validation,
//!   reconciliation and the agent that ties them together
//! - [`adapter`] - EVM, LLM and CLI implementations of the ports
//! - [`infrastructure`] - configuration, wiring and the run loop
//!
//! # Features
//!
//! - `chain` (default) - EVM ledger and registry adapters
//! - `testkit` - in-memory ports and fixtures for tests
//!
//! # Example
//!
//! ```no_run
//! use rangekeeper::infrastructure::config::Config;
//!
//! # async fn example() -> rangekeeper::error::Result<()> {
//! let config = Config::load("config.toml")?;
//! config.init_logging();
//! let agent = rangekeeper::infrastructure::bootstrap::build_agent(&config).await?;
//! # let _ = agent;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
