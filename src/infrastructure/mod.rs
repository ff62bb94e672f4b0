//! Infrastructure layer.
//!
//! Technical concerns that support the application without containing
//! business logic: configuration, logging, wiring and the run loop.
//!
//! # Submodules
//!
//! - [`bootstrap`] - Composition root for runtime wiring
//! - [`config`] - Configuration loading and validation
//! - [`factory`] - Component factory functions
//! - [`runtime`] - Timed reconciliation and processing loop

pub mod bootstrap;
pub mod config;
pub mod factory;
pub mod runtime;
