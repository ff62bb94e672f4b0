//! Inbound (driving) ports consumed by inbound adapters.
//!
//! - [`agent`]: the operations an external driver (CLI, HTTP facade) may
//!   invoke on a running agent

pub mod agent;
