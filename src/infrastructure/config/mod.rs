//! Infrastructure configuration modules.

pub mod advisor;
pub mod agent;
pub mod chain;
pub mod llm;
pub mod logging;
pub mod settings;

pub use settings::Config;
