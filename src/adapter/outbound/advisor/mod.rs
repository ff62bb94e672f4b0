//! Advisory backends backed by external models.

pub mod llm;

pub use llm::LlmAdvisor;
