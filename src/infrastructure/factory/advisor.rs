//! Decision engine factory.

use std::sync::Arc;

use crate::adapter::outbound::advisor::LlmAdvisor;
use crate::application::decision::DecisionEngine;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::advisor::Advisor;

use super::llm::build_llm_client;

/// Build the advisor selected by `[advisor]`, if any.
///
/// # Errors
///
/// Returns an error if the LLM client cannot be built.
pub fn build_advisor(config: &Config) -> Result<Option<Arc<dyn Advisor>>> {
    Ok(build_llm_client(config)?.map(|llm| Arc::new(LlmAdvisor::new(llm)) as Arc<dyn Advisor>))
}

/// Build the decision engine: the configured advisor behind the fallback
/// policy and the confidence gate.
///
/// # Errors
///
/// Returns an error if the advisor cannot be built.
pub fn build_decision_engine(config: &Config) -> Result<DecisionEngine> {
    Ok(DecisionEngine::new(build_advisor(config)?)
        .with_confidence_threshold(config.agent.confidence_threshold))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::advisor::AdvisorBackend;

    #[test]
    fn default_config_decides_with_fallback_only() {
        let engine = build_decision_engine(&Config::default()).unwrap();
        assert_eq!(engine.advisor_name(), "fallback");
        assert_eq!(engine.confidence_threshold(), 60);
    }

    #[test]
    fn missing_api_key_degrades_to_fallback() {
        std::env::remove_var("OPENAI_API_KEY");
        let mut config = Config::default();
        config.advisor.backend = AdvisorBackend::OpenAi;
        assert!(build_advisor(&config).unwrap().is_none());
    }
}
