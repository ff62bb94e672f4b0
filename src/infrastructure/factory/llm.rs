//! LLM client factory.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::adapter::outbound::llm::{Anthropic, OpenAi};
use crate::error::Result;
use crate::infrastructure::config::advisor::AdvisorBackend;
use crate::infrastructure::config::llm::ModelConfig;
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::llm::Llm;

/// Build the LLM client for the configured backend.
///
/// Returns `None` for the fallback backend or when the provider's API key is
/// missing; the agent then decides with the fallback policy alone.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub fn build_llm_client(config: &Config) -> Result<Option<Arc<dyn Llm>>> {
    let client: Arc<dyn Llm> = match config.advisor.backend {
        AdvisorBackend::Fallback => return Ok(None),
        AdvisorBackend::Anthropic => {
            let Some(api_key) = api_key("ANTHROPIC_API_KEY") else {
                return Ok(None);
            };
            let model = &config.llm.anthropic;
            Arc::new(Anthropic::new(
                api_key,
                &model.model,
                model.max_tokens,
                model.temperature,
                timeout(model),
            )?)
        }
        AdvisorBackend::OpenAi => {
            let Some(api_key) = api_key("OPENAI_API_KEY") else {
                return Ok(None);
            };
            let model = &config.llm.openai;
            Arc::new(OpenAi::new(
                api_key,
                &model.model,
                model.max_tokens,
                model.temperature,
                timeout(model),
            )?)
        }
    };

    info!(provider = client.name(), "LLM client initialized");
    Ok(Some(client))
}

fn api_key(var: &'static str) -> Option<String> {
    match std::env::var(var) {
        Ok(key) if !key.trim().is_empty() => Some(key),
        _ => {
            warn!(var, "API key not set, using the fallback policy only");
            None
        }
    }
}

const fn timeout(model: &ModelConfig) -> Duration {
    Duration::from_secs(model.timeout_secs)
}
