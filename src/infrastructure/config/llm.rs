//! LLM provider configuration.
//!
//! Settings for the language models behind the LLM advisory backends. API
//! keys are read from `ANTHROPIC_API_KEY` or `OPENAI_API_KEY` at runtime,
//! never from the config file.

use serde::Deserialize;

/// Per-provider LLM settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// Used when `advisor.backend = "anthropic"`.
    #[serde(default)]
    pub anthropic: ModelConfig,

    /// Used when `advisor.backend = "openai"`.
    #[serde(default = "ModelConfig::openai")]
    pub openai: ModelConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            anthropic: ModelConfig::default(),
            openai: ModelConfig::openai(),
        }
    }
}

/// Settings for one model.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Model identifier.
    pub model: String,

    /// Sampling temperature. Low values keep decisions reproducible.
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Maximum tokens in the response. A decision is a small JSON object.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ModelConfig {
    fn openai() -> Self {
        Self {
            model: "gpt-4o".into(),
            ..Self::default()
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: "claude-3-5-sonnet-20241022".into(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

const fn default_temperature() -> f64 {
    0.1
}

const fn default_max_tokens() -> usize {
    1024
}

const fn default_timeout_secs() -> u64 {
    30
}
