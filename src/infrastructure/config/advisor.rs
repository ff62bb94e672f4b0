//! Advisory backend selection.

use serde::Deserialize;

/// Which advisor the decision engine consults before falling back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvisorBackend {
    /// Deterministic policy only.
    #[default]
    Fallback,
    /// Anthropic Claude models.
    Anthropic,
    /// OpenAI GPT models.
    OpenAi,
}

/// Advisor configuration.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct AdvisorConfig {
    #[serde(default)]
    pub backend: AdvisorBackend,
}
