//! Agent loop and behavior configuration.

use serde::Deserialize;

use crate::application::cache::notification::DEFAULT_NOTIFICATION_CAPACITY;
use crate::application::decision::DEFAULT_CONFIDENCE_THRESHOLD;
use crate::application::reconcile::DEFAULT_LOOKBACK_BLOCKS;

/// How the agent runs.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    /// Expected registry domain; a mismatch is logged at startup.
    #[serde(default)]
    pub domain: Option<String>,

    /// Agent address used when no signing key is configured (read-only use).
    #[serde(default)]
    pub address: Option<String>,

    /// Seconds between scheduled passes over all assigned deposits.
    #[serde(default = "default_process_interval_secs")]
    pub process_interval_secs: u64,

    /// Seconds between event reconciliation polls.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Blocks scanned behind the head on the first poll.
    #[serde(default = "default_lookback_blocks")]
    pub lookback_blocks: u64,

    /// Deposit notifications retained for status.
    #[serde(default = "default_notification_capacity")]
    pub notification_capacity: usize,

    /// Non-HOLD advisor decisions below this confidence are replaced by the
    /// fallback.
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: u8,

    /// Open a validation record around each executed decision.
    #[serde(default)]
    pub validation_enabled: bool,

    /// Validator asked to attest decisions. Required when validation is enabled.
    #[serde(default)]
    pub validator_agent_id: Option<u64>,

    /// Decide and log, but submit nothing.
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            domain: None,
            address: None,
            process_interval_secs: default_process_interval_secs(),
            poll_interval_secs: default_poll_interval_secs(),
            lookback_blocks: default_lookback_blocks(),
            notification_capacity: default_notification_capacity(),
            confidence_threshold: default_confidence_threshold(),
            validation_enabled: false,
            validator_agent_id: None,
            dry_run: false,
        }
    }
}

const fn default_process_interval_secs() -> u64 {
    60
}

const fn default_poll_interval_secs() -> u64 {
    15
}

const fn default_lookback_blocks() -> u64 {
    DEFAULT_LOOKBACK_BLOCKS
}

const fn default_notification_capacity() -> usize {
    DEFAULT_NOTIFICATION_CAPACITY
}

const fn default_confidence_threshold() -> u8 {
    DEFAULT_CONFIDENCE_THRESHOLD
}
