//! Decision engine.
//!
//! Wraps an optional advisory backend with normalization, a single
//! confidence gate and the deterministic [`FallbackPolicy`]. Advisory
//! failures never reach the caller: they are replaced by the fallback.

pub mod fallback;

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

pub use fallback::FallbackPolicy;

use crate::domain::{ActivePosition, Action, Decision, PoolAnalysis, Strategy, TickRange};
use crate::error::Result;
use crate::port::outbound::advisor::Advisor;

/// Confidence below which a non-HOLD advisor decision is discarded.
pub const DEFAULT_CONFIDENCE_THRESHOLD: u8 = 60;

/// Where a decision came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "name")]
pub enum DecisionSource {
    /// The configured advisory backend.
    Advisor(String),
    /// The deterministic fallback.
    Fallback,
}

impl fmt::Display for DecisionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Advisor(name) => f.write_str(name),
            Self::Fallback => f.write_str("fallback"),
        }
    }
}

/// A decision and its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineDecision {
    pub decision: Decision,
    pub source: DecisionSource,
}

/// Selects between the advisor and the fallback.
pub struct DecisionEngine {
    advisor: Option<Arc<dyn Advisor>>,
    fallback: FallbackPolicy,
    confidence_threshold: u8,
}

impl DecisionEngine {
    /// Engine that consults `advisor` first.
    #[must_use]
    pub fn new(advisor: Option<Arc<dyn Advisor>>) -> Self {
        Self {
            advisor,
            fallback: FallbackPolicy::new(),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }

    /// Engine that only uses the fallback.
    #[must_use]
    pub fn fallback_only() -> Self {
        Self::new(None)
    }

    /// Override the confidence gate.
    #[must_use]
    pub const fn with_confidence_threshold(mut self, threshold: u8) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Configured gate.
    #[must_use]
    pub const fn confidence_threshold(&self) -> u8 {
        self.confidence_threshold
    }

    /// Name of the configured advisor, or `fallback`.
    #[must_use]
    pub fn advisor_name(&self) -> &'static str {
        self.advisor.as_ref().map_or("fallback", |a| a.name())
    }

    /// Produce a decision for the current pool state.
    ///
    /// The advisor's answer is used when it succeeds, carries no failure
    /// marker, normalizes to a valid range (for MINT/REBALANCE) and passes the
    /// confidence gate. Anything else falls back.
    ///
    /// # Errors
    ///
    /// Fails only if the fallback itself cannot build a range.
    pub async fn analyze(
        &self,
        analysis: &PoolAnalysis,
        strategy: Strategy,
        positions: &[ActivePosition],
    ) -> Result<EngineDecision> {
        if let Some(advisor) = &self.advisor {
            match advisor.analyze(analysis, strategy, positions).await {
                Ok(decision) => match self.accept(decision, analysis.tick_spacing) {
                    Ok(decision) => {
                        debug!(advisor = advisor.name(), %decision, "Advisor decision accepted");
                        return Ok(EngineDecision {
                            decision,
                            source: DecisionSource::Advisor(advisor.name().to_string()),
                        });
                    }
                    Err(reason) => {
                        info!(advisor = advisor.name(), reason = %reason, "Using fallback decision");
                    }
                },
                Err(e) => {
                    warn!(advisor = advisor.name(), error = %e, "Advisor failed, using fallback");
                }
            }
        }

        let decision = self.fallback.decide(analysis, strategy, positions)?;
        Ok(EngineDecision {
            decision,
            source: DecisionSource::Fallback,
        })
    }

    /// Validate and normalize an advisor decision, or say why it was rejected.
    fn accept(&self, mut decision: Decision, spacing: i32) -> std::result::Result<Decision, String> {
        if decision.is_failure() {
            return Err(format!("advisor reported failure: {}", decision.reason));
        }

        if decision.action.needs_range() {
            let (lower, upper) = decision
                .bounds()
                .ok_or_else(|| format!("{} without tick bounds", decision.action))?;
            let range = TickRange::normalized(lower, upper, spacing)
                .map_err(|e| format!("unusable bounds [{lower}, {upper}]: {e}"))?;
            decision.tick_lower = Some(range.lower());
            decision.tick_upper = Some(range.upper());
        } else {
            decision.tick_lower = None;
            decision.tick_upper = None;
        }

        if decision.action != Action::Hold && decision.confidence < self.confidence_threshold {
            return Err(format!(
                "{} confidence {} below threshold {}",
                decision.action, decision.confidence, self.confidence_threshold
            ));
        }

        Ok(decision)
    }
}

impl fmt::Debug for DecisionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecisionEngine")
            .field("advisor", &self.advisor_name())
            .field("confidence_threshold", &self.confidence_threshold)
            .finish()
    }
}
