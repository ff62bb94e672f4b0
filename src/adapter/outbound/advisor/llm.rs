//! LLM-powered advisor.
//!
//! Renders the pool state, the deposit's strategy and its open positions into
//! a prompt, then parses the model's JSON answer into a [`Decision`]. An
//! answer that cannot be understood becomes a parse-failure decision, which
//! the decision engine replaces with the fallback policy.

use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::decision::MAX_CONFIDENCE;
use crate::domain::{Action, ActivePosition, Decision, PoolAnalysis, Strategy};
use crate::error::{Error, Result};
use crate::port::outbound::advisor::Advisor;
use crate::port::outbound::llm::Llm;

/// Advisor that asks a language model.
pub struct LlmAdvisor {
    llm: Arc<dyn Llm>,
}

impl LlmAdvisor {
    /// Create an advisor over `llm`.
    pub fn new(llm: Arc<dyn Llm>) -> Self {
        Self { llm }
    }

    fn build_prompt(
        analysis: &PoolAnalysis,
        strategy: Strategy,
        positions: &[ActivePosition],
    ) -> String {
        let config = strategy.config();
        let slippage = config.max_slippage * Decimal::ONE_HUNDRED;

        let mut position_list = String::new();
        if positions.is_empty() {
            position_list.push_str("(none)\n");
        }
        for p in positions {
            let _ = writeln!(
                position_list,
                "- #{}: [{}, {}] liquidity {} ({})",
                p.id,
                p.tick_lower,
                p.tick_upper,
                p.liquidity,
                if p.in_range(analysis.current_tick) {
                    "in range"
                } else {
                    "out of range"
                }
            );
        }

        format!(
            r#"You manage a concentrated-liquidity position for one vault deposit.

## Pool
- Current tick: {current_tick}
- Aligned tick: {aligned_tick}
- Tick spacing: {spacing}
- Price (token1 per token0): {price:.6}
- In-range liquidity: {liquidity}

## Strategy: {strategy}
- {description}
- Range: {multiplier} tick spacings on each side of the current tick
- Rebalance when the price drifts past {threshold} of a position's half-width
- Max slippage: {slippage}%

## Open positions
{position_list}
## Actions
- MINT: open a position (only when there are no open positions)
- REBALANCE: close all positions and reopen at new bounds
- CLOSE: close all positions
- HOLD: do nothing

## Output (JSON only)
```json
{{
  "action": "MINT",
  "tickLower": -202200,
  "tickUpper": -201000,
  "reason": "Brief explanation",
  "confidence": 80
}}
```

Rules:
- tickLower and tickUpper are required for MINT and REBALANCE
- Both bounds must be multiples of {spacing} and tickLower < tickUpper
- confidence is an integer from 0 to 100
"#,
            current_tick = analysis.current_tick,
            aligned_tick = analysis.aligned_tick,
            spacing = analysis.tick_spacing,
            price = analysis.price,
            liquidity = analysis.liquidity,
            description = config.description,
            multiplier = config.tick_range_multiplier,
            threshold = config.rebalance_threshold,
        )
    }

    /// Parse a model answer. Never fails: unusable answers become a
    /// parse-failure decision.
    fn parse_response(response: &str) -> Decision {
        let parsed = extract_json(response).and_then(|json| {
            serde_json::from_str::<RawDecision>(json)
                .map_err(|e| Error::Parse(format!("invalid JSON: {e}")))
        });

        match parsed.and_then(RawDecision::into_decision) {
            Ok(decision) => decision,
            Err(e) => {
                warn!(error = %e, "Unusable advisor answer");
                Decision::parse_failure(e)
            }
        }
    }
}

#[async_trait]
impl Advisor for LlmAdvisor {
    fn name(&self) -> &'static str {
        self.llm.name()
    }

    async fn analyze(
        &self,
        analysis: &PoolAnalysis,
        strategy: Strategy,
        positions: &[ActivePosition],
    ) -> Result<Decision> {
        let prompt = Self::build_prompt(analysis, strategy, positions);
        let response = self.llm.complete(&prompt).await?;
        debug!(provider = self.llm.name(), "LLM decision received");

        Ok(Self::parse_response(&response))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDecision {
    action: String,
    #[serde(default, alias = "tick_lower")]
    tick_lower: Option<i32>,
    #[serde(default, alias = "tick_upper")]
    tick_upper: Option<i32>,
    #[serde(default)]
    reason: String,
    confidence: f64,
}

impl RawDecision {
    fn into_decision(self) -> Result<Decision> {
        let action: Action = self.action.parse().map_err(Error::Parse)?;
        if !self.confidence.is_finite() {
            return Err(Error::Parse("confidence is not a number".into()));
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let confidence = self.confidence.round().clamp(0.0, f64::from(MAX_CONFIDENCE)) as u8;

        let (tick_lower, tick_upper) = if action.needs_range() {
            (self.tick_lower, self.tick_upper)
        } else {
            (None, None)
        };

        Ok(Decision {
            action,
            tick_lower,
            tick_upper,
            reason: self.reason,
            confidence,
        })
    }
}

/// Find the JSON object in a model answer, inside a fenced block or raw.
fn extract_json(text: &str) -> Result<&str> {
    if let Some(start) = text.find("```json") {
        let start = start + 7;
        let end = text[start..]
            .find("```")
            .map_or(text.len(), |i| start + i);
        Ok(text[start..end].trim())
    } else if let Some(start) = text.find('{') {
        let end = text[start..]
            .rfind('}')
            .ok_or_else(|| Error::Parse("unterminated JSON object in response".into()))?;
        Ok(&text[start..=start + end])
    } else {
        Err(Error::Parse("no JSON found in response".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::decision::PARSE_FAILURE_MARKER;
    use crate::domain::PositionId;
    use crate::testkit::advisor::ScriptedLlm;
    use crate::testkit::domain::analysis_at;

    fn advisor(replies: Vec<&str>) -> (Arc<ScriptedLlm>, LlmAdvisor) {
        let llm = Arc::new(ScriptedLlm::new(replies));
        (llm.clone(), LlmAdvisor::new(llm))
    }

    #[tokio::test]
    async fn parses_fenced_mint() {
        let reply = r#"Here is my answer:
```json
{"action": "MINT", "tickLower": -202200, "tickUpper": -201000, "reason": "no position", "confidence": 82}
```"#;
        let (_, advisor) = advisor(vec![reply]);

        let decision = advisor
            .analyze(&analysis_at(-201_600), Strategy::Balanced, &[])
            .await
            .unwrap();

        assert_eq!(decision.action, Action::Mint);
        assert_eq!(decision.bounds(), Some((-202_200, -201_000)));
        assert_eq!(decision.confidence, 82);
        assert_eq!(decision.reason, "no position");
    }

    #[tokio::test]
    async fn hold_drops_stray_bounds() {
        let reply = r#"{"action": "hold", "tickLower": 1, "tickUpper": 2, "reason": "fine", "confidence": 70}"#;
        let (_, advisor) = advisor(vec![reply]);

        let decision = advisor
            .analyze(&analysis_at(0), Strategy::Balanced, &[])
            .await
            .unwrap();

        assert_eq!(decision.action, Action::Hold);
        assert_eq!(decision.bounds(), None);
    }

    #[tokio::test]
    async fn unknown_action_is_a_parse_failure() {
        let (_, advisor) = advisor(vec![r#"{"action": "SWAP", "confidence": 90}"#]);

        let decision = advisor
            .analyze(&analysis_at(0), Strategy::Balanced, &[])
            .await
            .unwrap();

        assert!(decision.is_failure());
        assert_eq!(decision.confidence, 0);
        assert!(decision.reason.starts_with(PARSE_FAILURE_MARKER));
    }

    #[tokio::test]
    async fn prose_answer_is_a_parse_failure() {
        let (_, advisor) = advisor(vec!["I would hold for now."]);

        let decision = advisor
            .analyze(&analysis_at(0), Strategy::Balanced, &[])
            .await
            .unwrap();

        assert!(decision.is_failure());
    }

    #[tokio::test]
    async fn transport_errors_propagate() {
        let (_, advisor) = advisor(vec![]);
        let result = advisor
            .analyze(&analysis_at(0), Strategy::Balanced, &[])
            .await;
        assert!(matches!(result, Err(Error::Connection(_))));
    }

    #[test]
    fn confidence_is_clamped() {
        let decision = LlmAdvisor::parse_response(
            r#"{"action": "CLOSE", "reason": "exit", "confidence": 140.4}"#,
        );
        assert_eq!(decision.action, Action::Close);
        assert_eq!(decision.confidence, 100);
    }

    #[tokio::test]
    async fn prompt_describes_pool_strategy_and_positions() {
        let (llm, advisor) = advisor(vec![r#"{"action": "HOLD", "reason": "ok", "confidence": 65}"#]);
        let positions = [ActivePosition {
            id: PositionId::new(7),
            tick_lower: -202_200,
            tick_upper: -201_000,
            liquidity: 1_000,
        }];

        advisor
            .analyze(&analysis_at(-201_600), Strategy::Aggressive, &positions)
            .await
            .unwrap();

        let prompts = llm.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Current tick: -201600"));
        assert!(prompts[0].contains("Strategy: aggressive"));
        assert!(prompts[0].contains("#7: [-202200, -201000] liquidity 1000 (in range)"));
    }

    #[test]
    fn extract_json_finds_raw_object() {
        assert_eq!(
            extract_json("answer: {\"a\": 1} done").unwrap(),
            "{\"a\": 1}"
        );
        assert!(extract_json("nothing here").is_err());
    }

    #[test]
    fn closing_brace_before_opening_brace_is_a_parse_failure() {
        assert!(extract_json("Answer } then { incomplete").is_err());

        let decision = LlmAdvisor::parse_response("Answer } then { incomplete");
        assert_eq!(decision.confidence, 0);
        assert!(decision.reason.starts_with(PARSE_FAILURE_MARKER));
    }

    #[test]
    fn stray_brace_before_object_is_ignored() {
        assert_eq!(
            extract_json("note } {\"a\": 1}").unwrap(),
            "{\"a\": 1}"
        );
    }
}
