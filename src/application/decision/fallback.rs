//! Deterministic fallback policy.
//!
//! Always available. Used directly when no advisory backend is configured and
//! as the replacement whenever a backend fails or answers with low confidence.

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::debug;

use crate::domain::{ActivePosition, Action, Decision, PoolAnalysis, Strategy, TickRange};
use crate::error::Result;
use crate::port::outbound::advisor::Advisor;

/// Confidence of a fallback MINT.
pub const MINT_CONFIDENCE: u8 = 75;
/// Confidence of a fallback REBALANCE.
pub const REBALANCE_CONFIDENCE: u8 = 70;
/// Confidence of a fallback HOLD.
pub const HOLD_CONFIDENCE: u8 = 60;

/// Rule-based advisor driven only by the strategy table.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackPolicy;

impl FallbackPolicy {
    /// Create the policy.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Decide synchronously.
    ///
    /// With no open positions, mint a range of `multiplier` spacings around
    /// the current tick. With positions, rebalance to that range if the
    /// current tick has drifted from any position's center by more than
    /// `half_width * rebalance_threshold`. Otherwise hold.
    ///
    /// # Errors
    ///
    /// Fails on MINT or REBALANCE if the centered range cannot be built (bad
    /// spacing, or the current tick is too close to the supported limits).
    /// HOLD never needs a range.
    pub fn decide(
        &self,
        analysis: &PoolAnalysis,
        strategy: Strategy,
        positions: &[ActivePosition],
    ) -> Result<Decision> {
        let config = strategy.config();
        let tick = analysis.current_tick;
        let range = || TickRange::centered(tick, config.tick_range_multiplier, analysis.tick_spacing);

        if positions.is_empty() {
            return Ok(Decision::with_range(
                Action::Mint,
                range()?,
                format!("No open positions; opening {strategy} range around tick {tick}"),
                MINT_CONFIDENCE,
            ));
        }

        let drifted = positions
            .iter()
            .find(|p| exceeds_threshold(p, tick, config.rebalance_threshold));

        match drifted {
            Some(position) => {
                debug!(
                    position_id = %position.id,
                    center = position.center(),
                    half_width = position.half_width(),
                    tick,
                    "Position drifted past rebalance threshold"
                );
                Ok(Decision::with_range(
                    Action::Rebalance,
                    range()?,
                    format!(
                        "Tick {tick} drifted {} from center {} of position {}",
                        drift(position, tick),
                        position.center(),
                        position.id
                    ),
                    REBALANCE_CONFIDENCE,
                ))
            }
            None => Ok(Decision::hold(
                format!("All {} position(s) within rebalance threshold", positions.len()),
                HOLD_CONFIDENCE,
            )),
        }
    }
}

fn drift(position: &ActivePosition, tick: i32) -> i64 {
    (i64::from(tick) - i64::from(position.center())).abs()
}

fn exceeds_threshold(position: &ActivePosition, tick: i32, threshold: Decimal) -> bool {
    let limit = Decimal::from(position.half_width()) * threshold;
    Decimal::from(drift(position, tick)) > limit
}

#[async_trait]
impl Advisor for FallbackPolicy {
    fn name(&self) -> &'static str {
        "fallback"
    }

    async fn analyze(
        &self,
        analysis: &PoolAnalysis,
        strategy: Strategy,
        positions: &[ActivePosition],
    ) -> Result<Decision> {
        self.decide(analysis, strategy, positions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PositionId;
    use alloy_primitives::U256;

    fn analysis(tick: i32) -> PoolAnalysis {
        PoolAnalysis {
            current_tick: tick,
            aligned_tick: tick.div_euclid(60) * 60,
            tick_spacing: 60,
            sqrt_price_x96: U256::ZERO,
            liquidity: 0,
            price: 0.0,
        }
    }

    fn position(lower: i32, upper: i32) -> ActivePosition {
        ActivePosition {
            id: PositionId::new(1),
            tick_lower: lower,
            tick_upper: upper,
            liquidity: 1_000,
        }
    }

    #[test]
    fn mints_around_current_tick_without_positions() {
        let d = FallbackPolicy::new()
            .decide(&analysis(-201_600), Strategy::Balanced, &[])
            .unwrap();
        assert_eq!(d.action, Action::Mint);
        assert_eq!(d.tick_lower, Some(-202_200));
        assert_eq!(d.tick_upper, Some(-201_000));
        assert_eq!(d.confidence, 75);
    }

    #[test]
    fn rebalances_after_drift() {
        let positions = [position(-202_200, -201_000)];
        let d = FallbackPolicy::new()
            .decide(&analysis(-195_000), Strategy::Balanced, &positions)
            .unwrap();
        assert_eq!(d.action, Action::Rebalance);
        assert_eq!(d.confidence, 70);
        assert_eq!(d.tick_lower, Some(-195_600));
        assert_eq!(d.tick_upper, Some(-194_400));
    }

    #[test]
    fn holds_inside_threshold() {
        // drift 500 <= 600 * 0.85 = 510
        let positions = [position(-202_200, -201_000)];
        let d = FallbackPolicy::new()
            .decide(&analysis(-201_100), Strategy::Balanced, &positions)
            .unwrap();
        assert_eq!(d.action, Action::Hold);
        assert_eq!(d.confidence, 60);
        assert_eq!(d.bounds(), None);
    }

    #[test]
    fn threshold_depends_on_strategy() {
        // drift 480: above aggressive 450, below conservative 540
        let positions = [position(-202_200, -201_000)];
        let policy = FallbackPolicy::new();
        let aggressive = policy
            .decide(&analysis(-201_120), Strategy::Aggressive, &positions)
            .unwrap();
        let conservative = policy
            .decide(&analysis(-201_120), Strategy::Conservative, &positions)
            .unwrap();
        assert_eq!(aggressive.action, Action::Rebalance);
        assert_eq!(conservative.action, Action::Hold);
    }

    #[test]
    fn hold_near_the_tick_limit_needs_no_range() {
        // center 886920, drift 80 <= 300 * 0.85; a centered range would pass MAX_TICK
        let positions = [position(886_620, 887_220)];
        let policy = FallbackPolicy::new();
        let d = policy
            .decide(&analysis(887_000), Strategy::Balanced, &positions)
            .unwrap();
        assert_eq!(d.action, Action::Hold);

        assert!(policy.decide(&analysis(887_000), Strategy::Balanced, &[]).is_err());
    }

    #[test]
    fn bounds_are_aligned_for_unaligned_ticks() {
        let d = FallbackPolicy::new()
            .decide(&analysis(-201_601), Strategy::Aggressive, &[])
            .unwrap();
        let (lower, upper) = d.bounds().unwrap();
        assert_eq!(lower % 60, 0);
        assert_eq!(upper % 60, 0);
        assert!(lower < upper);
    }
}
