//! Handler for the `decide` command: an offline fallback preview.

use serde_json::json;

use crate::adapter::inbound::cli::command::DecideArgs;
use crate::adapter::inbound::cli::output;
use crate::application::FallbackPolicy;
use crate::domain::price::tick_to_price;
use crate::domain::tick_math::tick_to_sqrt_price;
use crate::domain::{align_tick, ActivePosition, Decision, PoolAnalysis, PositionId};
use crate::error::Result;

/// Compute the fallback decision for the given tick, strategy and positions.
///
/// # Errors
///
/// Fails if the tick or spacing is out of range.
pub fn decide(args: &DecideArgs) -> Result<Decision> {
    let analysis = PoolAnalysis {
        current_tick: args.tick,
        aligned_tick: align_tick(args.tick, args.spacing)?,
        tick_spacing: args.spacing,
        sqrt_price_x96: tick_to_sqrt_price(args.tick)?,
        liquidity: 0,
        price: tick_to_price(args.tick, 18, 18),
    };
    let positions: Vec<ActivePosition> = args
        .positions
        .iter()
        .zip(1u64..)
        .map(|(&(tick_lower, tick_upper), id)| ActivePosition {
            id: PositionId::new(id),
            tick_lower,
            tick_upper,
            liquidity: 0,
        })
        .collect();

    FallbackPolicy::new().decide(&analysis, args.strategy, &positions)
}

/// Execute the decide command.
///
/// # Errors
///
/// Fails if the tick or spacing is out of range.
pub fn execute(args: &DecideArgs) -> Result<()> {
    let decision = decide(args)?;

    if output::is_json() {
        output::document(&json!({
            "command": "decide",
            "tick": args.tick,
            "strategy": args.strategy,
            "spacing": args.spacing,
            "decision": decision,
        }));
        return Ok(());
    }

    output::banner();
    output::field("Tick", args.tick);
    output::field("Strategy", args.strategy);
    output::field("Positions", args.positions.len());
    output::heading("Fallback decision");
    output::decision(&decision, None);
    Ok(())
}
