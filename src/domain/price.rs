//! Human-readable price conversion.
//!
//! Display only. Nothing here feeds a value that is submitted to the chain;
//! on-chain parameters always go through [`tick_math`](super::tick_math)
//! and [`liquidity`](super::liquidity).

/// Price ratio between adjacent ticks.
pub const TICK_BASE: f64 = 1.0001;

/// Price of token0 in units of token1 at `tick`, adjusted for decimals.
#[must_use]
pub fn tick_to_price(tick: i32, decimals0: u8, decimals1: u8) -> f64 {
    let raw = TICK_BASE.powi(tick);
    raw * 10f64.powi(i32::from(decimals0) - i32::from(decimals1))
}

/// Nearest tick for a decimal-adjusted display price.
///
/// Returns `None` for non-positive or non-finite prices.
#[must_use]
pub fn price_to_tick(price: f64, decimals0: u8, decimals1: u8) -> Option<i32> {
    if !price.is_finite() || price <= 0.0 {
        return None;
    }
    let raw = price / 10f64.powi(i32::from(decimals0) - i32::from(decimals1));
    let tick = (raw.ln() / TICK_BASE.ln()).round();
    if tick < f64::from(i32::MIN) || tick > f64::from(i32::MAX) {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    Some(tick as i32)
}
