//! Tick to square-root price conversion.
//!
//! Reproduces the pool protocol's own fixed-point algorithm bit for bit so
//! that liquidity computed off-chain matches what the pool accepts. The
//! result is a Q64.96 square-root price.
//!
//! The absolute tick is decomposed into bits; each set bit multiplies a
//! Q128.128 accumulator by `sqrt(1.0001)^-(2^i)` and shifts back down by 128.
//! Positive ticks invert the accumulator, and the final value is rescaled
//! from Q128.128 to Q64.96 rounding up.

use alloy_primitives::{uint, U256};

use super::error::MathError;

/// Lowest tick the pool supports.
pub const MIN_TICK: i32 = -887_272;

/// Highest tick the pool supports.
pub const MAX_TICK: i32 = 887_272;

/// Square-root price at [`MIN_TICK`].
pub const MIN_SQRT_PRICE: U256 = uint!(4295128739_U256);

/// Square-root price at [`MAX_TICK`].
pub const MAX_SQRT_PRICE: U256 = uint!(1461446703485210103287273052203988822378723970342_U256);

/// 2^96, the Q64.96 unit.
pub const Q96: U256 = uint!(0x1000000000000000000000000_U256);

const Q128: U256 = uint!(0x100000000000000000000000000000000_U256);

const BIT0_FACTOR: U256 = uint!(0xfffcb933bd6fad37aa2d162d1a594001_U256);

/// Magic factors for bits 1..=19 of the absolute tick.
const FACTORS: [(u32, U256); 19] = [
    (0x2, uint!(0xfff97272373d413259a46990580e213a_U256)),
    (0x4, uint!(0xfff2e50f5f656932ef12357cf3c7fdcc_U256)),
    (0x8, uint!(0xffe5caca7e10e4e61c3624eaa0941cd0_U256)),
    (0x10, uint!(0xffcb9843d60f6159c9db58835c926644_U256)),
    (0x20, uint!(0xff973b41fa98c081472e6896dfb254c0_U256)),
    (0x40, uint!(0xff2ea16466c96a3843ec78b326b52861_U256)),
    (0x80, uint!(0xfe5dee046a99a2a811c461f1969c3053_U256)),
    (0x100, uint!(0xfcbe86c7900a88aedcffc83b479aa3a4_U256)),
    (0x200, uint!(0xf987a7253ac413176f2b074cf7815e54_U256)),
    (0x400, uint!(0xf3392b0822b70005940c7a398e4b70f3_U256)),
    (0x800, uint!(0xe7159475a2c29b7443b29c7fa6e889d9_U256)),
    (0x1000, uint!(0xd097f3bdfd2022b8845ad8f792aa5825_U256)),
    (0x2000, uint!(0xa9f746462d870fdf8a65dc1f90e061e5_U256)),
    (0x4000, uint!(0x70d869a156d2a1b890bb3df62baf32f7_U256)),
    (0x8000, uint!(0x31be135f97d08fd981231505542fcfa6_U256)),
    (0x10000, uint!(0x9aa508b5b7a84e1c677de54f3e99bc9_U256)),
    (0x20000, uint!(0x5d6af8dedb81196699c329225ee604_U256)),
    (0x40000, uint!(0x2216e584f5fa1ea926041bedfe98_U256)),
    (0x80000, uint!(0x48a170391f7dc42444e8fa2_U256)),
];

/// Convert a tick index to its Q64.96 square-root price.
///
/// # Errors
///
/// Returns [`MathError::TickOutOfRange`] if `tick` lies outside
/// [`MIN_TICK`, `MAX_TICK`].
pub fn tick_to_sqrt_price(tick: i32) -> Result<U256, MathError> {
    let abs_tick = tick.unsigned_abs();
    if abs_tick > MAX_TICK.unsigned_abs() {
        return Err(MathError::TickOutOfRange {
            tick,
            min: MIN_TICK,
            max: MAX_TICK,
        });
    }

    let mut ratio = if abs_tick & 0x1 != 0 {
        BIT0_FACTOR
    } else {
        Q128
    };

    for (bit, factor) in FACTORS {
        if abs_tick & bit != 0 {
            ratio = (ratio * factor) >> 128;
        }
    }

    if tick > 0 {
        ratio = U256::MAX / ratio;
    }

    // Q128.128 -> Q64.96, rounding up so the result never understates the price.
    let remainder = ratio & U256::from(u32::MAX);
    let sqrt_price = (ratio >> 32) + U256::from(u8::from(!remainder.is_zero()));

    Ok(sqrt_price)
}

/// Return `true` if `tick` lies within the supported range.
#[must_use]
pub const fn is_valid_tick(tick: i32) -> bool {
    tick >= MIN_TICK && tick <= MAX_TICK
}
