//! Liquidity math over Q64.96 square-root prices.
//!
//! All computations use exact integer arithmetic with 512-bit
//! intermediates; there is no floating point anywhere on this path.

use alloy_primitives::{U256, U512};

use super::error::MathError;
use super::tick_math::Q96;

/// Liquidity is scaled by `SAFETY_MARGIN_NUMERATOR / SAFETY_MARGIN_DENOMINATOR`
/// before submission so rounding in the pool never asks for more than the
/// deposit holds.
pub const SAFETY_MARGIN_NUMERATOR: u128 = 99;

/// See [`SAFETY_MARGIN_NUMERATOR`].
pub const SAFETY_MARGIN_DENOMINATOR: u128 = 100;

/// Compute `floor(a * b / denominator)` without intermediate overflow.
///
/// # Errors
///
/// Fails on a zero denominator or if the result exceeds 256 bits.
pub fn mul_div(a: U256, b: U256, denominator: U256) -> Result<U256, MathError> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero {
            operation: "mul_div",
        });
    }
    let product = U512::from(a) * U512::from(b);
    let quotient = product / U512::from(denominator);
    U256::checked_from_limbs_slice(quotient.as_limbs()).ok_or(MathError::Overflow {
        operation: "mul_div",
    })
}

/// Compute `ceil(a * b / denominator)` without intermediate overflow.
///
/// # Errors
///
/// Fails on a zero denominator or if the result exceeds 256 bits.
pub fn mul_div_rounding_up(a: U256, b: U256, denominator: U256) -> Result<U256, MathError> {
    let floor = mul_div(a, b, denominator)?;
    let product = U512::from(a) * U512::from(b);
    if (product % U512::from(denominator)).is_zero() {
        return Ok(floor);
    }
    floor
        .checked_add(U256::from(1u8))
        .ok_or(MathError::Overflow {
            operation: "mul_div_rounding_up",
        })
}

fn sorted(a: U256, b: U256) -> Result<(U256, U256), MathError> {
    match a.cmp(&b) {
        std::cmp::Ordering::Less => Ok((a, b)),
        std::cmp::Ordering::Greater => Ok((b, a)),
        std::cmp::Ordering::Equal => Err(MathError::ZeroWidthRange),
    }
}

fn to_liquidity(value: U256) -> Result<u128, MathError> {
    u128::try_from(value).map_err(|_| MathError::Overflow {
        operation: "liquidity",
    })
}

/// Liquidity provided by `amount0` of token0 across `[sqrt_a, sqrt_b]`.
///
/// # Errors
///
/// Fails if the bounds are equal or the result exceeds 128 bits.
pub fn liquidity_for_amount0(sqrt_a: U256, sqrt_b: U256, amount0: U256) -> Result<u128, MathError> {
    let (lower, upper) = sorted(sqrt_a, sqrt_b)?;
    let intermediate = mul_div(lower, upper, Q96)?;
    to_liquidity(mul_div(amount0, intermediate, upper - lower)?)
}

/// Liquidity provided by `amount1` of token1 across `[sqrt_a, sqrt_b]`.
///
/// # Errors
///
/// Fails if the bounds are equal or the result exceeds 128 bits.
pub fn liquidity_for_amount1(sqrt_a: U256, sqrt_b: U256, amount1: U256) -> Result<u128, MathError> {
    let (lower, upper) = sorted(sqrt_a, sqrt_b)?;
    to_liquidity(mul_div(amount1, Q96, upper - lower)?)
}

/// Maximum liquidity obtainable from the given amounts at the current price.
///
/// Bounds are sorted before use. Below the range only token0 counts, above
/// it only token1; inside the range the scarcer side limits the result.
///
/// # Errors
///
/// Returns [`MathError::ZeroWidthRange`] when the bounds are equal, or
/// [`MathError::Overflow`] if the liquidity exceeds 128 bits.
pub fn liquidity_for_amounts(
    sqrt_price: U256,
    sqrt_a: U256,
    sqrt_b: U256,
    amount0: U256,
    amount1: U256,
) -> Result<u128, MathError> {
    let (lower, upper) = sorted(sqrt_a, sqrt_b)?;

    if sqrt_price <= lower {
        liquidity_for_amount0(lower, upper, amount0)
    } else if sqrt_price < upper {
        let from0 = liquidity_for_amount0(sqrt_price, upper, amount0)?;
        let from1 = liquidity_for_amount1(lower, sqrt_price, amount1)?;
        Ok(from0.min(from1))
    } else {
        liquidity_for_amount1(lower, upper, amount1)
    }
}

/// Token0 required to back `liquidity` across `[sqrt_a, sqrt_b]`.
///
/// # Errors
///
/// Fails if the bounds are equal or on overflow.
pub fn amount0_for_liquidity(sqrt_a: U256, sqrt_b: U256, liquidity: u128) -> Result<U256, MathError> {
    let (lower, upper) = sorted(sqrt_a, sqrt_b)?;
    let scaled = U256::from(liquidity) << 96;
    let numerator = mul_div(scaled, upper - lower, upper)?;
    Ok(numerator / lower)
}

/// Token1 required to back `liquidity` across `[sqrt_a, sqrt_b]`.
///
/// # Errors
///
/// Fails if the bounds are equal or on overflow.
pub fn amount1_for_liquidity(sqrt_a: U256, sqrt_b: U256, liquidity: u128) -> Result<U256, MathError> {
    let (lower, upper) = sorted(sqrt_a, sqrt_b)?;
    mul_div(U256::from(liquidity), upper - lower, Q96)
}

/// Token amounts backing `liquidity` at the current price.
///
/// # Errors
///
/// Fails if the bounds are equal or on overflow.
pub fn amounts_for_liquidity(
    sqrt_price: U256,
    sqrt_a: U256,
    sqrt_b: U256,
    liquidity: u128,
) -> Result<(U256, U256), MathError> {
    let (lower, upper) = sorted(sqrt_a, sqrt_b)?;

    if sqrt_price <= lower {
        Ok((amount0_for_liquidity(lower, upper, liquidity)?, U256::ZERO))
    } else if sqrt_price < upper {
        Ok((
            amount0_for_liquidity(sqrt_price, upper, liquidity)?,
            amount1_for_liquidity(lower, sqrt_price, liquidity)?,
        ))
    } else {
        Ok((U256::ZERO, amount1_for_liquidity(lower, upper, liquidity)?))
    }
}

/// Scale liquidity down by the 1% safety margin.
#[must_use]
pub const fn apply_safety_margin(liquidity: u128) -> u128 {
    // Divide first when large so the multiplication cannot overflow.
    if liquidity > u128::MAX / SAFETY_MARGIN_NUMERATOR {
        liquidity / SAFETY_MARGIN_DENOMINATOR * SAFETY_MARGIN_NUMERATOR
    } else {
        liquidity * SAFETY_MARGIN_NUMERATOR / SAFETY_MARGIN_DENOMINATOR
    }
}
