//! Domain errors for fixed-point math and range construction.
//!
//! These errors are returned when a computation would leave the range the
//! pool protocol accepts. Every variant is a hard failure: callers never get
//! a saturated or truncated value in place of an error.
//!
//! # Examples
//!
//! ```
//! use rangekeeper::domain::error::MathError;
//! use rangekeeper::domain::liquidity::liquidity_for_amounts;
//! use rangekeeper::domain::tick_math::tick_to_sqrt_price;
//! use alloy_primitives::U256;
//!
//! let sqrt = tick_to_sqrt_price(0).unwrap();
//! let result = liquidity_for_amounts(sqrt, sqrt, sqrt, U256::from(1u64), U256::from(1u64));
//!
//! assert!(matches!(result, Err(MathError::ZeroWidthRange)));
//! ```

use thiserror::Error;

/// Errors raised by tick, price and liquidity computations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MathError {
    /// Tick lies outside the protocol's supported tick range.
    #[error("tick {tick} outside supported range [{min}, {max}]")]
    TickOutOfRange {
        /// The offending tick.
        tick: i32,
        /// Lowest supported tick.
        min: i32,
        /// Highest supported tick.
        max: i32,
    },

    /// Lower and upper bounds collapse to the same value.
    #[error("price range has zero width")]
    ZeroWidthRange,

    /// Tick spacing must be strictly positive.
    #[error("tick spacing must be positive, got {spacing}")]
    InvalidSpacing {
        /// The invalid spacing.
        spacing: i32,
    },

    /// Intermediate or final result does not fit the target width.
    #[error("arithmetic overflow in {operation}")]
    Overflow {
        /// Name of the computation that overflowed.
        operation: &'static str,
    },

    /// Division by zero in a fixed-point computation.
    #[error("division by zero in {operation}")]
    DivisionByZero {
        /// Name of the computation.
        operation: &'static str,
    },
}
