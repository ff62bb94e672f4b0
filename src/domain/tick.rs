//! Tick alignment and validated tick ranges.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::MathError;
use super::tick_math::{is_valid_tick, MAX_TICK, MIN_TICK};

/// Floor `tick` to the nearest lower multiple of `spacing`.
///
/// Negative ticks round toward negative infinity, so `align_tick(-1, 60)`
/// is `-60`. Aligning twice is the same as aligning once.
///
/// # Errors
///
/// Returns [`MathError::InvalidSpacing`] if `spacing` is not positive.
pub const fn align_tick(tick: i32, spacing: i32) -> Result<i32, MathError> {
    if spacing <= 0 {
        return Err(MathError::InvalidSpacing { spacing });
    }
    Ok(tick.div_euclid(spacing) * spacing)
}

/// A validated `[lower, upper)` tick range.
///
/// Both bounds are multiples of the pool's tick spacing, lie within the
/// supported tick range, and `lower < upper` strictly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TickRange {
    lower: i32,
    upper: i32,
}

impl TickRange {
    /// Build a range from already aligned bounds.
    ///
    /// # Errors
    ///
    /// Fails if the bounds are unaligned, out of range, or not strictly
    /// ordered.
    pub fn new(lower: i32, upper: i32, spacing: i32) -> Result<Self, MathError> {
        if align_tick(lower, spacing)? != lower || align_tick(upper, spacing)? != upper {
            return Err(MathError::InvalidSpacing { spacing });
        }
        Self::checked(lower, upper)
    }

    /// Floor-align arbitrary bounds and swap them if they end up inverted.
    ///
    /// This is the normalization applied to every advisory backend's output.
    ///
    /// # Errors
    ///
    /// Fails if the aligned bounds coincide or leave the supported range.
    pub fn normalized(lower: i32, upper: i32, spacing: i32) -> Result<Self, MathError> {
        let mut lower = align_tick(lower, spacing)?;
        let mut upper = align_tick(upper, spacing)?;
        if lower >= upper {
            std::mem::swap(&mut lower, &mut upper);
        }
        Self::checked(lower, upper)
    }

    /// Range of `multiplier` spacings on each side of `center`.
    ///
    /// # Errors
    ///
    /// Fails if the resulting bounds leave the supported range.
    pub fn centered(center: i32, multiplier: i32, spacing: i32) -> Result<Self, MathError> {
        let offset = multiplier
            .checked_mul(spacing)
            .ok_or(MathError::Overflow {
                operation: "centered range",
            })?;
        let lower = align_tick(center.saturating_sub(offset), spacing)?;
        let upper = align_tick(center.saturating_add(offset), spacing)?;
        Self::checked(lower, upper)
    }

    fn checked(lower: i32, upper: i32) -> Result<Self, MathError> {
        for tick in [lower, upper] {
            if !is_valid_tick(tick) {
                return Err(MathError::TickOutOfRange {
                    tick,
                    min: MIN_TICK,
                    max: MAX_TICK,
                });
            }
        }
        if lower >= upper {
            return Err(MathError::ZeroWidthRange);
        }
        Ok(Self { lower, upper })
    }

    /// Lower bound.
    #[must_use]
    pub const fn lower(&self) -> i32 {
        self.lower
    }

    /// Upper bound.
    #[must_use]
    pub const fn upper(&self) -> i32 {
        self.upper
    }

    /// Midpoint of the range (integer division toward zero).
    #[must_use]
    pub const fn center(&self) -> i32 {
        self.lower + (self.upper - self.lower) / 2
    }

    /// Half the width of the range.
    #[must_use]
    pub const fn half_width(&self) -> i32 {
        (self.upper - self.lower) / 2
    }

    /// Return `true` if `tick` is inside the range.
    #[must_use]
    pub const fn contains(&self, tick: i32) -> bool {
        tick >= self.lower && tick < self.upper
    }
}

impl fmt::Display for TickRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lower, self.upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_floors_toward_negative_infinity() {
        assert_eq!(align_tick(-1, 60).unwrap(), -60);
        assert_eq!(align_tick(59, 60).unwrap(), 0);
        assert_eq!(align_tick(-201_601, 60).unwrap(), -201_660);
        assert_eq!(align_tick(-201_600, 60).unwrap(), -201_600);
    }

    #[test]
    fn align_is_idempotent() {
        for spacing in [1, 10, 60, 200] {
            for tick in [-887_272, -201_601, -61, -1, 0, 1, 59, 61, 195_000, 887_272] {
                let once = align_tick(tick, spacing).unwrap();
                assert_eq!(align_tick(once, spacing).unwrap(), once);
            }
        }
    }

    #[test]
    fn align_rejects_non_positive_spacing() {
        assert!(align_tick(10, 0).is_err());
        assert!(align_tick(10, -60).is_err());
    }

    #[test]
    fn normalized_swaps_inverted_bounds() {
        let range = TickRange::normalized(-201_000, -202_200, 60).unwrap();
        assert_eq!(range.lower(), -202_200);
        assert_eq!(range.upper(), -201_000);
    }

    #[test]
    fn normalized_aligns_bounds() {
        let range = TickRange::normalized(-202_190, -201_010, 60).unwrap();
        assert_eq!(range.lower(), -202_200);
        assert_eq!(range.upper(), -201_060);
    }

    #[test]
    fn normalized_rejects_collapsed_bounds() {
        assert_eq!(
            TickRange::normalized(-201_610, -201_650, 60),
            Err(MathError::ZeroWidthRange)
        );
    }

    #[test]
    fn centered_range_uses_multiplier() {
        let range = TickRange::centered(-201_600, 10, 60).unwrap();
        assert_eq!(range.lower(), -202_200);
        assert_eq!(range.upper(), -201_000);
        assert_eq!(range.center(), -201_600);
        assert_eq!(range.half_width(), 600);
    }

    #[test]
    fn new_rejects_unaligned_bounds() {
        assert!(TickRange::new(-202_190, -201_000, 60).is_err());
        assert!(TickRange::new(-202_200, -201_000, 60).is_ok());
    }

    #[test]
    fn contains_is_half_open() {
        let range = TickRange::new(-120, 120, 60).unwrap();
        assert!(range.contains(-120));
        assert!(range.contains(0));
        assert!(!range.contains(120));
    }
}
