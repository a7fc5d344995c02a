//! Integer 2D vector used for every cursor position in the system.
//!
//! The OS reports cursor positions as whole pixels, so all confinement math is
//! done on `i32` pairs.  [`Int32Point`] supports component-wise arithmetic with
//! another point or with a scalar, absolute value, clamping into a
//! [`BoundsRegion`], and a total order (x first, then y).

use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

use serde::{Deserialize, Serialize};

use super::region::BoundsRegion;

/// A cursor position (or offset) in whole pixels.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Int32Point {
    // Field order matters: the derived `Ord` compares `x` first and breaks
    // ties on `y`.
    /// Horizontal coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
}

impl Int32Point {
    /// The origin `(0, 0)`.
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Creates a point from its two coordinates.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the point with both coordinates made non-negative.
    pub fn abs(self) -> Self {
        Self::new(self.x.abs(), self.y.abs())
    }

    /// Clamps each coordinate into the region's range.
    ///
    /// `x` is clamped into `[left, right]` and `y` into `[bottom, top]`, using
    /// the region's axis naming (see [`BoundsRegion`]).
    pub fn clamp(self, region: &BoundsRegion) -> Self {
        Self::new(
            clamp_axis(self.x, region.left, region.right),
            clamp_axis(self.y, region.bottom, region.top),
        )
    }

    /// Component-wise division that returns `None` instead of panicking when
    /// either component of `rhs` is zero.
    pub fn checked_div(self, rhs: Self) -> Option<Self> {
        Some(Self::new(self.x.checked_div(rhs.x)?, self.y.checked_div(rhs.y)?))
    }
}

/// Clamps `value` into `[min, max]`.
///
/// Unlike [`i32::clamp`] this never panics when `min > max`; an unordered
/// range resolves to `min`, matching a region built from unordered edges.
pub(crate) fn clamp_axis(value: i32, min: i32, max: i32) -> i32 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

impl fmt::Display for Int32Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for Int32Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl From<Int32Point> for (i32, i32) {
    fn from(p: Int32Point) -> Self {
        (p.x, p.y)
    }
}

// ── Vector arithmetic ─────────────────────────────────────────────────────────

impl Add for Int32Point {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Int32Point {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul for Int32Point {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self::new(self.x * rhs.x, self.y * rhs.y)
    }
}

/// # Panics
///
/// Panics if either component of `rhs` is zero.  Use
/// [`Int32Point::checked_div`] when the divisor is not known to be non-zero.
impl Div for Int32Point {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        Self::new(self.x / rhs.x, self.y / rhs.y)
    }
}

// ── Scalar arithmetic ─────────────────────────────────────────────────────────

impl Add<i32> for Int32Point {
    type Output = Self;
    fn add(self, rhs: i32) -> Self {
        Self::new(self.x + rhs, self.y + rhs)
    }
}

impl Sub<i32> for Int32Point {
    type Output = Self;
    fn sub(self, rhs: i32) -> Self {
        Self::new(self.x - rhs, self.y - rhs)
    }
}

impl Mul<i32> for Int32Point {
    type Output = Self;
    fn mul(self, rhs: i32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<i32> for Int32Point {
    type Output = Self;
    fn div(self, rhs: i32) -> Self {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_vector_arithmetic_is_component_wise() {
        let a = Int32Point::new(10, 20);
        let b = Int32Point::new(3, 4);

        assert_eq!(a + b, Int32Point::new(13, 24));
        assert_eq!(a - b, Int32Point::new(7, 16));
        assert_eq!(a * b, Int32Point::new(30, 80));
        assert_eq!(a / b, Int32Point::new(3, 5));
    }

    #[test]
    fn test_point_scalar_arithmetic_applies_to_both_axes() {
        let p = Int32Point::new(10, -20);

        assert_eq!(p + 5, Int32Point::new(15, -15));
        assert_eq!(p - 5, Int32Point::new(5, -25));
        assert_eq!(p * 2, Int32Point::new(20, -40));
        assert_eq!(p / 10, Int32Point::new(1, -2));
    }

    #[test]
    fn test_point_abs_makes_both_components_non_negative() {
        assert_eq!(Int32Point::new(-3, 7).abs(), Int32Point::new(3, 7));
    }

    #[test]
    fn test_point_checked_div_returns_none_for_zero_component() {
        let p = Int32Point::new(10, 10);
        assert_eq!(p.checked_div(Int32Point::new(0, 2)), None);
        assert_eq!(p.checked_div(Int32Point::new(2, 5)), Some(Int32Point::new(5, 2)));
    }

    #[test]
    fn test_point_ordering_compares_x_then_y() {
        let mut points = vec![
            Int32Point::new(2, 0),
            Int32Point::new(1, 9),
            Int32Point::new(1, 3),
        ];
        points.sort();
        assert_eq!(
            points,
            vec![Int32Point::new(1, 3), Int32Point::new(1, 9), Int32Point::new(2, 0)]
        );
        assert!(Int32Point::new(1, 100) < Int32Point::new(2, -100));
    }

    #[test]
    fn test_point_clamp_limits_each_axis_to_region() {
        let region = BoundsRegion::from_edges(0, 1920, 0, 1080);

        assert_eq!(Int32Point::new(-50, 500).clamp(&region), Int32Point::new(0, 500));
        assert_eq!(Int32Point::new(2000, 2000).clamp(&region), Int32Point::new(1920, 1080));
        assert_eq!(Int32Point::new(10, 10).clamp(&region), Int32Point::new(10, 10));
    }

    #[test]
    fn test_point_display_and_tuple_conversions() {
        let p: Int32Point = (4, -2).into();
        assert_eq!(p.to_string(), "(4, -2)");
        let (x, y): (i32, i32) = p.into();
        assert_eq!((x, y), (4, -2));
    }
}
