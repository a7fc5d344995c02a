//! Axis-aligned integer rectangle that the cursor is confined to.
//!
//! # Axis convention
//!
//! A [`BoundsRegion`] is described by four independent edges rather than an
//! origin plus a size.  The vertical edges are named as if Y grows *upward*:
//! `bottom` is the edge with the **smaller** Y value and `top` the edge with the
//! **larger** Y value, like the first quadrant of a Cartesian plane.
//!
//! The operating system's screen coordinates grow *downward* from a top-left
//! origin, so on screen the `bottom` edge is actually drawn at the top of the
//! display.  The naming is kept anyway: it makes the horizontal and vertical
//! edge logic exact mirrors of each other (`left`/`bottom` are always the low
//! edge, `right`/`top` always the high edge), which is what
//! [`BoundsRegion::determine_vertical_side`] and the bounce/flip strategies
//! rely on.  The only place the two conventions meet is
//! [`BoundsRegion::from_work_area`].

use std::fmt;

use serde::{Deserialize, Serialize};

use super::point::{clamp_axis, Int32Point};

/// Default edge sensitivity for the side-detection helpers (10% of the span).
pub const DEFAULT_SENSITIVITY: f32 = 0.1;

/// Which edge of a region a point lies near.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScreenSide {
    /// Not near any edge on the tested axis.
    None,
    /// Near the low horizontal edge.
    Left,
    /// Near the high horizontal edge.
    Right,
    /// Near the low vertical edge (smaller Y).
    Bottom,
    /// Near the high vertical edge (larger Y).
    Top,
}

/// A display rectangle exactly as the OS reports it: top-left origin plus size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScreenRect {
    /// X of the top-left corner in virtual desktop coordinates (may be negative).
    pub x: i32,
    /// Y of the top-left corner in virtual desktop coordinates (may be negative).
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// A rectangle defined by four independent edges.
///
/// Callers are expected to supply `left <= right` and `bottom <= top`.
/// [`BoundsRegion::from_edges`] does not enforce this; [`BoundsRegion::from_size`]
/// and [`BoundsRegion::from_work_area`] always produce ordered edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundsRegion {
    /// Low horizontal edge (inclusive).
    pub left: i32,
    /// High horizontal edge (inclusive).
    pub right: i32,
    /// Low vertical edge (inclusive, smaller Y).
    pub bottom: i32,
    /// High vertical edge (inclusive, larger Y).
    pub top: i32,
}

impl BoundsRegion {
    /// Creates a region from raw edges without validating their order.
    pub const fn from_edges(left: i32, right: i32, bottom: i32, top: i32) -> Self {
        Self { left, right, bottom, top }
    }

    /// Creates a `width` × `height` region anchored at the origin.
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::from_edges(0, span(width), 0, span(height))
    }

    /// Converts an OS work-area rectangle into a region.
    ///
    /// The rectangle's origin Y becomes `bottom` and `y + height` becomes `top`
    /// (see the module docs for why the names are flipped).
    pub fn from_work_area(rect: ScreenRect) -> Self {
        let left = rect.x;
        let bottom = rect.y;
        Self::from_edges(
            left,
            left.saturating_add(span(rect.width)),
            bottom,
            bottom.saturating_add(span(rect.height)),
        )
    }

    /// Horizontal span, `|right - left|`.
    pub fn width(&self) -> i32 {
        self.right.saturating_sub(self.left).saturating_abs()
    }

    /// Vertical span, `|top - bottom|`.
    pub fn height(&self) -> i32 {
        self.top.saturating_sub(self.bottom).saturating_abs()
    }

    /// Returns the region shrunk by `amount` pixels on all four edges.
    ///
    /// Insetting by more than half the span yields unordered edges, in which
    /// case [`contains`](Self::contains) is `false` for every point.
    pub fn inset(&self, amount: i32) -> Self {
        Self::from_edges(
            self.left.saturating_add(amount),
            self.right.saturating_sub(amount),
            self.bottom.saturating_add(amount),
            self.top.saturating_sub(amount),
        )
    }

    // ── Containment ───────────────────────────────────────────────────────────

    /// `true` if `left <= point.x <= right`.
    pub fn contains_horizontal(&self, point: Int32Point) -> bool {
        point.x >= self.left && point.x <= self.right
    }

    /// `true` if `bottom <= point.y <= top`.
    pub fn contains_vertical(&self, point: Int32Point) -> bool {
        point.y >= self.bottom && point.y <= self.top
    }

    /// `true` if the point lies inside the region or on any of its edges.
    pub fn contains(&self, point: Int32Point) -> bool {
        self.contains_horizontal(point) && self.contains_vertical(point)
    }

    /// Returns `point` unchanged if contained, otherwise clamps each axis
    /// independently into range.  Idempotent.
    pub fn clamp(&self, point: Int32Point) -> Int32Point {
        if self.contains(point) {
            return point;
        }
        Int32Point::new(
            clamp_axis(point.x, self.left, self.right),
            clamp_axis(point.y, self.bottom, self.top),
        )
    }

    // ── Side detection ────────────────────────────────────────────────────────

    /// Classifies `point` as near the left edge, the right edge, or neither.
    ///
    /// `relative_x = (x - left) / width`; the point is `Left` when
    /// `relative_x <= sensitivity` and `Right` when `relative_x >= 1 - sensitivity`.
    /// `sensitivity` should lie in `[0, 0.5)`.  A zero-width region always
    /// yields [`ScreenSide::None`].
    pub fn determine_horizontal_side(&self, point: Int32Point, sensitivity: f32) -> ScreenSide {
        match relative_position(point.x, self.left, self.width()) {
            Some(r) if r <= sensitivity => ScreenSide::Left,
            Some(r) if r >= 1.0 - sensitivity => ScreenSide::Right,
            _ => ScreenSide::None,
        }
    }

    /// Vertical mirror of [`determine_horizontal_side`](Self::determine_horizontal_side),
    /// measured from `bottom` over `height` and returning `Bottom`/`Top`.
    pub fn determine_vertical_side(&self, point: Int32Point, sensitivity: f32) -> ScreenSide {
        match relative_position(point.y, self.bottom, self.height()) {
            Some(r) if r <= sensitivity => ScreenSide::Bottom,
            Some(r) if r >= 1.0 - sensitivity => ScreenSide::Top,
            _ => ScreenSide::None,
        }
    }
}

/// Position of `value` along a span starting at `origin`, as a fraction of `span`.
///
/// Returns `None` for an empty span instead of dividing by zero.
fn relative_position(value: i32, origin: i32, span: i32) -> Option<f32> {
    if span == 0 {
        return None;
    }
    Some((i64::from(value) - i64::from(origin)) as f32 / span as f32)
}

/// Pixel extent as a signed coordinate delta, saturating at `i32::MAX`.
fn span(extent: u32) -> i32 {
    i32::try_from(extent).unwrap_or(i32::MAX)
}

impl From<ScreenRect> for BoundsRegion {
    fn from(rect: ScreenRect) -> Self {
        Self::from_work_area(rect)
    }
}

impl fmt::Display for BoundsRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} ({}<=x<={}, {}<=y<={})",
            self.width(),
            self.height(),
            self.left,
            self.right,
            self.bottom,
            self.top
        )
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
