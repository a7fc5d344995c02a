//! Cursor correction math: safe-region derivation and the bounce / flip
//! repositioning strategies.
//!
//! Everything here is pure and allocation-free so that the confinement loop
//! can call [`ConfinementSnapshot::correct`] millions of times per second.
//!
//! # How a correction is chosen
//!
//! ```text
//!   active region ┌──────────────────────────────┐
//!                 │ ┌──────────────────────────┐ │  ← detection_range gap
//!                 │ │       safe region        │ │
//!                 │ │   (no correction here)   │ │
//!                 │ └──────────────────────────┘ │
//!                 └──────────────────────────────┘
//! ```
//!
//! 1. A cursor inside the safe region is left alone.
//! 2. Otherwise each axis is classified against the **active** region with
//!    [`BoundsRegion::determine_horizontal_side`] /
//!    [`BoundsRegion::determine_vertical_side`].
//! 3. Bounce moves a near-edge axis to `edge ± factor` on the same side; flip
//!    moves it to the opposite edge `∓ factor`.  Axes are handled
//!    independently, so a corner intrusion corrects both at once.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::point::Int32Point;
use super::region::{BoundsRegion, ScreenSide};

/// Default inset, in pixels, between the active and the safe region.
pub const DEFAULT_DETECTION_RANGE: i32 = 5;

/// Default distance, in pixels, a corrected cursor lands from the edge.
pub const DEFAULT_BOUNCE_FACTOR: i32 = 15;

/// Default edge sensitivity used by the confinement loop (1% of the span).
pub const DEFAULT_LOOP_SENSITIVITY: f32 = 0.01;

/// Repositioning strategy applied when the cursor leaves the safe region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClampMode {
    /// Push the cursor back into the region on the side it approached.
    #[default]
    Bounce,
    /// Teleport the cursor to the opposite side of the region.
    Flip,
}

/// Error returned when parsing an unknown [`ClampMode`] name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown clamp mode {0:?} (expected \"bounce\" or \"flip\")")]
pub struct ClampModeParseError(pub String);

impl FromStr for ClampMode {
    type Err = ClampModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bounce" => Ok(Self::Bounce),
            "flip" | "mirror" => Ok(Self::Flip),
            _ => Err(ClampModeParseError(s.to_string())),
        }
    }
}

impl fmt::Display for ClampMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bounce => "bounce",
            Self::Flip => "flip",
        })
    }
}

/// Numeric knobs of the confinement loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfinementTuning {
    /// Inset of the safe region on every edge.
    pub detection_range: i32,
    /// Landing distance from the edge after a correction.
    pub bounce_factor: i32,
    /// Edge sensitivity passed to side detection, in `[0, 0.5)`.
    pub sensitivity: f32,
}

impl Default for ConfinementTuning {
    fn default() -> Self {
        Self {
            detection_range: DEFAULT_DETECTION_RANGE,
            bounce_factor: DEFAULT_BOUNCE_FACTOR,
            sensitivity: DEFAULT_LOOP_SENSITIVITY,
        }
    }
}

/// Immutable view of everything the confinement loop needs for one iteration.
///
/// The engine swaps whole snapshots, so a reader never sees a new active
/// region paired with a stale safe region or mode.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfinementSnapshot {
    active: BoundsRegion,
    safe: BoundsRegion,
    mode: ClampMode,
    tuning: ConfinementTuning,
}

impl ConfinementSnapshot {
    /// Builds a snapshot, deriving the safe region from `active`.
    pub fn new(active: BoundsRegion, mode: ClampMode, tuning: ConfinementTuning) -> Self {
        Self {
            active,
            safe: active.inset(tuning.detection_range),
            mode,
            tuning,
        }
    }

    /// Returns a copy with a different active region (safe region re-derived).
    pub fn with_region(&self, active: BoundsRegion) -> Self {
        Self::new(active, self.mode, self.tuning)
    }

    /// Returns a copy with a different clamp mode.
    pub fn with_mode(&self, mode: ClampMode) -> Self {
        Self { mode, ..self.clone() }
    }

    /// Returns a copy with different tuning (safe region re-derived).
    pub fn with_tuning(&self, tuning: ConfinementTuning) -> Self {
        Self::new(self.active, self.mode, tuning)
    }

    /// The enforced rectangle.
    pub fn active_region(&self) -> &BoundsRegion {
        &self.active
    }

    /// The active region inset by `detection_range`.
    pub fn safe_region(&self) -> &BoundsRegion {
        &self.safe
    }

    /// The current repositioning strategy.
    pub fn mode(&self) -> ClampMode {
        self.mode
    }

    /// The current tuning.
    pub fn tuning(&self) -> ConfinementTuning {
        self.tuning
    }

    /// Computes where the cursor should be moved, if anywhere.
    ///
    /// Returns `None` while `point` is inside the safe region.  Otherwise the
    /// returned point is the bounce or flip correction; it can equal `point`
    /// when neither axis is classified as near an edge.
    pub fn correct(&self, point: Int32Point) -> Option<Int32Point> {
        if self.safe.contains(point) {
            return None;
        }
        let ConfinementTuning { bounce_factor, sensitivity, .. } = self.tuning;
        Some(match self.mode {
            ClampMode::Bounce => bounce(&self.active, point, bounce_factor, sensitivity),
            ClampMode::Flip => flip(&self.active, point, bounce_factor, sensitivity),
        })
    }
}

/// Pushes each near-edge axis back inside the region on the same side.
pub fn bounce(region: &BoundsRegion, point: Int32Point, factor: i32, sensitivity: f32) -> Int32Point {
    let mut out = point;
    match region.determine_horizontal_side(point, sensitivity) {
        ScreenSide::Left => out.x = region.left.saturating_add(factor),
        ScreenSide::Right => out.x = region.right.saturating_sub(factor),
        _ => {}
    }
    match region.determine_vertical_side(point, sensitivity) {
        ScreenSide::Bottom => out.y = region.bottom.saturating_add(factor),
        ScreenSide::Top => out.y = region.top.saturating_sub(factor),
        _ => {}
    }
    out
}

/// Moves each near-edge axis to the opposite edge of the region.
pub fn flip(region: &BoundsRegion, point: Int32Point, factor: i32, sensitivity: f32) -> Int32Point {
    let mut out = point;
    match region.determine_horizontal_side(point, sensitivity) {
        ScreenSide::Left => out.x = region.right.saturating_sub(factor),
        ScreenSide::Right => out.x = region.left.saturating_add(factor),
        _ => {}
    }
    match region.determine_vertical_side(point, sensitivity) {
        ScreenSide::Bottom => out.y = region.top.saturating_sub(factor),
        ScreenSide::Top => out.y = region.bottom.saturating_add(factor),
        _ => {}
    }
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn full_hd() -> BoundsRegion {
        BoundsRegion::from_edges(0, 1920, 0, 1080)
    }

    fn tuning(sensitivity: f32) -> ConfinementTuning {
        ConfinementTuning {
            detection_range: 5,
            bounce_factor: 15,
            sensitivity,
        }
    }

    // ── bounce / flip ─────────────────────────────────────────────────────────

    #[test]
    fn test_bounce_moves_left_intrusion_to_left_plus_factor() {
        let out = bounce(&full_hd(), Int32Point::new(5, 500), 15, 0.1);
        assert_eq!(out, Int32Point::new(15, 500));
    }

    #[test]
    fn test_flip_moves_left_intrusion_to_right_minus_factor() {
        let out = flip(&full_hd(), Int32Point::new(5, 500), 15, 0.1);
        assert_eq!(out, Int32Point::new(1905, 500));
    }

    #[test]
    fn test_bounce_corrects_both_axes_in_a_corner() {
        let out = bounce(&full_hd(), Int32Point::new(1918, 1079), 15, 0.01);
        assert_eq!(out, Int32Point::new(1905, 1065));
    }

    #[test]
    fn test_flip_corrects_both_axes_in_a_corner() {
        let out = flip(&full_hd(), Int32Point::new(1, 2), 15, 0.01);
        assert_eq!(out, Int32Point::new(1905, 1065));
    }

    #[test]
    fn test_flip_bottom_goes_to_top_minus_factor() {
        let out = flip(&full_hd(), Int32Point::new(960, 0), 15, 0.01);
        assert_eq!(out, Int32Point::new(960, 1065));
    }

    #[test]
    fn test_bounce_leaves_point_unchanged_when_no_side_detected() {
        let p = Int32Point::new(960, 540);
        assert_eq!(bounce(&full_hd(), p, 15, 0.1), p);
    }

    // ── ConfinementSnapshot ───────────────────────────────────────────────────

    #[test]
    fn test_snapshot_derives_safe_region_from_detection_range() {
        let snap = ConfinementSnapshot::new(full_hd(), ClampMode::Bounce, tuning(0.1));
        assert_eq!(*snap.safe_region(), BoundsRegion::from_edges(5, 1915, 5, 1075));
    }

    #[test]
    fn test_snapshot_corrects_point_inside_active_but_outside_safe() {
        let snap = ConfinementSnapshot::new(full_hd(), ClampMode::Bounce, tuning(0.1));
        let p = Int32Point::new(3, 500);
        assert!(snap.active_region().contains(p));
        assert_eq!(snap.correct(p), Some(Int32Point::new(15, 500)));
    }

    #[test]
    fn test_snapshot_returns_none_inside_safe_region() {
        let snap = ConfinementSnapshot::new(full_hd(), ClampMode::Flip, tuning(0.1));
        assert_eq!(snap.correct(Int32Point::new(5, 5)), None);
        assert_eq!(snap.correct(Int32Point::new(960, 540)), None);
    }

    #[test]
    fn test_snapshot_flip_mode_uses_flip_strategy() {
        let snap = ConfinementSnapshot::new(full_hd(), ClampMode::Flip, tuning(0.1));
        assert_eq!(snap.correct(Int32Point::new(5, 500)), Some(Int32Point::new(1905, 500)));
    }

    #[test]
    fn test_snapshot_with_region_rederives_safe_region() {
        let snap = ConfinementSnapshot::new(full_hd(), ClampMode::Bounce, tuning(0.1))
            .with_region(BoundsRegion::from_edges(1920, 3840, 0, 1080));
        assert_eq!(*snap.safe_region(), BoundsRegion::from_edges(1925, 3835, 5, 1075));
    }

    #[test]
    fn test_snapshot_with_mode_keeps_regions() {
        let snap = ConfinementSnapshot::new(full_hd(), ClampMode::Bounce, tuning(0.1));
        let flipped = snap.with_mode(ClampMode::Flip);
        assert_eq!(flipped.mode(), ClampMode::Flip);
        assert_eq!(flipped.safe_region(), snap.safe_region());
    }

    #[test]
    fn test_snapshot_with_tuning_rederives_safe_region() {
        let snap = ConfinementSnapshot::new(full_hd(), ClampMode::Bounce, tuning(0.1))
            .with_tuning(ConfinementTuning {
                detection_range: 20,
                ..tuning(0.1)
            });
        assert_eq!(*snap.safe_region(), BoundsRegion::from_edges(20, 1900, 20, 1060));
    }

    #[test]
    fn test_snapshot_with_extreme_tuning_saturates() {
        // Arrange
        let region = BoundsRegion::from_edges(2560, 4480, 0, 1080);
        let extreme = ConfinementTuning {
            detection_range: i32::MAX,
            bounce_factor: i32::MAX,
            sensitivity: 0.1,
        };

        // Act
        let snapshot = ConfinementSnapshot::new(region, ClampMode::Bounce, extreme);
        let corrected = snapshot.correct(Int32Point::new(2565, 500));

        // Assert
        assert_eq!(corrected, Some(Int32Point::new(i32::MAX, 500)));
        let flipped = flip(&region, Int32Point::new(2565, 500), i32::MAX, 0.1);
        assert_eq!(flipped.x, 4480 - i32::MAX);
    }

    // ── ClampMode parsing ─────────────────────────────────────────────────────

    #[test]
    fn test_clamp_mode_parses_case_insensitively() {
        assert_eq!("Bounce".parse(), Ok(ClampMode::Bounce));
        assert_eq!(" FLIP ".parse(), Ok(ClampMode::Flip));
        assert_eq!("mirror".parse(), Ok(ClampMode::Flip));
        assert!("wrap".parse::<ClampMode>().is_err());
    }

    #[test]
    fn test_clamp_mode_display_round_trips_through_from_str() {
        for mode in [ClampMode::Bounce, ClampMode::Flip] {
            assert_eq!(mode.to_string().parse(), Ok(mode));
        }
    }
}
