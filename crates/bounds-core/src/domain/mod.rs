//! Domain entities for MouseBounds.
//!
//! This module contains pure geometry and confinement logic with no
//! infrastructure dependencies.  Nothing here reads the cursor, enumerates
//! displays, or touches a keyboard device; those live in the engine crate's
//! infrastructure layer and feed plain values in.

/// Integer 2D points.
pub mod point;

/// Edge-defined rectangles and edge-side detection.
///
/// See [`region::BoundsRegion`] for the axis convention.
pub mod region;

/// Bounce / flip correction and the immutable confinement snapshot.
pub mod confine;
