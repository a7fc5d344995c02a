//! # bounds-core
//!
//! Shared library for MouseBounds containing the cursor geometry, the
//! confinement correction math, and key code translation tables.
//!
//! It has zero dependencies on OS APIs, UI frameworks, or threads, so every
//! rule about where the cursor may go can be unit-tested on any platform.
//!
//! # Architecture overview
//!
//! MouseBounds keeps the mouse cursor inside one display.  A background loop
//! in `bounds-engine` reads the cursor position and, when it strays into the
//! thin band along a display edge, writes a corrected position back.  A
//! global hotkey toggles the loop on and off.
//!
//! This crate is the pure foundation:
//!
//! - **`domain`** – [`Int32Point`], [`BoundsRegion`] with its edge-side
//!   detection, and [`ConfinementSnapshot`], which decides where a stray
//!   cursor goes ([`ClampMode::Bounce`] or [`ClampMode::Flip`]).
//!
//! - **`keymap`** – [`KeyCode`] (the key a user binds, by name) and
//!   [`RawKeyCode`] (what a raw keyboard device reports), with [`KeyMapper`]
//!   translating between them.

pub mod domain;
pub mod keymap;

pub use domain::confine::{
    bounce, flip, ClampMode, ClampModeParseError, ConfinementSnapshot, ConfinementTuning,
    DEFAULT_BOUNCE_FACTOR, DEFAULT_DETECTION_RANGE, DEFAULT_LOOP_SENSITIVITY,
};
pub use domain::point::Int32Point;
pub use domain::region::{BoundsRegion, ScreenRect, ScreenSide, DEFAULT_SENSITIVITY};
pub use keymap::{KeyCode, KeyConversionMiss, KeyMapper, KeyParseError, RawKeyCode};
