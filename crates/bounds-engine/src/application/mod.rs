//! Application layer use cases for mouse-bounds.
//!
//! Use cases here orchestrate the `bounds_core` domain types and depend only
//! on traits ([`CursorAccessor`](confine_cursor::CursorAccessor),
//! [`KeyboardDevice`](hotkey::KeyboardDevice),
//! [`DisplayEnumerator`](select_display::DisplayEnumerator)).  The OS-backed
//! implementations live in `infrastructure`.
//!
//! # Sub-modules
//!
//! - **`confine_cursor`** – The confinement loop thread that keeps the cursor
//!   inside the active region.  Runs unthrottled while active.
//!
//! - **`hotkey`** – Polls a raw keyboard device on a tokio task and reports
//!   presses of the monitored key, using a buffered or state-snapshot
//!   detection strategy.
//!
//! - **`select_display`** – Enumerates displays and tracks which one the
//!   cursor is confined to, with fallback to the primary display.
//!
//! - **`session`** – Host that wires the three together: the hotkey toggles
//!   confinement, display/mode/key changes are applied at runtime.

pub mod confine_cursor;
pub mod hotkey;
pub mod select_display;
pub mod session;
