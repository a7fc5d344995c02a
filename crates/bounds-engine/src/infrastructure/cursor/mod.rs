//! Platform-specific cursor access.
//!
//! Each platform implements [`CursorAccessor`]; the correct one is selected
//! at compile time via `#[cfg(target_os = ...)]` and re-exported as
//! `NativeCursor`:
//!
//! | Module    | OS      | API used                                  |
//! |-----------|---------|-------------------------------------------|
//! | `windows` | Windows | `GetCursorPos` + `SetCursorPos`           |
//! | `linux`   | Linux   | `XQueryPointer` + `XWarpPointer` (Xlib)   |
//!
//! [`RecordingCursor`] is always compiled so tests on any platform can drive
//! the confinement engine without moving the real pointer.
//!
//! [`CursorAccessor`]: crate::application::confine_cursor::CursorAccessor

pub mod mock;

pub use mock::RecordingCursor;

use thiserror::Error;

/// Error type for opening a native cursor.
#[derive(Debug, Error)]
pub enum CursorError {
    /// The platform cursor API is unavailable (e.g. no X display).
    #[error("cursor API unavailable: {0}")]
    Unavailable(String),
}

// ── Windows implementation ────────────────────────────────────────────────────

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(target_os = "windows")]
pub use windows::WindowsCursor as NativeCursor;

// ── Linux implementation ──────────────────────────────────────────────────────

#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(target_os = "linux")]
pub use linux::X11Cursor as NativeCursor;
