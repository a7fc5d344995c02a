//! Platform-specific display enumeration.
//!
//! Detects the connected displays and their work areas so the session can
//! build a confinement region for the selected one.
//!
//! # Platform implementations
//!
//! Each platform implements [`DisplayEnumerator`]; the correct one is
//! selected at compile time via `#[cfg(target_os = ...)]` and re-exported as
//! `NativeDisplayEnumerator`:
//!
//! | Module    | OS      | API used                                           |
//! |-----------|---------|----------------------------------------------------|
//! | `windows` | Windows | `EnumDisplayMonitors` + `GetMonitorInfoW` (`rcWork`) |
//! | `linux`   | Linux   | `XineramaQueryScreens`, falling back to Xlib screens |
//!
//! A [`MockScreenEnumerator`] is always compiled (not guarded by `#[cfg]`) so
//! tests on any platform can use it without a physical display.

use bounds_core::ScreenRect;

use crate::application::select_display::{DisplayEnumerator, DisplayError, DisplayInfo};

// ── Windows implementation ────────────────────────────────────────────────────

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(target_os = "windows")]
pub use windows::WindowsDisplayEnumerator as NativeDisplayEnumerator;

// ── Linux implementation ──────────────────────────────────────────────────────

#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(target_os = "linux")]
pub use linux::X11DisplayEnumerator as NativeDisplayEnumerator;

// ── Mock implementation (always compiled for tests) ───────────────────────────

/// A display enumerator that returns a fixed list.
///
/// Does not make any OS calls; the display list is provided at construction
/// time.
pub struct MockScreenEnumerator {
    /// The displays returned by every `enumerate` call.
    pub displays: Vec<DisplayInfo>,
}

impl MockScreenEnumerator {
    /// A single 1920×1080 primary display.
    pub fn single_1080p() -> Self {
        Self {
            displays: vec![DisplayInfo::new(
                r"\\.\DISPLAY1",
                true,
                ScreenRect {
                    x: 0,
                    y: 0,
                    width: 1920,
                    height: 1080,
                },
            )],
        }
    }

    /// Two 2560×1440 displays side by side; the left one is primary.
    pub fn dual_1440p() -> Self {
        Self {
            displays: vec![
                DisplayInfo::new(
                    r"\\.\DISPLAY1",
                    true,
                    ScreenRect {
                        x: 0,
                        y: 0,
                        width: 2560,
                        height: 1440,
                    },
                ),
                DisplayInfo::new(
                    r"\\.\DISPLAY2",
                    false,
                    ScreenRect {
                        x: 2560,
                        y: 0,
                        width: 2560,
                        height: 1440,
                    },
                ),
            ],
        }
    }
}

impl DisplayEnumerator for MockScreenEnumerator {
    /// Returns the displays provided at construction time (never fails).
    fn enumerate(&self) -> Result<Vec<DisplayInfo>, DisplayError> {
        Ok(self.displays.clone())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
