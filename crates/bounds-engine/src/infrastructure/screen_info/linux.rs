//! Linux display enumeration via X11.
//!
//! Multi-head desktops are normally one X screen spanning several monitors,
//! so Xinerama is queried first for per-monitor geometry.  Without Xinerama
//! each Xlib screen is reported at offset (0, 0).
//!
//! X11 has no portable work-area query per monitor, so the full monitor
//! geometry is used.  The first head (or the default Xlib screen) is treated
//! as primary.

use std::ptr;

use bounds_core::ScreenRect;
use x11::{xinerama, xlib};

use crate::application::select_display::{DisplayEnumerator, DisplayError, DisplayInfo};

/// Linux X11 implementation of [`DisplayEnumerator`].
pub struct X11DisplayEnumerator;

impl X11DisplayEnumerator {
    /// Creates a new `X11DisplayEnumerator`.
    pub fn new() -> Self {
        Self
    }
}

impl Default for X11DisplayEnumerator {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayEnumerator for X11DisplayEnumerator {
    fn enumerate(&self) -> Result<Vec<DisplayInfo>, DisplayError> {
        // SAFETY: a null name selects the display from `DISPLAY`.  The
        // returned pointer is closed before this function returns.
        let display = unsafe { xlib::XOpenDisplay(ptr::null()) };
        if display.is_null() {
            let display_env = std::env::var("DISPLAY").unwrap_or_else(|_| "<unset>".to_string());
            return Err(DisplayError::Platform(format!(
                "XOpenDisplay failed; DISPLAY={display_env}"
            )));
        }

        // SAFETY: `display` is a valid non-null connection for both calls.
        let heads = unsafe { xinerama_heads(display) };
        let displays = match heads {
            Some(heads) if !heads.is_empty() => displays_from_heads(&heads),
            _ => unsafe { xlib_screens(display) },
        };

        // SAFETY: `display` was opened above and is not used after this.
        unsafe { xlib::XCloseDisplay(display) };

        Ok(displays)
    }
}

/// Names and flags a list of monitor rectangles.  The first is primary.
fn displays_from_heads(heads: &[ScreenRect]) -> Vec<DisplayInfo> {
    heads
        .iter()
        .enumerate()
        .map(|(i, rect)| DisplayInfo::new(format!("SCREEN{i}"), i == 0, *rect))
        .collect()
}

/// Per-monitor rectangles from Xinerama, or `None` if it is not active.
///
/// # Safety
///
/// `display` must be a valid open Xlib connection.
unsafe fn xinerama_heads(display: *mut xlib::Display) -> Option<Vec<ScreenRect>> {
    if xinerama::XineramaIsActive(display) == 0 {
        return None;
    }
    let mut count = 0;
    let info = xinerama::XineramaQueryScreens(display, &mut count);
    if info.is_null() {
        return None;
    }
    let heads = std::slice::from_raw_parts(info, count.max(0) as usize)
        .iter()
        .map(|head| ScreenRect {
            x: i32::from(head.x_org),
            y: i32::from(head.y_org),
            width: head.width.max(0) as u32,
            height: head.height.max(0) as u32,
        })
        .collect();
    xlib::XFree(info.cast());
    Some(heads)
}

/// One entry per Xlib screen, all at the origin.
///
/// # Safety
///
/// `display` must be a valid open Xlib connection.
unsafe fn xlib_screens(display: *mut xlib::Display) -> Vec<DisplayInfo> {
    let screen_count = xlib::XScreenCount(display);
    let default_screen = xlib::XDefaultScreen(display);

    (0..screen_count)
        .map(|screen_num| {
            let rect = ScreenRect {
                x: 0,
                y: 0,
                width: xlib::XDisplayWidth(display, screen_num).max(0) as u32,
                height: xlib::XDisplayHeight(display, screen_num).max(0) as u32,
            };
            DisplayInfo::new(format!("SCREEN{screen_num}"), screen_num == default_screen, rect)
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_displays_from_heads_names_sequentially_and_marks_first_primary() {
        // Arrange
        let heads = [
            ScreenRect {
                x: 0,
                y: 0,
                width: 1920,
                height: 1080,
            },
            ScreenRect {
                x: 1920,
                y: 0,
                width: 1280,
                height: 1024,
            },
        ];

        // Act
        let displays = displays_from_heads(&heads);

        // Assert
        assert_eq!(displays[0].to_string(), "SCREEN0 [Primary]");
        assert_eq!(displays[1].to_string(), "SCREEN1");
        assert_eq!(displays[1].work_area.x, 1920);
    }

    /// Smoke test: if a DISPLAY is available enumeration must succeed and
    /// return at least one display.  If DISPLAY is unset the error is expected.
    #[test]
    fn test_x11_display_enumerator_smoke() {
        let result = X11DisplayEnumerator::new().enumerate();

        if std::env::var("DISPLAY").is_ok() {
            let displays = result.expect("enumerate must succeed when DISPLAY is set");
            assert!(!displays.is_empty(), "must return at least one display");
        } else {
            assert!(result.is_err(), "enumerate must fail when DISPLAY is not set");
        }
    }
}
