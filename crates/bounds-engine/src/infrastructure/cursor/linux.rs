//! Linux cursor access via Xlib `XQueryPointer` / `XWarpPointer`.
//!
//! Coordinates are relative to the root window of the default screen, which
//! spans every Xinerama head, matching the work areas reported by
//! `screen_info::linux`.

use std::sync::{Mutex, PoisonError};

use bounds_core::Int32Point;
use tracing::trace;
use x11::xlib;

use super::CursorError;
use crate::application::confine_cursor::CursorAccessor;

/// An open Xlib connection and its root window.
struct XConnection {
    display: *mut xlib::Display,
    root: xlib::Window,
}

/// Linux X11 implementation of [`CursorAccessor`].
///
/// Xlib connections are not thread-safe, so every call goes through a mutex.
pub struct X11Cursor {
    conn: Mutex<XConnection>,
}

// SAFETY: the raw `Display` pointer is only dereferenced by Xlib while the
// mutex is held, so at most one thread uses the connection at a time.
unsafe impl Send for X11Cursor {}
// SAFETY: see `Send` above; shared access is serialized by the mutex.
unsafe impl Sync for X11Cursor {}

impl X11Cursor {
    /// Opens a connection to the display named by `DISPLAY`.
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::Unavailable`] if the X display cannot be opened.
    pub fn new() -> Result<Self, CursorError> {
        // SAFETY: a null name selects the display from `DISPLAY`.  The
        // returned pointer is freed by `XCloseDisplay` in `Drop`.
        let display = unsafe { xlib::XOpenDisplay(std::ptr::null()) };
        if display.is_null() {
            let display_env = std::env::var("DISPLAY").unwrap_or_else(|_| "<unset>".to_string());
            return Err(CursorError::Unavailable(format!(
                "XOpenDisplay failed; DISPLAY={display_env}"
            )));
        }
        // SAFETY: `display` is a valid non-null pointer returned by XOpenDisplay.
        let root = unsafe { xlib::XDefaultRootWindow(display) };
        Ok(Self {
            conn: Mutex::new(XConnection { display, root }),
        })
    }
}

impl CursorAccessor for X11Cursor {
    fn position(&self) -> Int32Point {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let (mut root_ret, mut child_ret) = (0, 0);
        let (mut root_x, mut root_y, mut win_x, mut win_y) = (0, 0, 0, 0);
        let mut mask = 0;
        // SAFETY: all out-pointers reference live locals; the connection is
        // valid and exclusively held through the mutex guard.
        let same_screen = unsafe {
            xlib::XQueryPointer(
                conn.display,
                conn.root,
                &mut root_ret,
                &mut child_ret,
                &mut root_x,
                &mut root_y,
                &mut win_x,
                &mut win_y,
                &mut mask,
            )
        };
        if same_screen == 0 {
            trace!("pointer is on another X screen");
        }
        Int32Point::new(root_x, root_y)
    }

    fn set_position(&self, point: Int32Point) {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        // SAFETY: the connection is valid and exclusively held; a `None`
        // source window (0) with a destination window warps to absolute
        // root coordinates.
        unsafe {
            xlib::XWarpPointer(conn.display, 0, conn.root, 0, 0, 0, 0, point.x, point.y);
            xlib::XFlush(conn.display);
        }
    }
}

impl Drop for X11Cursor {
    fn drop(&mut self) {
        let conn = self.conn.get_mut().unwrap_or_else(PoisonError::into_inner);
        // SAFETY: the display was opened in `new` and is not used after this.
        unsafe { xlib::XCloseDisplay(conn.display) };
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
