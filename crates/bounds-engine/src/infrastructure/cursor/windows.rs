//! Windows cursor access via `GetCursorPos` / `SetCursorPos`.
//!
//! Both calls use virtual-desktop coordinates, which is what
//! `EnumDisplayMonitors` reports work areas in, so no translation is needed.

use std::sync::{Mutex, PoisonError};

use bounds_core::Int32Point;
use tracing::trace;
use windows::Win32::Foundation::POINT;
use windows::Win32::UI::WindowsAndMessaging::{GetCursorPos, SetCursorPos};

use super::CursorError;
use crate::application::confine_cursor::CursorAccessor;

/// Windows implementation of [`CursorAccessor`].
///
/// `GetCursorPos` fails while a secure desktop (UAC prompt, lock screen) is
/// shown.  The last successful read is returned in that case so the
/// confinement loop does not react to a bogus position.
pub struct WindowsCursor {
    last_known: Mutex<Int32Point>,
}

impl WindowsCursor {
    /// Creates the cursor accessor, reading the initial position.
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::Unavailable`] if the cursor position cannot be
    /// read at all.
    pub fn new() -> Result<Self, CursorError> {
        let start = read_cursor().map_err(|e| CursorError::Unavailable(e.to_string()))?;
        Ok(Self {
            last_known: Mutex::new(start),
        })
    }
}

fn read_cursor() -> windows::core::Result<Int32Point> {
    let mut point = POINT::default();
    // SAFETY: `point` is a valid, writable POINT for the duration of the call.
    unsafe { GetCursorPos(&mut point)? };
    Ok(Int32Point::new(point.x, point.y))
}

impl CursorAccessor for WindowsCursor {
    fn position(&self) -> Int32Point {
        let mut last = self.last_known.lock().unwrap_or_else(PoisonError::into_inner);
        match read_cursor() {
            Ok(point) => {
                *last = point;
                point
            }
            Err(e) => {
                trace!("GetCursorPos failed: {e}");
                *last
            }
        }
    }

    fn set_position(&self, point: Int32Point) {
        // SAFETY: SetCursorPos takes plain integers and has no pointer arguments.
        if let Err(e) = unsafe { SetCursorPos(point.x, point.y) } {
            trace!("SetCursorPos({point}) failed: {e}");
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
