//! Windows display enumeration via `EnumDisplayMonitors` / `GetMonitorInfoW`.
//!
//! Reports each monitor's work area (`rcWork`), which excludes the taskbar,
//! and its GDI device name (`\\.\DISPLAY1`, stripped to `DISPLAY1`).

use bounds_core::ScreenRect;
use windows::core::BOOL;
use windows::Win32::Foundation::{LPARAM, RECT};
use windows::Win32::Graphics::Gdi::{
    EnumDisplayMonitors, GetMonitorInfoW, HDC, HMONITOR, MONITORINFO, MONITORINFOEXW,
    MONITORINFOF_PRIMARY,
};

use crate::application::select_display::{DisplayEnumerator, DisplayError, DisplayInfo};

/// Windows implementation of [`DisplayEnumerator`].
pub struct WindowsDisplayEnumerator;

impl WindowsDisplayEnumerator {
    /// Creates a new `WindowsDisplayEnumerator`.
    pub fn new() -> Self {
        Self
    }
}

impl Default for WindowsDisplayEnumerator {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayEnumerator for WindowsDisplayEnumerator {
    fn enumerate(&self) -> Result<Vec<DisplayInfo>, DisplayError> {
        let mut displays: Vec<DisplayInfo> = Vec::new();

        // SAFETY: `lpfn` has the correct signature.  `dwData` points to
        // `displays`, which outlives this synchronous call.  A `None` HDC
        // enumerates every monitor on the virtual desktop.
        let ok = unsafe {
            EnumDisplayMonitors(
                None,
                None,
                Some(monitor_enum_proc),
                LPARAM(&mut displays as *mut Vec<DisplayInfo> as isize),
            )
        };

        if !ok.as_bool() {
            return Err(DisplayError::Platform(
                "EnumDisplayMonitors failed".to_string(),
            ));
        }
        Ok(displays)
    }
}

/// Converts a NUL-padded UTF-16 device name.
fn device_name(raw: &[u16]) -> String {
    let len = raw.iter().position(|&c| c == 0).unwrap_or(raw.len());
    String::from_utf16_lossy(&raw[..len])
}

/// Win32 monitor enumeration callback.
///
/// # Safety
///
/// Called by Win32 inside `EnumDisplayMonitors`.  `lparam` must be a valid
/// pointer to `Vec<DisplayInfo>` for the duration of the enumeration call.
unsafe extern "system" fn monitor_enum_proc(
    hmonitor: HMONITOR,
    _hdc: HDC,
    _lprc_clip: *mut RECT,
    lparam: LPARAM,
) -> BOOL {
    let displays = &mut *(lparam.0 as *mut Vec<DisplayInfo>);

    // SAFETY: MONITORINFOEXW is plain data; zero initialization is valid.
    let mut info: MONITORINFOEXW = std::mem::zeroed();
    info.monitorInfo.cbSize = std::mem::size_of::<MONITORINFOEXW>() as u32;

    // SAFETY: `hmonitor` is a valid handle provided by Win32, and `cbSize`
    // tells it the buffer is the extended struct.
    if GetMonitorInfoW(hmonitor, &mut info as *mut MONITORINFOEXW as *mut MONITORINFO).as_bool() {
        let rc = info.monitorInfo.rcWork;
        displays.push(DisplayInfo::new(
            device_name(&info.szDevice),
            info.monitorInfo.dwFlags & MONITORINFOF_PRIMARY != 0,
            ScreenRect {
                x: rc.left,
                y: rc.top,
                width: (rc.right - rc.left).max(0) as u32,
                height: (rc.bottom - rc.top).max(0) as u32,
            },
        ));
    }

    BOOL(1) // continue enumeration
}

// ── Tests ─────────────────────────────────────────────────────────────────────
