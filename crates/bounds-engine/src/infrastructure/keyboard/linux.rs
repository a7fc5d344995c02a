//! Linux keyboard device reading evdev `/dev/input/event*` directly.
//!
//! Reading evdev bypasses X11/Wayland focus rules, so the hotkey works no
//! matter which window has focus.  The device is never grabbed; other
//! applications keep receiving every key.
//!
//! # Permissions
//!
//! The user must be able to read `/dev/input/event*`, normally by being in
//! the `input` group.  Otherwise [`acquire`](KeyboardDevice::acquire) fails
//! with [`HotkeyError::DeviceAcquisitionFailure`].
//!
//! evdev `KEY_*` codes are the [`RawKeyCode`] numbering, so no translation
//! is needed.

use std::io;
use std::os::fd::AsRawFd;
use std::path::{Path, PathBuf};

use bounds_core::RawKeyCode;
use evdev::{Device, InputEventKind, Key};
use tracing::{debug, info};

use super::TransitionBuffer;
use crate::application::hotkey::{HotkeyError, KeyTransition, KeyboardDevice};

/// evdev key event values.
const VALUE_RELEASED: i32 = 0;
const VALUE_PRESSED: i32 = 1;

/// evdev implementation of [`KeyboardDevice`].
pub struct EvdevKeyboard {
    path: Option<PathBuf>,
    device: Option<Device>,
    buffer: TransitionBuffer,
}

impl EvdevKeyboard {
    /// A keyboard that opens `path`, or the first device that looks like a
    /// keyboard when `path` is `None`.
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path,
            device: None,
            buffer: TransitionBuffer::default(),
        }
    }

    fn device_mut(&mut self) -> Result<&mut Device, HotkeyError> {
        self.device
            .as_mut()
            .ok_or_else(|| HotkeyError::Device("keyboard not acquired".to_string()))
    }
}

/// `true` for devices that report letter keys (excludes power buttons, lid
/// switches, and mice that advertise a handful of keys).
fn looks_like_keyboard(device: &Device) -> bool {
    device
        .supported_keys()
        .is_some_and(|keys| keys.contains(Key::KEY_A) && keys.contains(Key::KEY_ENTER))
}

fn open_device(path: &Path) -> Result<Device, HotkeyError> {
    Device::open(path).map_err(|e| {
        HotkeyError::DeviceAcquisitionFailure(format!("{}: {e}", path.display()))
    })
}

fn find_keyboard() -> Result<(PathBuf, Device), HotkeyError> {
    evdev::enumerate()
        .find(|(_, device)| looks_like_keyboard(device))
        .ok_or_else(|| {
            HotkeyError::DeviceAcquisitionFailure(
                "no readable keyboard under /dev/input (is the user in the `input` group?)"
                    .to_string(),
            )
        })
}

/// Switches the device fd to non-blocking so reads with nothing pending
/// return `WouldBlock` instead of parking the poll task.
fn set_nonblocking(device: &Device) -> io::Result<()> {
    let fd = device.as_raw_fd();
    // SAFETY: `fd` is an open descriptor owned by `device` for this call.
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
    if flags < 0 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: as above; only the O_NONBLOCK bit is added.
    if unsafe { libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) } < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

fn read_error(e: io::Error) -> HotkeyError {
    HotkeyError::Device(e.to_string())
}

impl KeyboardDevice for EvdevKeyboard {
    fn acquire(&mut self) -> Result<(), HotkeyError> {
        if self.device.is_some() {
            return Ok(());
        }
        let (path, device) = match &self.path {
            Some(path) => (path.clone(), open_device(path)?),
            None => find_keyboard()?,
        };
        set_nonblocking(&device)
            .map_err(|e| HotkeyError::DeviceAcquisitionFailure(e.to_string()))?;
        info!(
            "reading keys from {} ({})",
            path.display(),
            device.name().unwrap_or("unnamed device")
        );
        self.path = Some(path);
        self.device = Some(device);
        Ok(())
    }

    fn set_buffer_capacity(&mut self, capacity: usize) {
        self.buffer.set_capacity(capacity);
    }

    fn drain_buffered(&mut self) -> Result<Vec<KeyTransition>, HotkeyError> {
        let device = self.device.as_mut().ok_or_else(|| {
            HotkeyError::Device("keyboard not acquired".to_string())
        })?;

        match device.fetch_events() {
            Ok(events) => {
                for event in events {
                    let InputEventKind::Key(key) = event.kind() else {
                        continue;
                    };
                    let raw = RawKeyCode(key.code());
                    // Autorepeat (value 2) is not a new press.
                    match event.value() {
                        VALUE_PRESSED => self.buffer.push(KeyTransition::pressed(raw)),
                        VALUE_RELEASED => self.buffer.push(KeyTransition::released(raw)),
                        _ => {}
                    }
                }
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
            Err(e) => return Err(read_error(e)),
        }

        Ok(self.buffer.drain())
    }

    fn pressed_keys(&mut self) -> Result<Vec<RawKeyCode>, HotkeyError> {
        let state = self.device_mut()?.get_key_state().map_err(read_error)?;
        Ok(state.iter().map(|key| RawKeyCode(key.code())).collect())
    }

    fn release(&mut self) {
        if self.device.take().is_some() {
            debug!("evdev keyboard released");
        }
        self.buffer.clear();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
