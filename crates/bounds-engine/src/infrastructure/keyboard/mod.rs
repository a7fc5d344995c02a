//! Platform-specific raw keyboard devices.
//!
//! Each platform implements [`KeyboardDevice`]; the correct one is selected
//! at compile time via `#[cfg(target_os = ...)]` and re-exported as
//! `NativeKeyboard`:
//!
//! | Module    | OS      | Source                                             |
//! |-----------|---------|----------------------------------------------------|
//! | `windows` | Windows | `WH_KEYBOARD_LL` hook thread pushing into a buffer |
//! | `linux`   | Linux   | evdev `/dev/input/event*` read non-blocking        |
//!
//! [`ScriptedKeyboard`] is always compiled so tests can feed transitions and
//! key-state snapshots without hardware.
//!
//! [`KeyboardDevice`]: crate::application::hotkey::KeyboardDevice

pub mod mock;

pub use mock::ScriptedKeyboard;

use std::collections::VecDeque;

use tracing::trace;

use crate::application::hotkey::{KeyTransition, DEFAULT_BUFFER_CAPACITY};

/// Bounded FIFO of key transitions.  When full, the oldest entry is dropped.
#[derive(Debug)]
pub(crate) struct TransitionBuffer {
    entries: VecDeque<KeyTransition>,
    capacity: usize,
}

impl TransitionBuffer {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub(crate) fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn push(&mut self, transition: KeyTransition) {
        if self.entries.len() == self.capacity {
            if let Some(dropped) = self.entries.pop_front() {
                trace!("key buffer full; dropped {:?}", dropped);
            }
        }
        self.entries.push_back(transition);
    }

    pub(crate) fn drain(&mut self) -> Vec<KeyTransition> {
        self.entries.drain(..).collect()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for TransitionBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_CAPACITY)
    }
}

// ── Windows implementation ────────────────────────────────────────────────────

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(target_os = "windows")]
pub use windows::HookKeyboard as NativeKeyboard;

// ── Linux implementation ──────────────────────────────────────────────────────

#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(target_os = "linux")]
pub use linux::EvdevKeyboard as NativeKeyboard;

// ── Tests ─────────────────────────────────────────────────────────────────────
