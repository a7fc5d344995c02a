//! Scripted keyboard device for tests.
//!
//! [`ScriptedKeyboard`] is a cheaply cloneable handle: give one clone to the
//! hotkey engine (which takes ownership of its device) and keep another in the
//! test to press keys and inspect lifecycle counters.
//!
//! ```ignore
//! let keyboard = ScriptedKeyboard::new();
//! let engine = HotkeyEngine::start(Box::new(keyboard.clone()), settings, KeyCode::F6, cb)?;
//! keyboard.tap(RawKeyCode(64));
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bounds_core::RawKeyCode;

use super::TransitionBuffer;
use crate::application::hotkey::{HotkeyError, KeyTransition, KeyboardDevice};

#[derive(Default)]
struct KeyboardState {
    buffer: TransitionBuffer,
    held: Vec<RawKeyCode>,
    snapshots: VecDeque<Vec<RawKeyCode>>,
    acquired: bool,
    acquire_count: usize,
    release_count: usize,
    read_count: usize,
    fail_acquire: bool,
    fail_reads: bool,
}

/// A keyboard device driven entirely from test code.
///
/// [`press`](Self::press) and [`release`](Self::release) update both the
/// transition buffer and the held-key state, so either detection strategy
/// sees a consistent keyboard.  [`queue_snapshot`](Self::queue_snapshot)
/// overrides the held state for exactly one `pressed_keys` read.
#[derive(Clone, Default)]
pub struct ScriptedKeyboard {
    state: Arc<Mutex<KeyboardState>>,
}

impl ScriptedKeyboard {
    /// Creates an idle keyboard with no keys held.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next [`acquire`](KeyboardDevice::acquire) calls fail.
    pub fn fail_acquire(&self, fail: bool) {
        self.lock().fail_acquire = fail;
    }

    /// Makes reads fail with [`HotkeyError::Device`].
    pub fn fail_reads(&self, fail: bool) {
        self.lock().fail_reads = fail;
    }

    /// Key goes down.
    pub fn press(&self, key: RawKeyCode) {
        let mut state = self.lock();
        state.buffer.push(KeyTransition::pressed(key));
        if !state.held.contains(&key) {
            state.held.push(key);
        }
    }

    /// Key comes up.
    pub fn release(&self, key: RawKeyCode) {
        let mut state = self.lock();
        state.buffer.push(KeyTransition::released(key));
        state.held.retain(|k| *k != key);
    }

    /// Press followed by release, both buffered before the next poll.
    pub fn tap(&self, key: RawKeyCode) {
        self.press(key);
        self.release(key);
    }

    /// Returns `keys` from the next `pressed_keys` read instead of the held set.
    pub fn queue_snapshot(&self, keys: impl IntoIterator<Item = RawKeyCode>) {
        self.lock().snapshots.push_back(keys.into_iter().collect());
    }

    /// `true` between a successful acquire and the matching release.
    pub fn is_acquired(&self) -> bool {
        self.lock().acquired
    }

    /// Number of successful acquires.
    pub fn acquire_count(&self) -> usize {
        self.lock().acquire_count
    }

    /// Number of releases.
    pub fn release_count(&self) -> usize {
        self.lock().release_count
    }

    /// Number of buffered or snapshot reads.
    pub fn read_count(&self) -> usize {
        self.lock().read_count
    }

    /// Current buffer capacity.
    pub fn buffer_capacity(&self) -> usize {
        self.lock().buffer.capacity()
    }

    /// `true` once every queued snapshot has been read.
    pub fn snapshots_consumed(&self) -> bool {
        self.lock().snapshots.is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, KeyboardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyboardDevice for ScriptedKeyboard {
    fn acquire(&mut self) -> Result<(), HotkeyError> {
        let mut state = self.lock();
        if state.fail_acquire {
            return Err(HotkeyError::DeviceAcquisitionFailure(
                "scripted acquisition failure".to_string(),
            ));
        }
        state.acquired = true;
        state.acquire_count += 1;
        Ok(())
    }

    fn set_buffer_capacity(&mut self, capacity: usize) {
        self.lock().buffer.set_capacity(capacity);
    }

    fn drain_buffered(&mut self) -> Result<Vec<KeyTransition>, HotkeyError> {
        let mut state = self.lock();
        state.read_count += 1;
        if state.fail_reads {
            return Err(HotkeyError::Device("scripted read failure".to_string()));
        }
        Ok(state.buffer.drain())
    }

    fn pressed_keys(&mut self) -> Result<Vec<RawKeyCode>, HotkeyError> {
        let mut state = self.lock();
        state.read_count += 1;
        if state.fail_reads {
            return Err(HotkeyError::Device("scripted read failure".to_string()));
        }
        Ok(match state.snapshots.pop_front() {
            Some(keys) => keys,
            None => state.held.clone(),
        })
    }

    fn release(&mut self) {
        let mut state = self.lock();
        state.buffer.clear();
        if state.acquired {
            state.acquired = false;
            state.release_count += 1;
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
