//! Windows keyboard device built on a `WH_KEYBOARD_LL` hook.
//!
//! [`acquire`](KeyboardDevice::acquire) starts a dedicated thread that
//! installs a low-level keyboard hook and pumps its message loop.  The hook
//! callback pushes every key-down and key-up into a [`TransitionBuffer`]
//! shared with the device, so presses that happen between two polls are all
//! queued, including a press and release that both fall inside one interval.
//! VK codes are translated with
//! [`KeyMapper::windows_vk_to_raw`](bounds_core::KeyMapper::windows_vk_to_raw).
//!
//! The hook never consumes a key: every event is passed on with
//! `CallNextHookEx`, so other applications keep receiving it.  Autorepeat
//! key-downs for a key that is already down are not buffered.
//!
//! Hook callbacks carry no user data, so the active buffer is published
//! through a process-wide slot.  Only one `HookKeyboard` can be acquired at a
//! time.
//!
//! # Safety
//!
//! `unsafe` is used only for Win32 FFI calls, each annotated with `// SAFETY:`.

use std::sync::mpsc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use bounds_core::{KeyMapper, RawKeyCode};
use tracing::{debug, info, warn};
use windows::Win32::Foundation::{LPARAM, LRESULT, WPARAM};
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::Input::KeyboardAndMouse::GetAsyncKeyState;
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, DispatchMessageW, GetMessageW, PeekMessageW, PostThreadMessageW,
    SetWindowsHookExW, UnhookWindowsHookEx, HC_ACTION, KBDLLHOOKSTRUCT, MSG, PM_NOREMOVE,
    WH_KEYBOARD_LL, WM_KEYDOWN, WM_KEYUP, WM_QUIT, WM_SYSKEYDOWN, WM_SYSKEYUP,
};

use super::TransitionBuffer;
use crate::application::hotkey::{HotkeyError, KeyTransition, KeyboardDevice};

/// Name given to the hook thread (visible in debuggers).
const HOOK_THREAD_NAME: &str = "mouse-bounds-keyhook";

/// First and last VK codes sampled for key-state snapshots (mouse buttons are skipped).
const FIRST_VK: u8 = 0x08;
const LAST_VK: u8 = 0xFE;

/// Buffer of the currently acquired device, read by [`keyboard_hook_proc`].
static HOOK_SINK: Mutex<Option<Arc<Mutex<HookState>>>> = Mutex::new(None);

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// State written by the hook callback and drained by the poll task.
struct HookState {
    buffer: TransitionBuffer,
    down: [bool; 256],
}

impl HookState {
    fn new() -> Self {
        Self {
            buffer: TransitionBuffer::default(),
            down: [false; 256],
        }
    }

    /// Buffers one hook event.  Repeated downs and unmapped VKs are dropped.
    fn record(&mut self, vk: u8, pressed: bool) {
        let was = std::mem::replace(&mut self.down[usize::from(vk)], pressed);
        if was == pressed {
            return;
        }
        if let Some(raw) = KeyMapper::windows_vk_to_raw(vk) {
            self.buffer.push(if pressed {
                KeyTransition::pressed(raw)
            } else {
                KeyTransition::released(raw)
            });
        }
    }
}

/// The running hook thread.
struct HookThread {
    thread_id: u32,
    handle: JoinHandle<()>,
}

/// Low-level keyboard hook implementation of [`KeyboardDevice`].
pub struct HookKeyboard {
    state: Arc<Mutex<HookState>>,
    hook: Option<HookThread>,
}

impl HookKeyboard {
    /// Creates the device.  No hook is installed until [`acquire`](KeyboardDevice::acquire).
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(HookState::new())),
            hook: None,
        }
    }

    /// Removes this device's buffer from the hook slot, if it is still there.
    fn unpublish(&self) {
        let mut sink = lock(&HOOK_SINK);
        if sink.as_ref().is_some_and(|s| Arc::ptr_eq(s, &self.state)) {
            *sink = None;
        }
    }
}

impl Default for HookKeyboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for HookKeyboard {
    fn drop(&mut self) {
        self.release();
    }
}

fn is_vk_down(vk: u8) -> bool {
    // SAFETY: GetAsyncKeyState takes a plain integer and has no pointer arguments.
    let state = unsafe { GetAsyncKeyState(i32::from(vk)) };
    // High bit set means the key is currently down.
    state < 0
}

impl KeyboardDevice for HookKeyboard {
    fn acquire(&mut self) -> Result<(), HotkeyError> {
        if self.hook.is_some() {
            return Ok(());
        }

        {
            let mut sink = lock(&HOOK_SINK);
            if sink.is_some() {
                return Err(HotkeyError::DeviceAcquisitionFailure(
                    "another keyboard hook is already installed in this process".to_string(),
                ));
            }
            let mut state = lock(&self.state);
            state.buffer.clear();
            // Keys already held must not turn their autorepeat into presses.
            for vk in FIRST_VK..=LAST_VK {
                state.down[usize::from(vk)] = is_vk_down(vk);
            }
            *sink = Some(Arc::clone(&self.state));
        }

        let (ready_tx, ready_rx) = mpsc::channel();
        let handle = match thread::Builder::new()
            .name(HOOK_THREAD_NAME.to_string())
            .spawn(move || run_hook_thread(ready_tx))
        {
            Ok(handle) => handle,
            Err(e) => {
                self.unpublish();
                return Err(HotkeyError::DeviceAcquisitionFailure(e.to_string()));
            }
        };

        match ready_rx.recv() {
            Ok(Ok(thread_id)) => {
                info!("keyboard hook installed on thread {thread_id}");
                self.hook = Some(HookThread { thread_id, handle });
                Ok(())
            }
            Ok(Err(message)) => {
                let _ = handle.join();
                self.unpublish();
                Err(HotkeyError::DeviceAcquisitionFailure(message))
            }
            Err(_) => {
                let _ = handle.join();
                self.unpublish();
                Err(HotkeyError::DeviceAcquisitionFailure(
                    "keyboard hook thread exited during startup".to_string(),
                ))
            }
        }
    }

    fn set_buffer_capacity(&mut self, capacity: usize) {
        lock(&self.state).buffer.set_capacity(capacity);
    }

    fn drain_buffered(&mut self) -> Result<Vec<KeyTransition>, HotkeyError> {
        if self.hook.is_none() {
            return Err(HotkeyError::Device("keyboard not acquired".to_string()));
        }
        Ok(lock(&self.state).buffer.drain())
    }

    fn pressed_keys(&mut self) -> Result<Vec<RawKeyCode>, HotkeyError> {
        if self.hook.is_none() {
            return Err(HotkeyError::Device("keyboard not acquired".to_string()));
        }
        Ok((FIRST_VK..=LAST_VK)
            .filter(|&vk| is_vk_down(vk))
            .filter_map(KeyMapper::windows_vk_to_raw)
            .collect())
    }

    fn release(&mut self) {
        if let Some(hook) = self.hook.take() {
            self.unpublish();
            // SAFETY: plain integer arguments; the target thread owns a message queue.
            let posted =
                unsafe { PostThreadMessageW(hook.thread_id, WM_QUIT, WPARAM(0), LPARAM(0)) };
            match posted {
                Ok(()) => {
                    if hook.handle.join().is_err() {
                        warn!("keyboard hook thread panicked");
                    }
                }
                Err(e) => warn!("could not stop keyboard hook thread: {e}"),
            }
            debug!("keyboard hook released");
        }
        lock(&self.state).buffer.clear();
    }
}

/// Entry point for the hook thread.
///
/// Reports its thread id (or an install error) on `ready`, then pumps
/// messages until `WM_QUIT`.
fn run_hook_thread(ready: mpsc::Sender<Result<u32, String>>) {
    let mut msg = MSG::default();

    // SAFETY: `msg` is a valid out-pointer.  Peeking creates this thread's
    // message queue so a WM_QUIT posted right after startup is not lost.
    unsafe {
        let _ = PeekMessageW(&mut msg, None, 0, 0, PM_NOREMOVE);
    }

    // SAFETY: the callback is a plain function and the hook is removed on
    // this thread before it exits.
    let hook = match unsafe { SetWindowsHookExW(WH_KEYBOARD_LL, Some(keyboard_hook_proc), None, 0) }
    {
        Ok(hook) => hook,
        Err(e) => {
            let _ = ready.send(Err(format!("SetWindowsHookExW(WH_KEYBOARD_LL) failed: {e}")));
            return;
        }
    };

    // SAFETY: no arguments.
    let thread_id = unsafe { GetCurrentThreadId() };
    if ready.send(Ok(thread_id)).is_ok() {
        // SAFETY: standard GetMessage/DispatchMessage loop; 0 is WM_QUIT, -1 an error.
        unsafe {
            while GetMessageW(&mut msg, None, 0, 0).0 > 0 {
                DispatchMessageW(&msg);
            }
        }
    }

    // SAFETY: `hook` was installed by this thread and is removed exactly once.
    unsafe {
        let _ = UnhookWindowsHookEx(hook);
    }
}

/// Low-level keyboard hook callback.
///
/// # Safety
///
/// Called by Windows on the hook thread.  Must return quickly.
unsafe extern "system" fn keyboard_hook_proc(
    n_code: i32,
    w_param: WPARAM,
    l_param: LPARAM,
) -> LRESULT {
    if n_code == HC_ACTION as i32 {
        // SAFETY: l_param points to a KBDLLHOOKSTRUCT when n_code == HC_ACTION.
        let kbs = &*(l_param.0 as *const KBDLLHOOKSTRUCT);
        let pressed = match w_param.0 as u32 {
            WM_KEYDOWN | WM_SYSKEYDOWN => Some(true),
            WM_KEYUP | WM_SYSKEYUP => Some(false),
            _ => None,
        };
        if let Some(pressed) = pressed {
            if let Some(state) = lock(&HOOK_SINK).as_ref() {
                lock(state).record(kbs.vkCode as u8, pressed);
            }
        }
    }

    // SAFETY: every event is forwarded to the next hook in the chain.
    CallNextHookEx(None, n_code, w_param, l_param)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
