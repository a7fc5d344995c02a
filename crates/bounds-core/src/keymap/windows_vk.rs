//! Windows Virtual Key (VK) code to [`KeyCode`] translation.
//!
//! Reference: Windows Virtual-Key Codes (winuser.h).
//!
//! The Windows keyboard device receives hook events and key state by VK
//! code, so it needs this table to turn a VK into a [`KeyCode`] before looking up the
//! [`RawKeyCode`](super::RawKeyCode).  Only the distinguishing left/right
//! modifier VKs are mapped; the generic `VK_SHIFT`/`VK_CONTROL`/`VK_MENU`
//! codes would otherwise report every modifier press twice.

use super::key::KeyCode;

/// Translates a Windows VK code to a [`KeyCode`].
///
/// Returns `None` for mouse buttons, generic modifiers, and VKs with no key
/// in [`KeyCode`].
pub fn vk_to_key(vk: u8) -> Option<KeyCode> {
    use KeyCode::*;

    Some(match vk {
        0x08 => Backspace,
        0x09 => Tab,
        0x0D => Enter,
        0x13 => Pause,
        0x14 => CapsLock,
        0x1B => Escape,
        0x20 => Space,
        0x21 => PageUp,
        0x22 => PageDown,
        0x23 => End,
        0x24 => Home,
        0x25 => ArrowLeft,
        0x26 => ArrowUp,
        0x27 => ArrowRight,
        0x28 => ArrowDown,
        0x2C => PrintScreen,
        0x2D => Insert,
        0x2E => Delete,
        0x30..=0x39 => digit(vk - 0x30)?,
        0x41..=0x5A => letter(vk - 0x41)?,
        0x5B => MetaLeft,
        0x5C => MetaRight,
        0x5D => ContextMenu,
        0x60 => Numpad0,
        0x61 => Numpad1,
        0x62 => Numpad2,
        0x63 => Numpad3,
        0x64 => Numpad4,
        0x65 => Numpad5,
        0x66 => Numpad6,
        0x67 => Numpad7,
        0x68 => Numpad8,
        0x69 => Numpad9,
        0x6A => NumpadMultiply,
        0x6B => NumpadAdd,
        0x6D => NumpadSubtract,
        0x6E => NumpadDecimal,
        0x6F => NumpadDivide,
        0x70..=0x87 => function_key(vk - 0x70)?,
        0x90 => NumLock,
        0x91 => ScrollLock,
        0xA0 => ShiftLeft,
        0xA1 => ShiftRight,
        0xA2 => ControlLeft,
        0xA3 => ControlRight,
        0xA4 => AltLeft,
        0xA5 => AltRight,
        0xAD => AudioVolumeMute,
        0xAE => AudioVolumeDown,
        0xAF => AudioVolumeUp,
        0xBA => Semicolon,
        0xBB => Equal,
        0xBC => Comma,
        0xBD => Minus,
        0xBE => Period,
        0xBF => Slash,
        0xC0 => Backquote,
        0xDB => BracketLeft,
        0xDC => Backslash,
        0xDD => BracketRight,
        0xDE => Quote,
        0xE2 => IntlBackslash,
        _ => return None,
    })
}

fn digit(offset: u8) -> Option<KeyCode> {
    use KeyCode::*;
    [Digit0, Digit1, Digit2, Digit3, Digit4, Digit5, Digit6, Digit7, Digit8, Digit9]
        .get(offset as usize)
        .copied()
}

fn letter(offset: u8) -> Option<KeyCode> {
    use KeyCode::*;
    [
        KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI, KeyJ, KeyK, KeyL, KeyM, KeyN, KeyO,
        KeyP, KeyQ, KeyR, KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,
    ]
    .get(offset as usize)
    .copied()
}

fn function_key(offset: u8) -> Option<KeyCode> {
    use KeyCode::*;
    [
        F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12, F13, F14, F15, F16, F17, F18, F19, F20,
        F21, F22, F23, F24,
    ]
    .get(offset as usize)
    .copied()
}
