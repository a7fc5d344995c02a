//! Raw keyboard device codes.
//!
//! A [`RawKeyCode`] is what a raw keyboard device reports for a key.  The
//! numbering is the PC/AT set-1 scan code for the main block (the values that
//! DirectInput calls `DIK_*`), which Linux evdev reuses verbatim as `KEY_*`
//! for codes 1 to 88.  Keys that only exist as extended (`0xE0`-prefixed)
//! scan codes use their evdev number, so one table serves both platforms.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::key::KeyCode;

/// A key code as reported by the raw keyboard device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RawKeyCode(pub u16);

impl RawKeyCode {
    /// Code 0 (evdev `KEY_RESERVED`, no `DIK_*` key).  No device reports it.
    pub const RESERVED: RawKeyCode = RawKeyCode(0);
}

impl fmt::Display for RawKeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "raw:{}", self.0)
    }
}

/// `(key, raw code)` pairs.  Keys absent from this table have no raw code.
pub(crate) static RAW_TABLE: &[(KeyCode, u16)] = &[
    // Set-1 main block (evdev KEY_* 1..=88)
    (KeyCode::Escape, 1),
    (KeyCode::Digit1, 2),
    (KeyCode::Digit2, 3),
    (KeyCode::Digit3, 4),
    (KeyCode::Digit4, 5),
    (KeyCode::Digit5, 6),
    (KeyCode::Digit6, 7),
    (KeyCode::Digit7, 8),
    (KeyCode::Digit8, 9),
    (KeyCode::Digit9, 10),
    (KeyCode::Digit0, 11),
    (KeyCode::Minus, 12),
    (KeyCode::Equal, 13),
    (KeyCode::Backspace, 14),
    (KeyCode::Tab, 15),
    (KeyCode::KeyQ, 16),
    (KeyCode::KeyW, 17),
    (KeyCode::KeyE, 18),
    (KeyCode::KeyR, 19),
    (KeyCode::KeyT, 20),
    (KeyCode::KeyY, 21),
    (KeyCode::KeyU, 22),
    (KeyCode::KeyI, 23),
    (KeyCode::KeyO, 24),
    (KeyCode::KeyP, 25),
    (KeyCode::BracketLeft, 26),
    (KeyCode::BracketRight, 27),
    (KeyCode::Enter, 28),
    (KeyCode::ControlLeft, 29),
    (KeyCode::KeyA, 30),
    (KeyCode::KeyS, 31),
    (KeyCode::KeyD, 32),
    (KeyCode::KeyF, 33),
    (KeyCode::KeyG, 34),
    (KeyCode::KeyH, 35),
    (KeyCode::KeyJ, 36),
    (KeyCode::KeyK, 37),
    (KeyCode::KeyL, 38),
    (KeyCode::Semicolon, 39),
    (KeyCode::Quote, 40),
    (KeyCode::Backquote, 41),
    (KeyCode::ShiftLeft, 42),
    (KeyCode::Backslash, 43),
    (KeyCode::KeyZ, 44),
    (KeyCode::KeyX, 45),
    (KeyCode::KeyC, 46),
    (KeyCode::KeyV, 47),
    (KeyCode::KeyB, 48),
    (KeyCode::KeyN, 49),
    (KeyCode::KeyM, 50),
    (KeyCode::Comma, 51),
    (KeyCode::Period, 52),
    (KeyCode::Slash, 53),
    (KeyCode::ShiftRight, 54),
    (KeyCode::NumpadMultiply, 55),
    (KeyCode::AltLeft, 56),
    (KeyCode::Space, 57),
    (KeyCode::CapsLock, 58),
    (KeyCode::F1, 59),
    (KeyCode::F2, 60),
    (KeyCode::F3, 61),
    (KeyCode::F4, 62),
    (KeyCode::F5, 63),
    (KeyCode::F6, 64),
    (KeyCode::F7, 65),
    (KeyCode::F8, 66),
    (KeyCode::F9, 67),
    (KeyCode::F10, 68),
    (KeyCode::NumLock, 69),
    (KeyCode::ScrollLock, 70),
    (KeyCode::Numpad7, 71),
    (KeyCode::Numpad8, 72),
    (KeyCode::Numpad9, 73),
    (KeyCode::NumpadSubtract, 74),
    (KeyCode::Numpad4, 75),
    (KeyCode::Numpad5, 76),
    (KeyCode::Numpad6, 77),
    (KeyCode::NumpadAdd, 78),
    (KeyCode::Numpad1, 79),
    (KeyCode::Numpad2, 80),
    (KeyCode::Numpad3, 81),
    (KeyCode::Numpad0, 82),
    (KeyCode::NumpadDecimal, 83),
    (KeyCode::IntlBackslash, 86),
    (KeyCode::F11, 87),
    (KeyCode::F12, 88),
    // Extended keys (evdev numbering)
    (KeyCode::NumpadEnter, 96),
    (KeyCode::ControlRight, 97),
    (KeyCode::NumpadDivide, 98),
    (KeyCode::PrintScreen, 99),
    (KeyCode::AltRight, 100),
    (KeyCode::Home, 102),
    (KeyCode::ArrowUp, 103),
    (KeyCode::PageUp, 104),
    (KeyCode::ArrowLeft, 105),
    (KeyCode::ArrowRight, 106),
    (KeyCode::End, 107),
    (KeyCode::ArrowDown, 108),
    (KeyCode::PageDown, 109),
    (KeyCode::Insert, 110),
    (KeyCode::Delete, 111),
    (KeyCode::AudioVolumeMute, 113),
    (KeyCode::AudioVolumeDown, 114),
    (KeyCode::AudioVolumeUp, 115),
    (KeyCode::Pause, 119),
    (KeyCode::MetaLeft, 125),
    (KeyCode::MetaRight, 126),
    (KeyCode::ContextMenu, 127),
    (KeyCode::F13, 183),
    (KeyCode::F14, 184),
    (KeyCode::F15, 185),
    (KeyCode::F16, 186),
    (KeyCode::F17, 187),
    (KeyCode::F18, 188),
    (KeyCode::F19, 189),
    (KeyCode::F20, 190),
    (KeyCode::F21, 191),
    (KeyCode::F22, 192),
    (KeyCode::F23, 193),
    (KeyCode::F24, 194),
];
