//! Host-level key identifiers.
//!
//! [`KeyCode`] names a physical key position using the USB HID naming
//! (`KeyA`, `Digit1`, `F6`, `ScrollLock`, ...).  The discriminant of each
//! variant is its HID Usage ID on the Keyboard/Keypad page (0x07), which is
//! also the value used by the lossy fallback in
//! [`KeyMapper::to_raw_lossy`](super::KeyMapper::to_raw_lossy).
//!
//! Names parse case-insensitively, and a few common aliases are accepted so
//! that config files can say `key = "a"` or `key = "esc"`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a string does not name any [`KeyCode`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown key name {0:?}")]
pub struct KeyParseError(pub String);

macro_rules! key_codes {
    ($( $(#[$meta:meta])* $name:ident = $hid:literal ),+ $(,)?) => {
        /// A physical key, identified by its USB HID Usage ID.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(u16)]
        pub enum KeyCode {
            $( $(#[$meta])* $name = $hid ),+
        }

        impl KeyCode {
            /// Every key, in declaration order.
            pub const ALL: &'static [KeyCode] = &[$(KeyCode::$name),+];

            /// The canonical name, identical to the variant name.
            pub const fn name(self) -> &'static str {
                match self {
                    $(KeyCode::$name => stringify!($name)),+
                }
            }
        }
    };
}

key_codes! {
    KeyA = 0x04, KeyB = 0x05, KeyC = 0x06, KeyD = 0x07, KeyE = 0x08, KeyF = 0x09,
    KeyG = 0x0A, KeyH = 0x0B, KeyI = 0x0C, KeyJ = 0x0D, KeyK = 0x0E, KeyL = 0x0F,
    KeyM = 0x10, KeyN = 0x11, KeyO = 0x12, KeyP = 0x13, KeyQ = 0x14, KeyR = 0x15,
    KeyS = 0x16, KeyT = 0x17, KeyU = 0x18, KeyV = 0x19, KeyW = 0x1A, KeyX = 0x1B,
    KeyY = 0x1C, KeyZ = 0x1D,

    Digit1 = 0x1E, Digit2 = 0x1F, Digit3 = 0x20, Digit4 = 0x21, Digit5 = 0x22,
    Digit6 = 0x23, Digit7 = 0x24, Digit8 = 0x25, Digit9 = 0x26, Digit0 = 0x27,

    Enter = 0x28, Escape = 0x29, Backspace = 0x2A, Tab = 0x2B, Space = 0x2C,
    Minus = 0x2D, Equal = 0x2E, BracketLeft = 0x2F, BracketRight = 0x30,
    Backslash = 0x31, Semicolon = 0x33, Quote = 0x34, Backquote = 0x35,
    Comma = 0x36, Period = 0x37, Slash = 0x38, CapsLock = 0x39,

    F1 = 0x3A, F2 = 0x3B, F3 = 0x3C, F4 = 0x3D, F5 = 0x3E, F6 = 0x3F,
    F7 = 0x40, F8 = 0x41, F9 = 0x42, F10 = 0x43, F11 = 0x44, F12 = 0x45,

    PrintScreen = 0x46, ScrollLock = 0x47, Pause = 0x48, Insert = 0x49,
    Home = 0x4A, PageUp = 0x4B, Delete = 0x4C, End = 0x4D, PageDown = 0x4E,
    ArrowRight = 0x4F, ArrowLeft = 0x50, ArrowDown = 0x51, ArrowUp = 0x52,

    NumLock = 0x53, NumpadDivide = 0x54, NumpadMultiply = 0x55,
    NumpadSubtract = 0x56, NumpadAdd = 0x57, NumpadEnter = 0x58,
    Numpad1 = 0x59, Numpad2 = 0x5A, Numpad3 = 0x5B, Numpad4 = 0x5C,
    Numpad5 = 0x5D, Numpad6 = 0x5E, Numpad7 = 0x5F, Numpad8 = 0x60,
    Numpad9 = 0x61, Numpad0 = 0x62, NumpadDecimal = 0x63,

    IntlBackslash = 0x64, ContextMenu = 0x65,

    F13 = 0x68, F14 = 0x69, F15 = 0x6A, F16 = 0x6B, F17 = 0x6C, F18 = 0x6D,
    F19 = 0x6E, F20 = 0x6F, F21 = 0x70, F22 = 0x71, F23 = 0x72, F24 = 0x73,

    /// Usually reported on the consumer page; no raw keyboard code.
    AudioVolumeMute = 0x7F,
    /// Usually reported on the consumer page; no raw keyboard code.
    AudioVolumeUp = 0x80,
    /// Usually reported on the consumer page; no raw keyboard code.
    AudioVolumeDown = 0x81,

    ControlLeft = 0xE0, ShiftLeft = 0xE1, AltLeft = 0xE2, MetaLeft = 0xE3,
    ControlRight = 0xE4, ShiftRight = 0xE5, AltRight = 0xE6, MetaRight = 0xE7,
}

impl KeyCode {
    /// The HID Usage ID of this key.
    pub const fn hid_usage(self) -> u16 {
        self as u16
    }

    /// `true` for the eight Ctrl / Shift / Alt / Meta keys.
    pub fn is_modifier(self) -> bool {
        (0xE0..=0xE7).contains(&self.hid_usage())
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KeyCode {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(key) = KeyCode::ALL
            .iter()
            .copied()
            .find(|k| k.name().eq_ignore_ascii_case(trimmed))
        {
            return Ok(key);
        }
        alias(trimmed).ok_or_else(|| KeyParseError(s.to_string()))
    }
}

/// Short spellings accepted in addition to the canonical names.
fn alias(s: &str) -> Option<KeyCode> {
    let lower = s.to_ascii_lowercase();
    let mut chars = lower.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return match c {
            'a'..='z' => KeyCode::ALL
                .iter()
                .copied()
                .find(|k| k.name().len() == 4 && k.name().ends_with(c.to_ascii_uppercase())),
            '0'..='9' => KeyCode::ALL
                .iter()
                .copied()
                .find(|k| k.name().len() == 6 && k.name().ends_with(c)),
            _ => None,
        };
    }
    Some(match lower.as_str() {
        "esc" => KeyCode::Escape,
        "return" => KeyCode::Enter,
        "del" => KeyCode::Delete,
        "ins" => KeyCode::Insert,
        "pgup" => KeyCode::PageUp,
        "pgdn" => KeyCode::PageDown,
        "scroll" => KeyCode::ScrollLock,
        "capital" => KeyCode::CapsLock,
        "prtsc" | "snapshot" => KeyCode::PrintScreen,
        "up" => KeyCode::ArrowUp,
        "down" => KeyCode::ArrowDown,
        "left" => KeyCode::ArrowLeft,
        "right" => KeyCode::ArrowRight,
        "ctrl" | "control" => KeyCode::ControlLeft,
        "shift" => KeyCode::ShiftLeft,
        "alt" => KeyCode::AltLeft,
        "win" | "super" | "meta" => KeyCode::MetaLeft,
        "apps" | "menu" => KeyCode::ContextMenu,
        _ => return None,
    })
}

impl Serialize for KeyCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for KeyCode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
