//! Key identifier translation.
//!
//! Hotkeys are configured as host-level [`KeyCode`]s but detected by a raw
//! keyboard device that reports [`RawKeyCode`]s.  [`KeyMapper`] converts
//! between the two at the point where a key is bound.

pub mod key;
pub mod raw;
pub mod windows_vk;

use thiserror::Error;
use tracing::warn;

pub use key::{KeyCode, KeyParseError};
pub use raw::RawKeyCode;

use raw::RAW_TABLE;

/// A [`KeyCode`] with no corresponding raw device code.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("key {key} has no raw keyboard device code")]
pub struct KeyConversionMiss {
    /// The key that could not be converted.
    pub key: KeyCode,
}

/// Unified key mapper providing both translation directions.
pub struct KeyMapper;

impl KeyMapper {
    /// Translates a [`KeyCode`] to the raw device code.
    ///
    /// # Errors
    ///
    /// Returns [`KeyConversionMiss`] if the key has no raw code.
    pub fn to_raw(key: KeyCode) -> Result<RawKeyCode, KeyConversionMiss> {
        RAW_TABLE
            .iter()
            .find(|(k, _)| *k == key)
            .map(|&(_, raw)| RawKeyCode(raw))
            .ok_or(KeyConversionMiss { key })
    }

    /// Like [`to_raw`](Self::to_raw), but never fails.
    ///
    /// On a miss a warning is logged and the key's HID usage value is used as
    /// the raw code, unless that value already belongs to another key in the
    /// table.  In that case [`RawKeyCode::RESERVED`] is used so the hotkey
    /// never fires on the wrong key.  Either way binding does not abort startup.
    pub fn to_raw_lossy(key: KeyCode) -> RawKeyCode {
        Self::to_raw(key).unwrap_or_else(|miss| {
            let fallback = lossy_fallback(key);
            warn!("{miss}; falling back to numeric code {}", fallback.0);
            fallback
        })
    }

    /// Translates a raw device code back to a [`KeyCode`], if known.
    pub fn from_raw(raw: RawKeyCode) -> Option<KeyCode> {
        RAW_TABLE
            .iter()
            .find(|&&(_, code)| code == raw.0)
            .map(|&(key, _)| key)
    }

    /// Translates a Windows Virtual Key code straight to a raw device code.
    ///
    /// Returns `None` when the VK has no [`KeyCode`] or the key has no raw code.
    pub fn windows_vk_to_raw(vk: u8) -> Option<RawKeyCode> {
        windows_vk::vk_to_key(vk).and_then(|key| Self::to_raw(key).ok())
    }
}

/// Numeric fallback for a key with no table entry.  Never a code some other
/// key is mapped to.
fn lossy_fallback(key: KeyCode) -> RawKeyCode {
    let usage = key.hid_usage();
    if RAW_TABLE.iter().any(|&(_, code)| code == usage) {
        RawKeyCode::RESERVED
    } else {
        RawKeyCode(usage)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_to_raw_uses_scan_code_numbering() {
        assert_eq!(KeyMapper::to_raw(KeyCode::Escape), Ok(RawKeyCode(1)));
        assert_eq!(KeyMapper::to_raw(KeyCode::KeyA), Ok(RawKeyCode(30)));
        assert_eq!(KeyMapper::to_raw(KeyCode::F6), Ok(RawKeyCode(64)));
        assert_eq!(KeyMapper::to_raw(KeyCode::ScrollLock), Ok(RawKeyCode(70)));
    }

    #[test]
    fn test_to_raw_maps_volume_keys_to_evdev_codes() {
        assert_eq!(KeyMapper::to_raw(KeyCode::AudioVolumeMute), Ok(RawKeyCode(113)));
        assert_eq!(KeyMapper::to_raw(KeyCode::AudioVolumeDown), Ok(RawKeyCode(114)));
        assert_eq!(KeyMapper::to_raw(KeyCode::AudioVolumeUp), Ok(RawKeyCode(115)));
    }

    #[test]
    fn test_volume_mute_does_not_collide_with_context_menu() {
        // Arrange
        let mute = KeyMapper::to_raw_lossy(KeyCode::AudioVolumeMute);
        let menu = KeyMapper::to_raw_lossy(KeyCode::ContextMenu);

        // Assert
        assert_ne!(mute, menu);
        assert_eq!(KeyMapper::from_raw(mute), Some(KeyCode::AudioVolumeMute));
    }

    #[test]
    fn test_lossy_fallback_never_lands_on_another_keys_code() {
        for &key in KeyCode::ALL {
            let fallback = lossy_fallback(key);
            if let Some(owner) = KeyMapper::from_raw(fallback) {
                panic!("{key} would fall back to {fallback}, which belongs to {owner}");
            }
        }
    }

    #[test]
    fn test_lossy_fallback_uses_reserved_code_on_collision() {
        // HID usage of AudioVolumeMute (0x7F) is ContextMenu's raw code.
        assert_eq!(
            KeyMapper::from_raw(RawKeyCode(KeyCode::AudioVolumeMute.hid_usage())),
            Some(KeyCode::ContextMenu)
        );
        assert_eq!(lossy_fallback(KeyCode::AudioVolumeMute), RawKeyCode::RESERVED);
    }

    #[test]
    fn test_to_raw_lossy_matches_to_raw_for_mapped_keys() {
        assert_eq!(KeyMapper::to_raw_lossy(KeyCode::F6), RawKeyCode(64));
        assert_eq!(KeyMapper::to_raw_lossy(KeyCode::AudioVolumeUp), RawKeyCode(115));
    }

    #[test]
    fn test_from_raw_inverts_to_raw_for_every_mapped_key() {
        for &key in KeyCode::ALL {
            if let Ok(raw) = KeyMapper::to_raw(key) {
                assert_eq!(KeyMapper::from_raw(raw), Some(key), "{key}");
            }
        }
        assert_eq!(KeyMapper::from_raw(RawKeyCode(0)), None);
    }

    #[test]
    fn test_raw_table_has_no_duplicate_keys_or_codes() {
        let keys: HashSet<_> = RAW_TABLE.iter().map(|(k, _)| *k).collect();
        let codes: HashSet<_> = RAW_TABLE.iter().map(|(_, c)| *c).collect();
        assert_eq!(keys.len(), RAW_TABLE.len());
        assert_eq!(codes.len(), RAW_TABLE.len());
    }

    #[test]
    fn test_every_key_code_has_a_raw_code() {
        let misses: Vec<_> = KeyCode::ALL
            .iter()
            .copied()
            .filter(|&k| KeyMapper::to_raw(k).is_err())
            .collect();
        assert!(misses.is_empty(), "unmapped keys: {misses:?}");
    }

    #[test]
    fn test_windows_vk_to_raw_chains_both_tables() {
        assert_eq!(KeyMapper::windows_vk_to_raw(0x75), Some(RawKeyCode(64)));
        assert_eq!(KeyMapper::windows_vk_to_raw(0xAD), Some(RawKeyCode(113)));
        assert_eq!(KeyMapper::windows_vk_to_raw(0xAF), Some(RawKeyCode(115)));
        assert_eq!(KeyMapper::windows_vk_to_raw(0x01), None);
    }
}
