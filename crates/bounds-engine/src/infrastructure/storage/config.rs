//! TOML configuration for mouse-bounds.
//!
//! Reads `AppConfig` from the platform-appropriate config file:
//! - Windows:  `%APPDATA%\MouseBounds\config.toml`
//! - Linux:    `~/.config/mousebounds/config.toml`
//!
//! ```toml
//! [general]
//! log_level = "info"
//! start_active = false
//!
//! [confine]
//! mode = "bounce"
//! detection_range = 5
//! bounce_factor = 15
//! sensitivity = 0.01
//! display = 1
//!
//! [hotkey]
//! key = "F6"
//! strategy = "buffered"
//! poll_interval_ms = 30
//! buffer_capacity = 128
//! device = "/dev/input/event3"
//! ```
//!
//! Every section and field is optional; absent ones take the defaults shown
//! above (`display` and `device` default to "auto").  The file is only ever
//! read.

use std::path::{Path, PathBuf};
use std::time::Duration;

use bounds_core::{
    ClampMode, ConfinementTuning, KeyCode, DEFAULT_BOUNCE_FACTOR, DEFAULT_DETECTION_RANGE,
    DEFAULT_LOOP_SENSITIVITY,
};
use serde::Deserialize;
use thiserror::Error;

use crate::application::hotkey::{
    DetectionKind, HotkeySettings, DEFAULT_BUFFER_CAPACITY, DEFAULT_POLL_INTERVAL,
};
use crate::application::session::SessionSettings;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub confine: ConfineConfig,
    #[serde(default)]
    pub hotkey: HotkeyConfig,
}

/// General application behaviour.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GeneralConfig {
    /// `tracing` log level used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Activate confinement immediately on startup.
    #[serde(default)]
    pub start_active: bool,
}

/// Cursor confinement settings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ConfineConfig {
    /// `"bounce"` or `"flip"`.
    #[serde(default)]
    pub mode: ClampMode,
    /// Inset, in pixels, from the display edge to the safe region.
    #[serde(default = "default_detection_range")]
    pub detection_range: i32,
    /// Distance, in pixels, a bounced cursor is pushed back inside.
    #[serde(default = "default_bounce_factor")]
    pub bounce_factor: i32,
    /// Fraction of the region's extent that counts as "near an edge".
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f32,
    /// Display index to confine to.  Absent means the primary display.
    #[serde(default)]
    pub display: Option<usize>,
}

/// Hotkey detection settings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct HotkeyConfig {
    /// Key name, e.g. `"F6"` or `"ScrollLock"`.
    #[serde(default = "default_hotkey")]
    pub key: KeyCode,
    /// `"buffered"` or `"snapshot"`.
    #[serde(default)]
    pub strategy: DetectionKind,
    /// Delay between keyboard polls, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Transitions buffered between polls.
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,
    /// evdev device path (Linux).  Absent means the first keyboard found.
    #[serde(default)]
    pub device: Option<PathBuf>,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_detection_range() -> i32 {
    DEFAULT_DETECTION_RANGE
}
fn default_bounce_factor() -> i32 {
    DEFAULT_BOUNCE_FACTOR
}
fn default_sensitivity() -> f32 {
    DEFAULT_LOOP_SENSITIVITY
}
fn default_hotkey() -> KeyCode {
    KeyCode::F6
}
fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL.as_millis() as u64
}
fn default_buffer_capacity() -> usize {
    DEFAULT_BUFFER_CAPACITY
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            start_active: false,
        }
    }
}

impl Default for ConfineConfig {
    fn default() -> Self {
        Self {
            mode: ClampMode::default(),
            detection_range: default_detection_range(),
            bounce_factor: default_bounce_factor(),
            sensitivity: default_sensitivity(),
            display: None,
        }
    }
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            key: default_hotkey(),
            strategy: DetectionKind::default(),
            poll_interval_ms: default_poll_interval_ms(),
            buffer_capacity: default_buffer_capacity(),
            device: None,
        }
    }
}

impl ConfineConfig {
    /// The confinement tuning described by this section.
    pub fn tuning(&self) -> ConfinementTuning {
        ConfinementTuning {
            detection_range: self.detection_range.max(0),
            bounce_factor: self.bounce_factor,
            sensitivity: self.sensitivity,
        }
    }
}

impl HotkeyConfig {
    /// The poll loop settings described by this section.
    ///
    /// A zero poll interval is raised to 1 ms so the loop still yields.
    pub fn settings(&self) -> HotkeySettings {
        HotkeySettings {
            kind: self.strategy,
            poll_interval: Duration::from_millis(self.poll_interval_ms.max(1)),
            buffer_capacity: self.buffer_capacity,
        }
    }
}

impl AppConfig {
    /// Session startup settings derived from the config.
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            mode: self.confine.mode,
            tuning: self.confine.tuning(),
            display: self.confine.display,
            start_active: self.general.start_active,
            hotkey: self.hotkey.settings(),
        }
    }
}

// ── Config loading ────────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads `AppConfig` from the platform config file, returning
/// `AppConfig::default()` if the file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads `AppConfig` from `path`, returning `AppConfig::default()` if the
/// file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Resolves the platform config base directory including the app subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        // %APPDATA% e.g. C:\Users\<user>\AppData\Roaming
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("MouseBounds"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("mousebounds"))
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "mouse_bounds_test_{}_{name}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    // ── AppConfig defaults ────────────────────────────────────────────────────

    #[test]
    fn test_app_config_default_matches_documented_values() {
        // Arrange / Act
        let cfg = AppConfig::default();

        // Assert
        assert_eq!(cfg.general.log_level, "info");
        assert!(!cfg.general.start_active);
        assert_eq!(cfg.confine.mode, ClampMode::Bounce);
        assert_eq!(cfg.confine.detection_range, 5);
        assert_eq!(cfg.confine.bounce_factor, 15);
        assert_eq!(cfg.confine.sensitivity, 0.01);
        assert_eq!(cfg.confine.display, None);
        assert_eq!(cfg.hotkey.key, KeyCode::F6);
        assert_eq!(cfg.hotkey.strategy, DetectionKind::Buffered);
        assert_eq!(cfg.hotkey.poll_interval_ms, 30);
        assert_eq!(cfg.hotkey.buffer_capacity, 128);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let cfg: AppConfig = toml::from_str("").expect("deserialize empty");
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_partial_sections_override_only_given_fields() {
        // Arrange
        let toml_str = r#"
[confine]
mode = "flip"
display = 1

[hotkey]
key = "ScrollLock"
strategy = "snapshot"
"#;

        // Act
        let cfg: AppConfig = toml::from_str(toml_str).expect("deserialize partial");

        // Assert
        assert_eq!(cfg.confine.mode, ClampMode::Flip);
        assert_eq!(cfg.confine.display, Some(1));
        assert_eq!(cfg.confine.bounce_factor, 15);
        assert_eq!(cfg.hotkey.key, KeyCode::ScrollLock);
        assert_eq!(cfg.hotkey.strategy, DetectionKind::Snapshot);
        assert_eq!(cfg.hotkey.poll_interval_ms, 30);
    }

    #[test]
    fn test_unknown_key_name_is_a_parse_error() {
        let result: Result<AppConfig, toml::de::Error> =
            toml::from_str("[hotkey]\nkey = \"NotAKey\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_mode_is_a_parse_error() {
        let result: Result<AppConfig, toml::de::Error> =
            toml::from_str("[confine]\nmode = \"wrap\"\n");
        assert!(result.is_err());
    }

    // ── Derived settings ──────────────────────────────────────────────────────

    #[test]
    fn test_session_settings_carries_every_section() {
        // Arrange
        let mut cfg = AppConfig::default();
        cfg.general.start_active = true;
        cfg.confine.mode = ClampMode::Flip;
        cfg.confine.display = Some(2);
        cfg.hotkey.poll_interval_ms = 50;

        // Act
        let settings = cfg.session_settings();

        // Assert
        assert!(settings.start_active);
        assert_eq!(settings.mode, ClampMode::Flip);
        assert_eq!(settings.display, Some(2));
        assert_eq!(settings.tuning, ConfinementTuning::default());
        assert_eq!(settings.hotkey.poll_interval, Duration::from_millis(50));
    }

    #[test]
    fn test_hotkey_settings_zero_interval_is_raised_to_one_ms() {
        let cfg = HotkeyConfig {
            poll_interval_ms: 0,
            ..HotkeyConfig::default()
        };
        assert_eq!(cfg.settings().poll_interval, Duration::from_millis(1));
    }

    #[test]
    fn test_confine_tuning_clamps_negative_detection_range() {
        let cfg = ConfineConfig {
            detection_range: -3,
            ..ConfineConfig::default()
        };
        assert_eq!(cfg.tuning().detection_range, 0);
    }

    // ── load_config_from ──────────────────────────────────────────────────────

    #[test]
    fn test_load_config_from_returns_default_when_file_absent() {
        let path = PathBuf::from("/nonexistent/path/that/cannot/exist/config.toml");

        let cfg = load_config_from(&path).expect("absent file is not an error");

        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_load_config_from_reads_file() {
        // Arrange
        let path = temp_config("reads", "[general]\nlog_level = \"debug\"\n");

        // Act
        let cfg = load_config_from(&path).expect("load");

        // Assert
        assert_eq!(cfg.general.log_level, "debug");

        // Cleanup
        if let Some(dir) = path.parent() {
            std::fs::remove_dir_all(dir).ok();
        }
    }

    #[test]
    fn test_load_config_from_malformed_file_returns_parse_error() {
        let path = temp_config("malformed", "[[[ not valid toml");

        let result = load_config_from(&path);

        assert!(matches!(result, Err(ConfigError::Parse(_))));
        if let Some(dir) = path.parent() {
            std::fs::remove_dir_all(dir).ok();
        }
    }

    // ── config_dir path formation ─────────────────────────────────────────────

    #[test]
    fn test_config_file_path_ends_with_config_toml() {
        // NoPlatformConfigDir (e.g. in a stripped CI env) is also acceptable.
        if let Ok(path) = config_file_path() {
            assert!(
                path.ends_with("config.toml"),
                "config file must be named config.toml, got {path:?}"
            );
        }
    }
}
