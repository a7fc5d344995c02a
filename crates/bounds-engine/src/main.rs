//! mouse-bounds entry point.
//!
//! Keeps the mouse cursor inside one display and toggles that with a global
//! hotkey (F6 by default).
//!
//! ```text
//! main()
//!  └─ load config (+ CLI overrides)
//!  └─ BoundsSession::new()        -- enumerates displays, builds the engine
//!       ├─ ConfinementEngine       (dedicated thread while active)
//!       └─ HotkeyEngine            (Tokio task polling the keyboard)
//!  └─ wait for Ctrl-C, shut down
//! ```
//!
//! # Usage
//!
//! ```text
//! mouse-bounds [OPTIONS]
//!
//! Options:
//!   --config <PATH>     Config file [env: MOUSE_BOUNDS_CONFIG]
//!   --display <INDEX>   Display to confine to (default: primary)
//!   --mode <MODE>       bounce | flip
//!   --hotkey <KEY>      Toggle key, e.g. F6, ScrollLock
//!   --active            Start with confinement active
//!   --list-displays     Print the detected displays and exit
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use bounds_core::{ClampMode, KeyCode};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use bounds_engine::application::confine_cursor::CursorAccessor;
use bounds_engine::application::hotkey::KeyboardDevice;
use bounds_engine::application::select_display::DisplayEnumerator;
use bounds_engine::application::session::BoundsSession;
use bounds_engine::infrastructure::storage::config::{self, AppConfig, HotkeyConfig};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Confine the mouse cursor to one display.
#[derive(Debug, Parser)]
#[command(
    name = "mouse-bounds",
    about = "Keeps the mouse cursor inside one display, toggled by a global hotkey",
    version
)]
struct Cli {
    /// Path to the TOML config file.  Defaults to the platform config dir.
    #[arg(long, env = "MOUSE_BOUNDS_CONFIG")]
    config: Option<PathBuf>,

    /// Index of the display to confine to (see `--list-displays`).
    #[arg(long)]
    display: Option<usize>,

    /// Correction mode: `bounce` pushes the cursor back inside, `flip`
    /// mirrors it to the opposite edge.
    #[arg(long)]
    mode: Option<ClampMode>,

    /// Key that toggles confinement.
    #[arg(long)]
    hotkey: Option<KeyCode>,

    /// Start with confinement already active.
    #[arg(long)]
    active: bool,

    /// Print the detected displays and exit.
    #[arg(long)]
    list_displays: bool,
}

impl Cli {
    /// Loads the config file and applies CLI overrides on top.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    fn load_config(&self) -> anyhow::Result<AppConfig> {
        let mut cfg = match &self.config {
            Some(path) => config::load_config_from(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => match config::load_config() {
                Ok(cfg) => cfg,
                Err(config::ConfigError::NoPlatformConfigDir) => AppConfig::default(),
                Err(e) => return Err(e).context("loading config"),
            },
        };

        if let Some(display) = self.display {
            cfg.confine.display = Some(display);
        }
        if let Some(mode) = self.mode {
            cfg.confine.mode = mode;
        }
        if let Some(key) = self.hotkey {
            cfg.hotkey.key = key;
        }
        if self.active {
            cfg.general.start_active = true;
        }
        Ok(cfg)
    }
}

// ── Native collaborators ──────────────────────────────────────────────────────

#[cfg(any(target_os = "windows", target_os = "linux"))]
fn native_cursor() -> anyhow::Result<Arc<dyn CursorAccessor>> {
    use bounds_engine::infrastructure::cursor::NativeCursor;
    Ok(Arc::new(NativeCursor::new()?))
}

#[cfg(not(any(target_os = "windows", target_os = "linux")))]
fn native_cursor() -> anyhow::Result<Arc<dyn CursorAccessor>> {
    anyhow::bail!("cursor control is not supported on this platform")
}

#[cfg(any(target_os = "windows", target_os = "linux"))]
fn native_displays() -> anyhow::Result<Box<dyn DisplayEnumerator>> {
    use bounds_engine::infrastructure::screen_info::NativeDisplayEnumerator;
    Ok(Box::new(NativeDisplayEnumerator::new()))
}

#[cfg(not(any(target_os = "windows", target_os = "linux")))]
fn native_displays() -> anyhow::Result<Box<dyn DisplayEnumerator>> {
    anyhow::bail!("display enumeration is not supported on this platform")
}

#[cfg(target_os = "windows")]
fn native_keyboard(_cfg: &HotkeyConfig) -> anyhow::Result<Box<dyn KeyboardDevice>> {
    use bounds_engine::infrastructure::keyboard::NativeKeyboard;
    Ok(Box::new(NativeKeyboard::new()))
}

#[cfg(target_os = "linux")]
fn native_keyboard(cfg: &HotkeyConfig) -> anyhow::Result<Box<dyn KeyboardDevice>> {
    use bounds_engine::infrastructure::keyboard::NativeKeyboard;
    Ok(Box::new(NativeKeyboard::new(cfg.device.clone())))
}

#[cfg(not(any(target_os = "windows", target_os = "linux")))]
fn native_keyboard(_cfg: &HotkeyConfig) -> anyhow::Result<Box<dyn KeyboardDevice>> {
    anyhow::bail!("keyboard devices are not supported on this platform")
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = cli.load_config()?;

    // `RUST_LOG` wins over the config file's level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&cfg.general.log_level)),
        )
        .init();

    let enumerator = native_displays()?;

    if cli.list_displays {
        let displays = enumerator.enumerate().context("enumerating displays")?;
        for (index, display) in displays.iter().enumerate() {
            println!("{index}: {display}  {}", display.region());
        }
        return Ok(());
    }

    info!("mouse-bounds starting");

    let mut session = BoundsSession::new(native_cursor()?, enumerator, cfg.session_settings())
        .context("starting session")?;

    match native_keyboard(&cfg.hotkey) {
        Ok(device) => {
            if let Err(e) = session.attach_hotkey(device, cfg.hotkey.key).await {
                error!("hotkey unavailable, confinement can only start with --active: {e}");
            }
        }
        Err(e) => warn!("{e}"),
    }

    info!("{}.  Press Ctrl-C to exit.", session.status_line());

    tokio::signal::ctrl_c()
        .await
        .context("waiting for Ctrl-C")?;
    info!("shutdown signal received");

    session.shutdown().await;
    info!("mouse-bounds stopped");
    Ok(())
}
