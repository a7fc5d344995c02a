//! BoundsSession: the host that wires displays, confinement, and the hotkey.
//!
//! The session owns the [`ConfinementEngine`], the [`DisplaySelection`] that
//! feeds it a region, and (once attached) the [`HotkeyEngine`] whose callback
//! toggles confinement.  Everything the user can change at runtime (display,
//! mode, tuning, hotkey) goes through here.

use std::sync::Arc;

use bounds_core::{ClampMode, ConfinementSnapshot, ConfinementTuning, KeyCode};
use thiserror::Error;
use tracing::{error, info, warn};

use super::confine_cursor::{ConfineError, ConfinementEngine, CursorAccessor};
use super::hotkey::{HotkeyCallback, HotkeyEngine, HotkeyError, HotkeySettings, KeyboardDevice};
use super::select_display::{DisplayEnumerator, DisplayError, DisplayInfo, DisplaySelection};

/// Error type for session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Display(#[from] DisplayError),

    #[error(transparent)]
    Hotkey(#[from] HotkeyError),

    #[error(transparent)]
    Confine(#[from] ConfineError),
}

/// Everything needed to start a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    /// Initial clamp mode.
    pub mode: ClampMode,
    /// Confinement tuning.
    pub tuning: ConfinementTuning,
    /// Display index to confine to; `None` selects the primary display.
    pub display: Option<usize>,
    /// Start with confinement already active.
    pub start_active: bool,
    /// Hotkey poll loop settings.
    pub hotkey: HotkeySettings,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            mode: ClampMode::default(),
            tuning: ConfinementTuning::default(),
            display: None,
            start_active: false,
            hotkey: HotkeySettings::default(),
        }
    }
}

/// The running application state.
pub struct BoundsSession {
    confinement: Arc<ConfinementEngine>,
    displays: DisplaySelection,
    hotkey: Option<HotkeyEngine>,
    hotkey_key: KeyCode,
    hotkey_settings: HotkeySettings,
}

impl BoundsSession {
    /// Enumerates displays, selects the configured (or primary) display, and
    /// builds an idle confinement engine for it.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Display`] if no display can be enumerated, or
    /// [`SessionError::Confine`] if `start_active` is set and the confinement
    /// thread cannot be spawned.
    pub fn new(
        cursor: Arc<dyn CursorAccessor>,
        enumerator: Box<dyn DisplayEnumerator>,
        settings: SessionSettings,
    ) -> Result<Self, SessionError> {
        let mut displays = DisplaySelection::new(enumerator)?;
        if let Some(index) = settings.display {
            displays.select(index)?;
        }

        let snapshot =
            ConfinementSnapshot::new(displays.selected().region(), settings.mode, settings.tuning);
        info!(
            "session ready on {}: {} ({} mode)",
            displays.selected(),
            snapshot.active_region(),
            settings.mode
        );
        let confinement = Arc::new(ConfinementEngine::new(cursor, snapshot));

        if settings.start_active {
            confinement.start()?;
        }

        Ok(Self {
            confinement,
            displays,
            hotkey: None,
            hotkey_key: KeyCode::F6,
            hotkey_settings: settings.hotkey,
        })
    }

    /// Starts the hotkey engine on `device`; each press toggles confinement.
    ///
    /// Replaces any previously attached hotkey engine.
    ///
    /// # Errors
    ///
    /// Returns [`HotkeyError::DeviceAcquisitionFailure`] if the device cannot
    /// be acquired.  Confinement keeps working without a hotkey.
    pub async fn attach_hotkey(
        &mut self,
        device: Box<dyn KeyboardDevice>,
        key: KeyCode,
    ) -> Result<(), HotkeyError> {
        if let Some(previous) = self.hotkey.take() {
            previous.shutdown().await?;
        }

        let confinement = Arc::clone(&self.confinement);
        let on_press: HotkeyCallback = Arc::new(move || match confinement.toggle() {
            Ok(true) => info!("confinement activated by hotkey"),
            Ok(false) => info!("confinement deactivated by hotkey"),
            Err(e) => error!("hotkey toggle failed: {e}"),
        });

        let engine = HotkeyEngine::start(device, self.hotkey_settings, key, on_press)?;
        self.hotkey_key = key;
        self.hotkey = Some(engine);
        Ok(())
    }

    /// Confines to display `index`, falling back to the primary display when
    /// `index` is out of range.  Returns the index actually selected.
    ///
    /// # Errors
    ///
    /// Only fails if the fallback re-enumeration fails.
    pub fn select_display(&mut self, index: usize) -> Result<usize, SessionError> {
        let selected = self.displays.select(index)?;
        self.confinement
            .set_region(self.displays.selected().region());
        Ok(selected)
    }

    /// Changes the clamp mode; takes effect on the next loop iteration.
    pub fn set_mode(&self, mode: ClampMode) {
        info!("clamp mode set to {mode}");
        self.confinement.set_mode(mode);
    }

    /// Changes the confinement tuning.
    pub fn set_tuning(&self, tuning: ConfinementTuning) {
        self.confinement.set_tuning(tuning);
    }

    /// Monitors `key` instead of the current hotkey.
    ///
    /// # Errors
    ///
    /// Returns [`HotkeyError::Stopped`] if no hotkey engine is attached, or
    /// [`HotkeyError::LoopPanicked`] if the old poll task panicked.
    pub async fn rebind_hotkey(&mut self, key: KeyCode) -> Result<(), HotkeyError> {
        let engine = self.hotkey.as_mut().ok_or(HotkeyError::Stopped)?;
        engine.rebind(key).await?;
        self.hotkey_key = key;
        Ok(())
    }

    /// Flips confinement on or off.  Returns `true` if now active.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Confine`] if the confinement thread cannot be
    /// spawned.
    pub fn toggle(&self) -> Result<bool, SessionError> {
        Ok(self.confinement.toggle()?)
    }

    /// `true` while confinement is active.
    pub fn is_active(&self) -> bool {
        self.confinement.is_running()
    }

    /// One-line status: `Active`, or `Inactive [KEY]` naming the hotkey.
    pub fn status_line(&self) -> String {
        if self.is_active() {
            "Active".to_string()
        } else {
            format!("Inactive [{}]", self.hotkey_key)
        }
    }

    /// The monitored hotkey.
    pub fn hotkey_key(&self) -> KeyCode {
        self.hotkey_key
    }

    /// `true` once a hotkey engine is attached and polling.
    pub fn has_hotkey(&self) -> bool {
        self.hotkey.as_ref().is_some_and(HotkeyEngine::is_running)
    }

    /// Known displays.
    pub fn displays(&self) -> &[DisplayInfo] {
        self.displays.displays()
    }

    /// The display currently confined to.
    pub fn selected_display(&self) -> &DisplayInfo {
        self.displays.selected()
    }

    /// The confinement engine.
    pub fn confinement(&self) -> &Arc<ConfinementEngine> {
        &self.confinement
    }

    /// Stops the hotkey task and the confinement loop.
    pub async fn shutdown(mut self) {
        if let Some(engine) = self.hotkey.take() {
            if let Err(e) = engine.shutdown().await {
                warn!("hotkey shutdown: {e}");
            }
        }
        self.confinement.stop();
        info!("session shut down");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::cursor::RecordingCursor;
    use crate::infrastructure::keyboard::ScriptedKeyboard;
    use crate::infrastructure::screen_info::MockScreenEnumerator;
    use bounds_core::{BoundsRegion, Int32Point};

    fn session_on(enumerator: MockScreenEnumerator, settings: SessionSettings) -> BoundsSession {
        let cursor = Arc::new(RecordingCursor::at(Int32Point::new(500, 500)));
        BoundsSession::new(cursor, Box::new(enumerator), settings).unwrap()
    }

    #[test]
    fn test_session_new_confines_to_primary_display() {
        // Arrange / Act
        let session = session_on(MockScreenEnumerator::dual_1440p(), SessionSettings::default());

        // Assert
        assert!(session.selected_display().is_primary);
        assert_eq!(
            *session.confinement().snapshot().active_region(),
            BoundsRegion::from_edges(0, 2560, 0, 1440)
        );
        assert!(!session.is_active());
    }

    #[test]
    fn test_session_new_honours_configured_display() {
        let settings = SessionSettings {
            display: Some(1),
            ..SessionSettings::default()
        };

        let session = session_on(MockScreenEnumerator::dual_1440p(), settings);

        assert_eq!(
            *session.confinement().snapshot().active_region(),
            BoundsRegion::from_edges(2560, 5120, 0, 1440)
        );
    }

    #[test]
    fn test_session_select_display_out_of_range_falls_back_to_primary() {
        // Arrange
        let mut session = session_on(MockScreenEnumerator::dual_1440p(), SessionSettings::default());
        session.select_display(1).unwrap();

        // Act
        let selected = session.select_display(9).unwrap();

        // Assert
        assert_eq!(selected, 0);
        assert_eq!(
            *session.confinement().snapshot().active_region(),
            BoundsRegion::from_edges(0, 2560, 0, 1440)
        );
    }

    #[test]
    fn test_session_status_line_names_hotkey_when_inactive() {
        let session = session_on(MockScreenEnumerator::single_1080p(), SessionSettings::default());

        assert_eq!(session.status_line(), "Inactive [F6]");
        assert!(session.toggle().unwrap());
        assert_eq!(session.status_line(), "Active");
        assert!(!session.toggle().unwrap());
    }

    #[test]
    fn test_session_start_active_runs_confinement_immediately() {
        let settings = SessionSettings {
            start_active: true,
            ..SessionSettings::default()
        };

        let session = session_on(MockScreenEnumerator::single_1080p(), settings);

        assert!(session.is_active());
        session.confinement().stop();
    }

    #[test]
    fn test_session_set_mode_updates_snapshot() {
        let session = session_on(MockScreenEnumerator::single_1080p(), SessionSettings::default());

        session.set_mode(ClampMode::Flip);

        assert_eq!(session.confinement().snapshot().mode(), ClampMode::Flip);
    }

    #[tokio::test]
    async fn test_session_rebind_without_hotkey_reports_stopped() {
        let mut session = session_on(MockScreenEnumerator::single_1080p(), SessionSettings::default());

        let result = session.rebind_hotkey(KeyCode::F7).await;

        assert!(matches!(result, Err(HotkeyError::Stopped)));
    }

    #[tokio::test]
    async fn test_session_attach_hotkey_failure_leaves_confinement_usable() {
        // Arrange
        let mut session = session_on(MockScreenEnumerator::single_1080p(), SessionSettings::default());
        let keyboard = ScriptedKeyboard::new();
        keyboard.fail_acquire(true);

        // Act
        let result = session.attach_hotkey(Box::new(keyboard), KeyCode::F6).await;

        // Assert
        assert!(matches!(result, Err(HotkeyError::DeviceAcquisitionFailure(_))));
        assert!(!session.has_hotkey());
        assert!(session.toggle().unwrap());
        session.shutdown().await;
    }

    #[tokio::test]
    async fn test_session_rebind_updates_status_key() {
        // Arrange
        let mut session = session_on(MockScreenEnumerator::single_1080p(), SessionSettings::default());
        session
            .attach_hotkey(Box::new(ScriptedKeyboard::new()), KeyCode::F6)
            .await
            .unwrap();

        // Act
        session.rebind_hotkey(KeyCode::ScrollLock).await.unwrap();

        // Assert
        assert_eq!(session.status_line(), "Inactive [ScrollLock]");
        session.shutdown().await;
    }
}
