//! HotkeyEngine: detects discrete presses of one key on a raw keyboard device.
//!
//! A background tokio task wakes every `poll_interval`, asks a
//! [`DetectionStrategy`] for new presses, and invokes the registered callback
//! once per press.  Two strategies exist:
//!
//! | Strategy           | Reads                        | Fires when                                  |
//! |--------------------|------------------------------|---------------------------------------------|
//! | [`BufferedEvents`] | buffered key transitions     | each `Pressed` transition of the key        |
//! | [`StateSnapshot`]  | the set of keys currently down | key is down and the set changed since last poll |
//!
//! # Rebinding
//!
//! The poll task owns the [`KeyboardDevice`] and hands it back through its
//! `JoinHandle` when cancelled.  [`HotkeyEngine::rebind`] cancels the task,
//! awaits it, and only then starts a task for the new key, so two loops never
//! fire the callback at the same time and the device is never touched
//! mid-read by a dying loop.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use bounds_core::{KeyCode, KeyMapper, RawKeyCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Default delay between two polls of the keyboard device.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(30);

/// Default number of transitions the device buffers between polls.
pub const DEFAULT_BUFFER_CAPACITY: usize = 128;

/// Callback invoked once per detected press.
pub type HotkeyCallback = Arc<dyn Fn() + Send + Sync>;

/// Error type for hotkey detection.
#[derive(Debug, Error)]
pub enum HotkeyError {
    /// The raw keyboard device could not be opened or acquired.
    #[error("failed to acquire keyboard device: {0}")]
    DeviceAcquisitionFailure(String),

    /// Reading the device failed after it was acquired.
    #[error("keyboard device error: {0}")]
    Device(String),

    /// The poll task panicked; the device it owned is lost.
    #[error("hotkey poll task panicked: {0}")]
    LoopPanicked(String),

    /// The engine has no running poll task.
    #[error("hotkey engine is not running")]
    Stopped,
}

// ── Device boundary ───────────────────────────────────────────────────────────

/// Direction of a buffered key transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyDirection {
    /// The key went down.
    Pressed,
    /// The key came up.
    Released,
}

/// One buffered key transition reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyTransition {
    /// Which key changed.
    pub key: RawKeyCode,
    /// Whether it went down or up.
    pub direction: KeyDirection,
}

impl KeyTransition {
    /// A key-down transition.
    pub fn pressed(key: RawKeyCode) -> Self {
        Self {
            key,
            direction: KeyDirection::Pressed,
        }
    }

    /// A key-up transition.
    pub fn released(key: RawKeyCode) -> Self {
        Self {
            key,
            direction: KeyDirection::Released,
        }
    }
}

/// A detected press of the monitored key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PressEvent {
    /// The key that was pressed.
    pub key: RawKeyCode,
}

/// Raw keyboard device: buffered transitions plus a full "keys down" read.
///
/// Implementations are polled from a single task at a time and must not
/// block; a read with nothing new returns an empty `Vec`.
pub trait KeyboardDevice: Send {
    /// Opens / grabs the device.  Called once before the first poll.
    ///
    /// # Errors
    ///
    /// Returns [`HotkeyError::DeviceAcquisitionFailure`] if the device cannot
    /// be opened.
    fn acquire(&mut self) -> Result<(), HotkeyError>;

    /// Sets how many transitions are kept between polls.  Older transitions
    /// are dropped when the buffer overflows.
    fn set_buffer_capacity(&mut self, capacity: usize);

    /// Returns and clears all transitions buffered since the previous call.
    ///
    /// # Errors
    ///
    /// Returns [`HotkeyError::Device`] on a read failure.
    fn drain_buffered(&mut self) -> Result<Vec<KeyTransition>, HotkeyError>;

    /// Returns every key currently held down.
    ///
    /// # Errors
    ///
    /// Returns [`HotkeyError::Device`] on a read failure.
    fn pressed_keys(&mut self) -> Result<Vec<RawKeyCode>, HotkeyError>;

    /// Releases the device.  Safe to call more than once.
    fn release(&mut self);
}

// ── Detection strategies ──────────────────────────────────────────────────────

/// One poll of the device for presses of `key`.
pub trait DetectionStrategy: Send {
    /// Reads the device once and returns every new press of `key`.
    ///
    /// # Errors
    ///
    /// Propagates device read failures.
    fn poll_once(
        &mut self,
        device: &mut dyn KeyboardDevice,
        key: RawKeyCode,
    ) -> Result<Vec<PressEvent>, HotkeyError>;
}

/// Fires once for every buffered `Pressed` transition of the key.
#[derive(Debug, Default)]
pub struct BufferedEvents;

impl DetectionStrategy for BufferedEvents {
    fn poll_once(
        &mut self,
        device: &mut dyn KeyboardDevice,
        key: RawKeyCode,
    ) -> Result<Vec<PressEvent>, HotkeyError> {
        Ok(device
            .drain_buffered()?
            .into_iter()
            .filter(|t| t.key == key && t.direction == KeyDirection::Pressed)
            .map(|t| PressEvent { key: t.key })
            .collect())
    }
}

/// Fires when the key is down and the set of held keys changed since the
/// previous poll.
///
/// Holding the key produces identical snapshots and therefore no repeats.
/// Pressing another key while holding the monitored key changes the set and
/// fires again.
#[derive(Debug, Default)]
pub struct StateSnapshot {
    previous: Vec<RawKeyCode>,
}

impl DetectionStrategy for StateSnapshot {
    fn poll_once(
        &mut self,
        device: &mut dyn KeyboardDevice,
        key: RawKeyCode,
    ) -> Result<Vec<PressEvent>, HotkeyError> {
        let mut current = device.pressed_keys()?;
        current.sort_unstable();
        current.dedup();

        let fired = current.binary_search(&key).is_ok() && current != self.previous;
        self.previous = current;

        Ok(if fired { vec![PressEvent { key }] } else { Vec::new() })
    }
}

/// Which [`DetectionStrategy`] the engine runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionKind {
    /// [`BufferedEvents`].
    #[default]
    Buffered,
    /// [`StateSnapshot`].
    Snapshot,
}

impl DetectionKind {
    /// Builds a fresh strategy of this kind.
    pub fn build(self) -> Box<dyn DetectionStrategy> {
        match self {
            Self::Buffered => Box::new(BufferedEvents),
            Self::Snapshot => Box::new(StateSnapshot::default()),
        }
    }
}

impl fmt::Display for DetectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Buffered => "buffered",
            Self::Snapshot => "snapshot",
        })
    }
}

impl FromStr for DetectionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buffered" => Ok(Self::Buffered),
            "snapshot" | "state" => Ok(Self::Snapshot),
            other => Err(format!("unknown detection strategy {other:?}")),
        }
    }
}

/// Tuning for the hotkey poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotkeySettings {
    /// Detection strategy.
    pub kind: DetectionKind,
    /// Delay between polls.
    pub poll_interval: Duration,
    /// Device buffer capacity, in transitions.
    pub buffer_capacity: usize,
}

impl Default for HotkeySettings {
    fn default() -> Self {
        Self {
            kind: DetectionKind::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

// ── Engine ────────────────────────────────────────────────────────────────────

/// A running poll task and the token that stops it.
struct PollWorker {
    cancel: CancellationToken,
    handle: JoinHandle<Box<dyn KeyboardDevice>>,
}

/// The hotkey engine.
///
/// Must be created and driven from inside a tokio runtime.
pub struct HotkeyEngine {
    settings: HotkeySettings,
    on_press: HotkeyCallback,
    key: KeyCode,
    worker: Option<PollWorker>,
}

impl HotkeyEngine {
    /// Acquires `device` and starts polling it for presses of `key`.
    ///
    /// # Errors
    ///
    /// Returns [`HotkeyError::DeviceAcquisitionFailure`] if the device cannot
    /// be acquired.  Nothing is spawned in that case.
    pub fn start(
        mut device: Box<dyn KeyboardDevice>,
        settings: HotkeySettings,
        key: KeyCode,
        on_press: HotkeyCallback,
    ) -> Result<Self, HotkeyError> {
        device.acquire().map_err(|e| match e {
            HotkeyError::DeviceAcquisitionFailure(_) => e,
            other => HotkeyError::DeviceAcquisitionFailure(other.to_string()),
        })?;
        device.set_buffer_capacity(settings.buffer_capacity);

        let mut engine = Self {
            settings,
            on_press,
            key,
            worker: None,
        };
        engine.spawn_worker(device);
        Ok(engine)
    }

    /// The key currently monitored.
    pub fn key(&self) -> KeyCode {
        self.key
    }

    /// The settings the engine was started with.
    pub fn settings(&self) -> HotkeySettings {
        self.settings
    }

    /// `true` while a poll task exists.
    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.handle.is_finished())
    }

    /// Stops the current poll task and starts a new one for `key`.
    ///
    /// The old task has fully exited before the new one is spawned.
    ///
    /// # Errors
    ///
    /// Returns [`HotkeyError::Stopped`] if the engine has no task, or
    /// [`HotkeyError::LoopPanicked`] if the old task panicked (the device is
    /// lost and the engine stays stopped).
    pub async fn rebind(&mut self, key: KeyCode) -> Result<(), HotkeyError> {
        let device = self.stop_worker().await?;
        info!("hotkey rebound {} -> {key}", self.key);
        self.key = key;
        self.spawn_worker(device);
        Ok(())
    }

    /// Stops polling and releases the device.
    ///
    /// # Errors
    ///
    /// Returns [`HotkeyError::LoopPanicked`] if the poll task panicked.
    pub async fn shutdown(mut self) -> Result<(), HotkeyError> {
        match self.stop_worker().await {
            Ok(mut device) => {
                device.release();
                debug!("keyboard device released");
                Ok(())
            }
            Err(HotkeyError::Stopped) => Ok(()),
            Err(e) => Err(e),
        }
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    fn spawn_worker(&mut self, device: Box<dyn KeyboardDevice>) {
        let raw = KeyMapper::to_raw_lossy(self.key);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_poll_loop(
            device,
            self.settings.kind.build(),
            raw,
            self.settings.poll_interval,
            Arc::clone(&self.on_press),
            cancel.clone(),
        ));
        info!(
            strategy = %self.settings.kind,
            "monitoring hotkey {} ({raw}) every {:?}",
            self.key,
            self.settings.poll_interval
        );
        self.worker = Some(PollWorker { cancel, handle });
    }

    async fn stop_worker(&mut self) -> Result<Box<dyn KeyboardDevice>, HotkeyError> {
        let worker = self.worker.take().ok_or(HotkeyError::Stopped)?;
        worker.cancel.cancel();
        worker
            .handle
            .await
            .map_err(|e| HotkeyError::LoopPanicked(e.to_string()))
    }
}

impl Drop for HotkeyEngine {
    fn drop(&mut self) {
        // The task drops the device when it observes the cancellation.
        if let Some(worker) = self.worker.take() {
            worker.cancel.cancel();
        }
    }
}

/// Body of the poll task.  Returns the device once cancelled.
async fn run_poll_loop(
    mut device: Box<dyn KeyboardDevice>,
    mut strategy: Box<dyn DetectionStrategy>,
    key: RawKeyCode,
    poll_interval: Duration,
    on_press: HotkeyCallback,
    cancel: CancellationToken,
) -> Box<dyn KeyboardDevice> {
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        match strategy.poll_once(device.as_mut(), key) {
            Ok(presses) => {
                for press in presses {
                    debug!("hotkey {} pressed", press.key);
                    on_press();
                }
            }
            Err(e) => warn!("hotkey poll failed: {e}"),
        }
    }

    debug!("hotkey poll loop for {key} exited");
    device
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const K: RawKeyCode = RawKeyCode(64);
    const OTHER: RawKeyCode = RawKeyCode(30);

    // ── Test doubles ──────────────────────────────────────────────────────────

    /// Replays queued buffers and snapshots, one per read.
    #[derive(Default)]
    struct QueuedDevice {
        buffers: VecDeque<Vec<KeyTransition>>,
        snapshots: VecDeque<Vec<RawKeyCode>>,
        fail_acquire: bool,
        capacity: usize,
    }

    impl KeyboardDevice for QueuedDevice {
        fn acquire(&mut self) -> Result<(), HotkeyError> {
            if self.fail_acquire {
                return Err(HotkeyError::Device("no such device".into()));
            }
            Ok(())
        }

        fn set_buffer_capacity(&mut self, capacity: usize) {
            self.capacity = capacity;
        }

        fn drain_buffered(&mut self) -> Result<Vec<KeyTransition>, HotkeyError> {
            Ok(self.buffers.pop_front().unwrap_or_default())
        }

        fn pressed_keys(&mut self) -> Result<Vec<RawKeyCode>, HotkeyError> {
            Ok(self.snapshots.pop_front().unwrap_or_default())
        }

        fn release(&mut self) {}
    }

    fn poll_n(
        strategy: &mut dyn DetectionStrategy,
        device: &mut QueuedDevice,
        n: usize,
    ) -> usize {
        (0..n)
            .map(|_| strategy.poll_once(device, K).unwrap().len())
            .sum()
    }

    // ── BufferedEvents ────────────────────────────────────────────────────────

    #[test]
    fn test_buffered_fires_once_per_press_in_one_poll() {
        // Arrange
        let mut device = QueuedDevice::default();
        device.buffers.push_back(vec![
            KeyTransition::pressed(K),
            KeyTransition::released(K),
            KeyTransition::pressed(K),
        ]);

        // Act
        let presses = BufferedEvents.poll_once(&mut device, K).unwrap();

        // Assert
        assert_eq!(presses, vec![PressEvent { key: K }, PressEvent { key: K }]);
    }

    #[test]
    fn test_buffered_ignores_releases_and_other_keys() {
        let mut device = QueuedDevice::default();
        device.buffers.push_back(vec![
            KeyTransition::pressed(OTHER),
            KeyTransition::released(K),
            KeyTransition::released(OTHER),
        ]);

        assert!(BufferedEvents.poll_once(&mut device, K).unwrap().is_empty());
    }

    // ── StateSnapshot ─────────────────────────────────────────────────────────

    #[test]
    fn test_snapshot_suppresses_repeats_while_held() {
        // Arrange
        let mut device = QueuedDevice::default();
        device.snapshots.extend([vec![K], vec![K], vec![K]]);
        let mut strategy = StateSnapshot::default();

        // Act
        let fired = poll_n(&mut strategy, &mut device, 3);

        // Assert
        assert_eq!(fired, 1);
    }

    #[test]
    fn test_snapshot_fires_again_after_release() {
        let mut device = QueuedDevice::default();
        device.snapshots.extend([vec![K], vec![], vec![K]]);
        let mut strategy = StateSnapshot::default();

        assert_eq!(poll_n(&mut strategy, &mut device, 3), 2);
    }

    #[test]
    fn test_snapshot_ignores_key_order() {
        let mut device = QueuedDevice::default();
        device.snapshots.extend([vec![K, OTHER], vec![OTHER, K]]);
        let mut strategy = StateSnapshot::default();

        assert_eq!(poll_n(&mut strategy, &mut device, 2), 1);
    }

    #[test]
    fn test_snapshot_does_not_fire_without_key() {
        let mut device = QueuedDevice::default();
        device.snapshots.extend([vec![OTHER], vec![]]);
        let mut strategy = StateSnapshot::default();

        assert_eq!(poll_n(&mut strategy, &mut device, 2), 0);
    }

    // ── DetectionKind ─────────────────────────────────────────────────────────

    #[test]
    fn test_detection_kind_defaults_to_buffered_and_parses() {
        assert_eq!(DetectionKind::default(), DetectionKind::Buffered);
        assert_eq!("Snapshot".parse(), Ok(DetectionKind::Snapshot));
        assert!("hook".parse::<DetectionKind>().is_err());
    }

    // ── HotkeyEngine ──────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_engine_start_surfaces_acquisition_failure() {
        let device = QueuedDevice {
            fail_acquire: true,
            ..Default::default()
        };

        let result = HotkeyEngine::start(
            Box::new(device),
            HotkeySettings::default(),
            KeyCode::F6,
            Arc::new(|| {}),
        );

        assert!(matches!(result, Err(HotkeyError::DeviceAcquisitionFailure(_))));
    }

    #[tokio::test]
    async fn test_engine_invokes_callback_for_buffered_presses() {
        // Arrange
        let mut device = QueuedDevice::default();
        device.buffers.push_back(vec![
            KeyTransition::pressed(K),
            KeyTransition::released(K),
            KeyTransition::pressed(K),
        ]);
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let settings = HotkeySettings {
            poll_interval: Duration::from_millis(1),
            ..HotkeySettings::default()
        };

        // Act
        let engine = HotkeyEngine::start(
            Box::new(device),
            settings,
            KeyCode::F6,
            Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        )
        .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        engine.shutdown().await.unwrap();

        // Assert
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_engine_rebind_changes_key_and_keeps_running() {
        let mut engine = HotkeyEngine::start(
            Box::new(QueuedDevice::default()),
            HotkeySettings::default(),
            KeyCode::F6,
            Arc::new(|| {}),
        )
        .unwrap();

        engine.rebind(KeyCode::ScrollLock).await.unwrap();

        assert_eq!(engine.key(), KeyCode::ScrollLock);
        assert!(engine.is_running());
        engine.shutdown().await.unwrap();
    }
}
