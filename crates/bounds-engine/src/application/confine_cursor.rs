//! ConfinementEngine: keeps the OS cursor inside the active region.
//!
//! The engine owns a dedicated OS thread that repeatedly reads the cursor,
//! asks the current [`ConfinementSnapshot`] for a correction, and writes the
//! corrected position back.  There is no sleep between iterations: the
//! cursor has to be caught before it visibly leaves the display, and polling
//! latency is the only thing that bounds that.
//!
//! # CPU cost
//!
//! While active the loop keeps one core busy.  It calls
//! [`std::thread::yield_now`] every iteration so other runnable threads on
//! the same core are not starved, but it never blocks.  When the engine is
//! idle no thread exists at all.
//!
//! # Shared state
//!
//! The host changes the region, mode and tuning while the loop runs.  All of
//! it lives in one immutable [`ConfinementSnapshot`] behind
//! `RwLock<Arc<..>>`: writers build a complete new snapshot and swap the
//! `Arc`, readers clone the `Arc` once per iteration.  The loop therefore
//! never pairs a new `left`/`right` with a stale `bottom`/`top`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::thread::{self, JoinHandle};

use bounds_core::{
    BoundsRegion, ClampMode, ConfinementSnapshot, ConfinementTuning, Int32Point,
};
use thiserror::Error;
use tracing::{debug, error, info, trace};

/// Name given to the confinement thread (visible in debuggers and `top -H`).
const CONFINE_THREAD_NAME: &str = "mouse-bounds-confine";

/// Error type for the confinement engine.
#[derive(Debug, Error)]
pub enum ConfineError {
    /// The OS refused to create the confinement thread.
    #[error("failed to spawn confinement thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Read/write access to the OS cursor position.
///
/// Treated as infallible: a platform that cannot read or move the cursor is
/// not a condition the engine can recover from.
pub trait CursorAccessor: Send + Sync {
    /// Returns the current cursor position in virtual desktop coordinates.
    fn position(&self) -> Int32Point;

    /// Moves the cursor to `point` in virtual desktop coordinates.
    fn set_position(&self, point: Int32Point);
}

/// State shared between the engine handle and its loop thread.
struct Shared {
    cursor: Arc<dyn CursorAccessor>,
    snapshot: RwLock<Arc<ConfinementSnapshot>>,
    running: AtomicBool,
}

impl Shared {
    fn current(&self) -> Arc<ConfinementSnapshot> {
        Arc::clone(&self.snapshot.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn replace(&self, update: impl FnOnce(&ConfinementSnapshot) -> ConfinementSnapshot) {
        let mut guard = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
        let next = update(&guard);
        *guard = Arc::new(next);
    }
}

/// The confinement engine.
///
/// States are `Idle` (no thread) and `Active` (loop thread running).
/// Transitions are serialized by an internal mutex, so concurrent
/// [`toggle`](Self::toggle) calls from the hotkey task and the host cannot
/// leave two loops running.
pub struct ConfinementEngine {
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl ConfinementEngine {
    /// Creates an idle engine.
    pub fn new(cursor: Arc<dyn CursorAccessor>, snapshot: ConfinementSnapshot) -> Self {
        Self {
            shared: Arc::new(Shared {
                cursor,
                snapshot: RwLock::new(Arc::new(snapshot)),
                running: AtomicBool::new(false),
            }),
            worker: Mutex::new(None),
        }
    }

    /// Returns the snapshot the loop is currently enforcing.
    pub fn snapshot(&self) -> Arc<ConfinementSnapshot> {
        self.shared.current()
    }

    /// Replaces the active region; the safe region is re-derived.
    ///
    /// A running loop picks the change up on its next iteration.
    pub fn set_region(&self, region: BoundsRegion) {
        self.shared.replace(|s| s.with_region(region));
        debug!("active region set to {region}");
    }

    /// Replaces the clamp mode.
    pub fn set_mode(&self, mode: ClampMode) {
        self.shared.replace(|s| s.with_mode(mode));
        debug!("clamp mode set to {mode}");
    }

    /// Replaces the tuning; the safe region is re-derived.
    pub fn set_tuning(&self, tuning: ConfinementTuning) {
        self.shared.replace(|s| s.with_tuning(tuning));
        debug!(?tuning, "confinement tuning updated");
    }

    /// `true` while the loop thread is (or is about to be) running.
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Flips between idle and active and returns the new state.
    ///
    /// # Errors
    ///
    /// Returns [`ConfineError::Spawn`] if going active fails to create the
    /// loop thread.  The engine stays idle in that case.
    pub fn toggle(&self) -> Result<bool, ConfineError> {
        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        if self.is_running() {
            self.stop_locked(&mut worker);
            Ok(false)
        } else {
            self.start_locked(&mut worker)?;
            Ok(true)
        }
    }

    /// Goes active.  Returns `false` if the engine was already active.
    ///
    /// # Errors
    ///
    /// Returns [`ConfineError::Spawn`] if the loop thread cannot be created.
    pub fn start(&self) -> Result<bool, ConfineError> {
        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        if self.is_running() {
            return Ok(false);
        }
        self.start_locked(&mut worker)?;
        Ok(true)
    }

    /// Goes idle.  Returns `false` if the engine was already idle.
    ///
    /// When this returns the loop thread has exited, so no further cursor
    /// writes will happen.
    pub fn stop(&self) -> bool {
        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        let was_running = self.is_running();
        self.stop_locked(&mut worker);
        was_running
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    fn start_locked(&self, worker: &mut Option<JoinHandle<()>>) -> Result<(), ConfineError> {
        // A previous loop may have been stopped without being joined.
        self.stop_locked(worker);

        self.shared.running.store(true, Ordering::Release);
        let shared = Arc::clone(&self.shared);
        match thread::Builder::new()
            .name(CONFINE_THREAD_NAME.to_string())
            .spawn(move || run_confinement_loop(&shared))
        {
            Ok(handle) => {
                *worker = Some(handle);
                info!("confinement active on {}", self.snapshot().active_region());
                Ok(())
            }
            Err(e) => {
                self.shared.running.store(false, Ordering::Release);
                error!("could not start confinement loop: {e}");
                Err(ConfineError::Spawn(e))
            }
        }
    }

    fn stop_locked(&self, worker: &mut Option<JoinHandle<()>>) {
        self.shared.running.store(false, Ordering::Release);
        if let Some(handle) = worker.take() {
            if handle.join().is_err() {
                error!("confinement loop panicked");
            }
            info!("confinement inactive");
        }
    }
}

impl Drop for ConfinementEngine {
    fn drop(&mut self) {
        let worker = self.worker.get_mut().unwrap_or_else(PoisonError::into_inner);
        self.shared.running.store(false, Ordering::Release);
        if let Some(handle) = worker.take() {
            let _ = handle.join();
        }
    }
}

/// Body of the confinement thread.
///
/// Runs until `running` is cleared.  The flag is checked before every cursor
/// read, so a stop is observed within one iteration.
fn run_confinement_loop(shared: &Shared) {
    debug!("confinement loop entered");
    let mut corrections: u64 = 0;

    while shared.running.load(Ordering::Acquire) {
        let snapshot = shared.current();
        let point = shared.cursor.position();

        if let Some(target) = snapshot.correct(point) {
            if target != point {
                trace!(mode = %snapshot.mode(), "cursor {point} -> {target}");
                shared.cursor.set_position(target);
                corrections += 1;
            }
        }

        thread::yield_now();
    }

    debug!(corrections, "confinement loop exited");
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    use crate::infrastructure::cursor::RecordingCursor;

    fn full_hd_snapshot(mode: ClampMode) -> ConfinementSnapshot {
        ConfinementSnapshot::new(
            BoundsRegion::from_edges(0, 1920, 0, 1080),
            mode,
            ConfinementTuning::default(),
        )
    }

    fn wait_for(mut condition: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !condition() {
            assert!(Instant::now() < deadline, "condition not met within 5s");
            thread::sleep(Duration::from_millis(1));
        }
    }

    // ── Toggle state machine ──────────────────────────────────────────────────

    #[test]
    fn test_engine_starts_idle() {
        let cursor = Arc::new(RecordingCursor::pinned(Int32Point::new(2, 500)));
        let engine = ConfinementEngine::new(cursor.clone(), full_hd_snapshot(ClampMode::Bounce));

        thread::sleep(Duration::from_millis(10));

        assert!(!engine.is_running());
        assert_eq!(cursor.write_count(), 0);
    }

    #[test]
    fn test_toggle_twice_returns_to_idle_and_stops_writes() {
        // Arrange
        let cursor = Arc::new(RecordingCursor::pinned(Int32Point::new(2, 500)));
        let engine = ConfinementEngine::new(cursor.clone(), full_hd_snapshot(ClampMode::Bounce));

        // Act
        assert!(engine.toggle().unwrap());
        wait_for(|| cursor.write_count() > 0);
        assert!(!engine.toggle().unwrap());
        let after_stop = cursor.write_count();
        thread::sleep(Duration::from_millis(20));

        // Assert
        assert!(!engine.is_running());
        assert_eq!(cursor.write_count(), after_stop);
    }

    #[test]
    fn test_start_when_active_returns_false() {
        let cursor = Arc::new(RecordingCursor::pinned(Int32Point::new(960, 540)));
        let engine = ConfinementEngine::new(cursor, full_hd_snapshot(ClampMode::Bounce));

        assert!(engine.start().unwrap());
        assert!(!engine.start().unwrap());
        assert!(engine.stop());
        assert!(!engine.stop());
    }

    // ── Corrections ───────────────────────────────────────────────────────────

    #[test]
    fn test_loop_bounces_left_intrusion() {
        let cursor = Arc::new(RecordingCursor::pinned(Int32Point::new(2, 500)));
        let engine = ConfinementEngine::new(cursor.clone(), full_hd_snapshot(ClampMode::Bounce));

        engine.start().unwrap();
        wait_for(|| cursor.write_count() > 0);
        engine.stop();

        assert_eq!(cursor.last_write(), Some(Int32Point::new(15, 500)));
        assert_eq!(cursor.current(), Int32Point::new(2, 500));
    }

    #[test]
    fn test_loop_does_not_write_inside_safe_region() {
        let cursor = Arc::new(RecordingCursor::pinned(Int32Point::new(960, 540)));
        let engine = ConfinementEngine::new(cursor.clone(), full_hd_snapshot(ClampMode::Flip));

        engine.start().unwrap();
        thread::sleep(Duration::from_millis(20));
        engine.stop();

        assert_eq!(cursor.write_count(), 0);
    }

    #[test]
    fn test_mode_change_applies_without_restart() {
        // Arrange
        let cursor = Arc::new(RecordingCursor::pinned(Int32Point::new(2, 500)));
        let engine = ConfinementEngine::new(cursor.clone(), full_hd_snapshot(ClampMode::Bounce));
        engine.start().unwrap();
        wait_for(|| cursor.write_count() > 0);

        // Act
        engine.set_mode(ClampMode::Flip);
        let flip_target = Int32Point::new(1905, 500);
        wait_for(|| cursor.last_write() == Some(flip_target));
        engine.stop();

        // Assert
        assert_eq!(engine.snapshot().mode(), ClampMode::Flip);
    }

    #[test]
    fn test_set_region_rederives_safe_region() {
        let cursor = Arc::new(RecordingCursor::pinned(Int32Point::ZERO));
        let engine = ConfinementEngine::new(cursor, full_hd_snapshot(ClampMode::Bounce));

        engine.set_region(BoundsRegion::from_edges(1920, 3840, 0, 1080));

        assert_eq!(
            *engine.snapshot().safe_region(),
            BoundsRegion::from_edges(1925, 3835, 5, 1075)
        );
    }

    #[test]
    fn test_drop_stops_running_loop() {
        let cursor = Arc::new(RecordingCursor::pinned(Int32Point::new(2, 500)));
        let engine = ConfinementEngine::new(cursor.clone(), full_hd_snapshot(ClampMode::Bounce));
        engine.start().unwrap();
        wait_for(|| cursor.write_count() > 0);

        drop(engine);
        let after_drop = cursor.write_count();
        thread::sleep(Duration::from_millis(20));

        assert_eq!(cursor.write_count(), after_drop);
    }
}
