//! In-memory cursor for tests.
//!
//! [`RecordingCursor`] stands in for the OS pointer.  Reads return either the
//! next scripted position or the current one; writes are counted and the most
//! recent ones kept for assertions.
//!
//! Two behaviours are available:
//!
//! - [`RecordingCursor::at`] follows writes like a real pointer, so after a
//!   correction the next read sees the corrected position.
//! - [`RecordingCursor::pinned`] ignores writes, which models a user holding
//!   the mouse hard against an edge: every iteration of the confinement loop
//!   sees the same out-of-bounds position.
//!
//! The confinement loop is unthrottled, so only the last
//! [`HISTORY_LIMIT`] writes are retained; [`write_count`](RecordingCursor::write_count)
//! reports the total.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use bounds_core::Int32Point;

use crate::application::confine_cursor::CursorAccessor;

/// Number of most recent writes kept by [`RecordingCursor`].
pub const HISTORY_LIMIT: usize = 1024;

#[derive(Default)]
struct CursorState {
    position: Int32Point,
    scripted: VecDeque<Int32Point>,
    writes: VecDeque<Int32Point>,
    write_count: usize,
    read_count: usize,
}

/// A cursor that records every write without touching the OS.
pub struct RecordingCursor {
    state: Mutex<CursorState>,
    follow_writes: bool,
}

impl RecordingCursor {
    /// A cursor at `start` that moves when written to.
    pub fn at(start: Int32Point) -> Self {
        Self::with_behaviour(start, true)
    }

    /// A cursor held at `start`: writes are recorded but never applied.
    pub fn pinned(start: Int32Point) -> Self {
        Self::with_behaviour(start, false)
    }

    fn with_behaviour(start: Int32Point, follow_writes: bool) -> Self {
        Self {
            state: Mutex::new(CursorState {
                position: start,
                ..CursorState::default()
            }),
            follow_writes,
        }
    }

    /// Queues positions returned by the next reads, one per read, as if the
    /// user moved the mouse.  Each becomes the current position when read.
    pub fn script(&self, positions: impl IntoIterator<Item = Int32Point>) {
        self.lock().scripted.extend(positions);
    }

    /// Teleports the cursor, discarding any scripted positions.
    pub fn move_to(&self, point: Int32Point) {
        let mut state = self.lock();
        state.scripted.clear();
        state.position = point;
    }

    /// The position the next unscripted read would return.
    pub fn current(&self) -> Int32Point {
        self.lock().position
    }

    /// Total number of writes.
    pub fn write_count(&self) -> usize {
        self.lock().write_count
    }

    /// Total number of reads.
    pub fn read_count(&self) -> usize {
        self.lock().read_count
    }

    /// The most recent write, if any.
    pub fn last_write(&self) -> Option<Int32Point> {
        self.lock().writes.back().copied()
    }

    /// The retained writes, oldest first.
    pub fn writes(&self) -> Vec<Int32Point> {
        self.lock().writes.iter().copied().collect()
    }

    /// Clears the write history and counters.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.writes.clear();
        state.write_count = 0;
        state.read_count = 0;
    }

    fn lock(&self) -> MutexGuard<'_, CursorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CursorAccessor for RecordingCursor {
    fn position(&self) -> Int32Point {
        let mut state = self.lock();
        state.read_count += 1;
        if let Some(next) = state.scripted.pop_front() {
            state.position = next;
        }
        state.position
    }

    fn set_position(&self, point: Int32Point) {
        let mut state = self.lock();
        state.write_count += 1;
        if state.writes.len() == HISTORY_LIMIT {
            state.writes.pop_front();
        }
        state.writes.push_back(point);
        if self.follow_writes {
            state.position = point;
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
