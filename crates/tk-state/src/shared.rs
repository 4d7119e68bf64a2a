//! The `SystemState` aggregate behind a reader/writer lock.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tk_core::{CoreResult, LevelReading, Millis, Mode, NEVER, Real, clamp_percent};
use tracing::{info, trace};

use crate::history::LevelHistory;

#[derive(Debug)]
struct Inner {
    mode: Mode,
    level: Real,
    valve_opening: u8,
    last_telemetry_at: Millis,
    history: LevelHistory,
}

/// Consistent point-in-time copy of the scalar fields.
///
/// Taken under a single read guard, so `level` and `last_telemetry_at` always
/// come from the same `record_level` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateSnapshot {
    pub mode: Mode,
    pub level: Real,
    pub valve_opening: u8,
    pub last_telemetry_at: Millis,
}

/// Thread-safe control state shared by reference across all components.
///
/// Starts in [`Mode::Unconnected`] with level 0, valve 0 and no telemetry.
#[derive(Debug)]
pub struct SharedState {
    inner: RwLock<Inner>,
}

impl SharedState {
    /// Create state with a history bounded to `history_capacity` readings.
    ///
    /// # Errors
    ///
    /// Returns error if `history_capacity` is zero.
    pub fn new(history_capacity: usize) -> CoreResult<Self> {
        Ok(Self::with_history(LevelHistory::new(history_capacity)?))
    }

    fn with_history(history: LevelHistory) -> Self {
        Self {
            inner: RwLock::new(Inner {
                mode: Mode::Unconnected,
                level: 0.0,
                valve_opening: 0,
                last_telemetry_at: NEVER,
                history,
            }),
        }
    }

    // Every critical section below leaves `Inner` consistent before anything
    // that could panic, so a poisoned lock still guards valid data.
    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn mode(&self) -> Mode {
        self.read().mode
    }

    /// Current level in centimeters.
    pub fn level(&self) -> Real {
        self.read().level
    }

    /// Recorded valve opening, always within `[0, 100]`.
    pub fn valve_opening(&self) -> u8 {
        self.read().valve_opening
    }

    /// Timestamp of the last telemetry update, [`NEVER`] if none arrived yet.
    pub fn last_telemetry_at(&self) -> Millis {
        self.read().last_telemetry_at
    }

    /// Copy of the level history in arrival order.
    pub fn history(&self) -> Vec<LevelReading> {
        self.read().history.to_vec()
    }

    pub fn history_capacity(&self) -> usize {
        self.read().history.capacity()
    }

    pub fn snapshot(&self) -> StateSnapshot {
        let inner = self.read();
        StateSnapshot {
            mode: inner.mode,
            level: inner.level,
            valve_opening: inner.valve_opening,
            last_telemetry_at: inner.last_telemetry_at,
        }
    }

    /// Replace the mode unconditionally; returns the previous mode.
    pub fn set_mode(&self, mode: Mode) -> Mode {
        let previous = std::mem::replace(&mut self.write().mode, mode);
        if previous != mode {
            info!(from = %previous, to = %mode, "mode changed");
        }
        previous
    }

    /// Atomically compute and apply a mode change.
    ///
    /// `decide` sees the current mode under the write lock and returns the
    /// mode to switch to, or `None` to leave it alone. Returns
    /// `Some((from, to))` when a change was applied.
    pub fn transition_mode<F>(&self, decide: F) -> Option<(Mode, Mode)>
    where
        F: FnOnce(Mode) -> Option<Mode>,
    {
        let change = {
            let mut inner = self.write();
            let from = inner.mode;
            match decide(from) {
                Some(to) if to != from => {
                    inner.mode = to;
                    Some((from, to))
                }
                _ => None,
            }
        };
        if let Some((from, to)) = change {
            info!(from = %from, to = %to, "mode changed");
        }
        change
    }

    /// Record a telemetry value.
    ///
    /// Level, telemetry timestamp and history append change together under
    /// one write guard; the oldest reading is evicted if the history is full.
    pub fn record_level(&self, level: Real, now: Millis) -> LevelReading {
        let reading = LevelReading::new(level, now);
        {
            let mut inner = self.write();
            inner.level = level;
            inner.last_telemetry_at = now;
            inner.history.push(reading);
        }
        trace!(level_cm = level, at = now, "level recorded");
        reading
    }

    /// Store a valve opening clamped to `[0, 100]`; returns the stored value.
    ///
    /// Out-of-range input is never rejected here.
    pub fn set_valve_opening(&self, opening: i64) -> u8 {
        let clamped = clamp_percent(opening);
        let previous = std::mem::replace(&mut self.write().valve_opening, clamped);
        if previous != clamped {
            trace!(from = previous, to = clamped, "valve opening updated");
        }
        clamped
    }

    /// Store a valve opening only while the mode is still `expected`.
    ///
    /// Mode check and write happen under one write guard. Returns the stored
    /// value, or `Err` with the current mode if it has moved on.
    pub fn set_valve_opening_in(&self, expected: Mode, opening: i64) -> Result<u8, Mode> {
        let clamped = clamp_percent(opening);
        let previous = {
            let mut inner = self.write();
            if inner.mode != expected {
                return Err(inner.mode);
            }
            std::mem::replace(&mut inner.valve_opening, clamped)
        };
        if previous != clamped {
            trace!(from = previous, to = clamped, mode = %expected, "valve opening updated");
        }
        Ok(clamped)
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::with_history(LevelHistory::default())
    }
}
