//! Operator-facing queries and commands.
//!
//! The dashboard endpoint calls into [`OperatorService`] for status and
//! history, mode switches, and manual valve overrides. Report types
//! serialize with the key names the dashboard expects.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use tk_controls::{ActuatorSink, ConnectivityWatchdog, ModeController};
use tk_core::{Clock, Millis, Mode, Real, VALVE_OPEN};
use tk_state::SharedState;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub mode: Mode,
    #[serde(rename = "waterLevel")]
    pub level_cm: Real,
    pub valve_opening: u8,
    #[serde(rename = "tmsConnected")]
    pub connected: bool,
    #[serde(rename = "timestamp")]
    pub generated_at: DateTime<Utc>,
}

/// One history reading as shown on the dashboard.
///
/// `timestamp` is the unit's monotonic clock and only orders readings;
/// `recorded_at` maps it onto wall-clock time for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub level: Real,
    pub timestamp: Millis,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryReport {
    pub readings: Vec<HistoryEntry>,
    pub count: usize,
}

pub struct OperatorService {
    state: Arc<SharedState>,
    modes: ModeController,
    watchdog: ConnectivityWatchdog,
    actuator: Arc<dyn ActuatorSink>,
    clock: Arc<dyn Clock>,
    // Serializes mode switches and manual overrides so a valve override can't
    // interleave with a switch out of MANUAL.
    override_lock: Mutex<()>,
}

impl OperatorService {
    pub fn new(
        state: Arc<SharedState>,
        watchdog: ConnectivityWatchdog,
        actuator: Arc<dyn ActuatorSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            modes: ModeController::new(Arc::clone(&state)),
            state,
            watchdog,
            actuator,
            clock,
            override_lock: Mutex::new(()),
        }
    }

    pub fn status(&self) -> StatusReport {
        let snapshot = self.state.snapshot();
        StatusReport {
            mode: snapshot.mode,
            level_cm: snapshot.level,
            valve_opening: snapshot.valve_opening,
            connected: tk_controls::is_connected(
                snapshot.last_telemetry_at,
                self.clock.now_ms(),
                self.watchdog.timeout_ms(),
            ),
            generated_at: Utc::now(),
        }
    }

    pub fn history(&self) -> HistoryReport {
        let now = self.clock.now_ms();
        let wall = Utc::now();
        let readings: Vec<HistoryEntry> = self
            .state
            .history()
            .into_iter()
            .map(|reading| HistoryEntry {
                level: reading.level,
                timestamp: reading.timestamp,
                recorded_at: wall_clock_at(wall, now.saturating_sub(reading.timestamp)),
            })
            .collect();
        HistoryReport {
            count: readings.len(),
            readings,
        }
    }

    /// Liveness check with a caller-chosen timeout.
    pub fn is_connected(&self, timeout_ms: u64) -> bool {
        tk_controls::is_connected(
            self.state.last_telemetry_at(),
            self.clock.now_ms(),
            timeout_ms,
        )
    }

    /// Parse a case-insensitive mode name and request it.
    pub fn request_mode_named(&self, name: &str) -> AppResult<Mode> {
        let mode = name.parse::<Mode>().map_err(|e| {
            warn!(requested = name, "rejected unknown mode");
            AppError::from(e)
        })?;
        self.request_mode(mode)
    }

    /// Switch to `Automatic` or `Manual` and tell the valve controller.
    ///
    /// Returns the previous mode. The change stands even if the valve
    /// controller can't be told; that failure is only logged.
    pub fn request_mode(&self, mode: Mode) -> AppResult<Mode> {
        let _guard = self.lock_overrides();
        let previous = self.modes.request_mode(mode)?;
        info!(from = %previous, to = %mode, "operator mode request");

        if let Err(error) = self.actuator.send_mode_command(mode) {
            warn!(%error, mode = %mode, "mode command not delivered");
        }
        Ok(previous)
    }

    /// Manual valve override; returns the applied opening.
    ///
    /// # Errors
    ///
    /// - [`AppError::OutOfRange`] outside `0..=100`
    /// - [`AppError::NotManual`] unless the unit is in `Manual`
    /// - [`AppError::Actuator`] if delivery fails; the recorded opening is
    ///   left unchanged
    pub fn set_valve(&self, opening: i64) -> AppResult<u8> {
        let opening = match u8::try_from(opening) {
            Ok(v) if v <= VALVE_OPEN => v,
            _ => {
                warn!(opening, "rejected out-of-range valve request");
                return Err(AppError::OutOfRange { value: opening });
            }
        };

        let _guard = self.lock_overrides();
        let mode = self.state.mode();
        if mode != Mode::Manual {
            warn!(mode = %mode, "rejected valve request outside MANUAL");
            return Err(AppError::NotManual { mode });
        }

        self.actuator.send_valve_command(opening)?;
        let stored = self.state.set_valve_opening(opening.into());
        info!(opening = stored, "manual valve override");
        Ok(stored)
    }

    fn lock_overrides(&self) -> std::sync::MutexGuard<'_, ()> {
        self.override_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn wall_clock_at(wall: DateTime<Utc>, age_ms: Millis) -> DateTime<Utc> {
    TimeDelta::try_milliseconds(i64::try_from(age_ms).unwrap_or(i64::MAX))
        .and_then(|age| wall.checked_sub_signed(age))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
