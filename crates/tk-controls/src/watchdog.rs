//! Sensor feed liveness.

use tk_core::{Millis, NEVER};
use tk_state::SharedState;

use crate::error::{ControlError, ControlResult};

/// `true` iff telemetry was ever received and the last update is younger
/// than `timeout_ms`.
///
/// Uses the [`NEVER`] timestamp rather than the level, since a level of
/// exactly zero is a legitimate reading.
pub fn is_connected(last_telemetry_at: Millis, now: Millis, timeout_ms: Millis) -> bool {
    last_telemetry_at != NEVER && now.saturating_sub(last_telemetry_at) < timeout_ms
}

/// Connectivity check with a fixed timeout (T2).
///
/// Holds no verdict of its own: every call re-reads the shared state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectivityWatchdog {
    timeout_ms: Millis,
}

impl ConnectivityWatchdog {
    /// # Errors
    ///
    /// Returns error if `timeout_ms` is zero.
    pub fn new(timeout_ms: Millis) -> ControlResult<Self> {
        if timeout_ms == 0 {
            return Err(ControlError::InvalidArg {
                what: "connectivity timeout must be positive",
            });
        }
        Ok(Self { timeout_ms })
    }

    pub fn timeout_ms(&self) -> Millis {
        self.timeout_ms
    }

    pub fn is_connected(&self, state: &SharedState, now: Millis) -> bool {
        is_connected(state.last_telemetry_at(), now, self.timeout_ms)
    }
}
