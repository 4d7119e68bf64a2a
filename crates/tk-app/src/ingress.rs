//! Boundary of the telemetry feed.
//!
//! The subscriber transport hands every raw payload to
//! [`TelemetryIngress::handle_payload`]. Malformed values stop here and never
//! reach the shared state.

use std::sync::Arc;

use tk_controls::ModeController;
use tk_core::{Clock, LevelReading, Real, ensure_finite};
use tk_state::SharedState;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct TelemetryIngress {
    state: Arc<SharedState>,
    modes: ModeController,
    clock: Arc<dyn Clock>,
}

impl TelemetryIngress {
    pub fn new(state: Arc<SharedState>, clock: Arc<dyn Clock>) -> Self {
        Self {
            modes: ModeController::new(Arc::clone(&state)),
            state,
            clock,
        }
    }

    /// Decode a textual level (surrounding whitespace allowed) and record it.
    pub fn handle_payload(&self, payload: &str) -> AppResult<LevelReading> {
        let level: Real = payload.trim().parse().map_err(|e: std::num::ParseFloatError| {
            warn!(payload, "invalid telemetry payload");
            AppError::Telemetry {
                payload: payload.to_string(),
                reason: e.to_string(),
            }
        })?;
        self.record(level)
    }

    /// Record an already decoded level.
    ///
    /// Non-finite values are rejected. After recording, an `Unconnected`
    /// unit is promoted back to `Automatic`.
    pub fn record(&self, level: Real) -> AppResult<LevelReading> {
        let level = ensure_finite(level, "level").map_err(|e| {
            warn!(level_cm = level, "non-finite telemetry value");
            AppError::Telemetry {
                payload: level.to_string(),
                reason: e.to_string(),
            }
        })?;

        let reading = self.state.record_level(level, self.clock.now_ms());
        if self.modes.on_telemetry() {
            info!(level_cm = level, "telemetry resumed, switching to AUTOMATIC");
        }
        Ok(reading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tk_core::{ManualClock, Mode};

    fn ingress() -> (Arc<SharedState>, Arc<ManualClock>, TelemetryIngress) {
        let state = Arc::new(SharedState::default());
        let clock = Arc::new(ManualClock::new(42));
        let ingress = TelemetryIngress::new(Arc::clone(&state), clock.clone());
        (state, clock, ingress)
    }

    #[test]
    fn payload_is_trimmed_and_recorded() {
        let (state, _, ingress) = ingress();
        let reading = ingress.handle_payload(" 27.5\n").unwrap();
        assert_eq!(reading, LevelReading::new(27.5, 42));
        assert_eq!(state.level(), 27.5);
        assert_eq!(state.last_telemetry_at(), 42);
    }

    #[test]
    fn malformed_payload_changes_nothing() {
        let (state, _, ingress) = ingress();
        for payload in ["", "abc", "12cm", "NaN", "inf"] {
            let err = ingress.handle_payload(payload).unwrap_err();
            assert!(matches!(err, AppError::Telemetry { .. }), "{payload}");
        }
        assert!(state.history().is_empty());
        assert_eq!(state.last_telemetry_at(), 0);
        assert_eq!(state.mode(), Mode::Unconnected);
    }

    #[test]
    fn telemetry_promotes_unconnected_only() {
        let (state, clock, ingress) = ingress();
        ingress.handle_payload("10").unwrap();
        assert_eq!(state.mode(), Mode::Automatic);

        state.set_mode(Mode::Manual);
        clock.advance(100);
        ingress.handle_payload("11").unwrap();
        assert_eq!(state.mode(), Mode::Manual);
    }

    #[test]
    fn negative_levels_pass_through() {
        let (state, _, ingress) = ingress();
        ingress.record(-2.0).unwrap();
        assert_eq!(state.level(), -2.0);
    }
}
