//! Mode rules: who may switch the control unit between modes.
//!
//! - Operators may request `Automatic` or `Manual` at any time
//! - `Unconnected` is entered by the watchdog only
//! - Arriving telemetry promotes `Unconnected` back to `Automatic`

use std::sync::Arc;

use tk_core::Mode;
use tk_state::SharedState;
use tracing::warn;

use crate::error::{ControlError, ControlResult};

#[derive(Debug, Clone)]
pub struct ModeController {
    state: Arc<SharedState>,
}

impl ModeController {
    pub fn new(state: Arc<SharedState>) -> Self {
        Self { state }
    }

    /// Apply an external mode request; returns the previous mode.
    ///
    /// # Errors
    ///
    /// [`ControlError::ModeRejected`] for `Unconnected`, in every mode.
    pub fn request_mode(&self, requested: Mode) -> ControlResult<Mode> {
        if requested == Mode::Unconnected {
            warn!(requested = %requested, "rejected external mode request");
            return Err(ControlError::ModeRejected { requested });
        }
        Ok(self.state.set_mode(requested))
    }

    /// Recovery path called after each telemetry arrival.
    ///
    /// Returns `true` if the unit was promoted from `Unconnected` to
    /// `Automatic`. The check and the switch are one atomic step, so an
    /// operator switch made concurrently is never overwritten.
    pub fn on_telemetry(&self) -> bool {
        self.state
            .transition_mode(|m| (m == Mode::Unconnected).then_some(Mode::Automatic))
            .is_some()
    }

    /// Watchdog path: returns `true` if the unit just became `Unconnected`.
    pub fn enter_unconnected(&self) -> bool {
        self.state
            .transition_mode(|m| (m != Mode::Unconnected).then_some(Mode::Unconnected))
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> (Arc<SharedState>, ModeController) {
        let state = Arc::new(SharedState::default());
        (Arc::clone(&state), ModeController::new(state))
    }

    #[test]
    fn unconnected_rejected_in_every_mode() {
        let (state, modes) = controller();
        for mode in [Mode::Unconnected, Mode::Automatic, Mode::Manual] {
            state.set_mode(mode);
            let err = modes.request_mode(Mode::Unconnected).unwrap_err();
            assert_eq!(
                err,
                ControlError::ModeRejected {
                    requested: Mode::Unconnected
                }
            );
            assert_eq!(state.mode(), mode);
        }
    }

    #[test]
    fn operator_modes_accepted() {
        let (state, modes) = controller();
        assert_eq!(modes.request_mode(Mode::Manual).unwrap(), Mode::Unconnected);
        assert_eq!(modes.request_mode(Mode::Automatic).unwrap(), Mode::Manual);
        assert_eq!(state.mode(), Mode::Automatic);
    }

    #[test]
    fn telemetry_promotes_only_from_unconnected() {
        let (state, modes) = controller();
        assert!(modes.on_telemetry());
        assert_eq!(state.mode(), Mode::Automatic);

        state.set_mode(Mode::Manual);
        assert!(!modes.on_telemetry());
        assert_eq!(state.mode(), Mode::Manual);
    }

    #[test]
    fn enter_unconnected_once() {
        let (state, modes) = controller();
        state.set_mode(Mode::Manual);
        assert!(modes.enter_unconnected());
        assert!(!modes.enter_unconnected());
        assert_eq!(state.mode(), Mode::Unconnected);
    }
}
