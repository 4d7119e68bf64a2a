//! Level policy with a time-debounced hysteresis band.
//!
//! Policy, in priority order:
//! - **Critical** (`level >= l2`): fully open, no debounce
//! - **Safe** (`level <= l1`): fully closed
//! - **Band** (`l1 < level < l2`): hold the current opening until the level
//!   has stayed in the band for `t1_ms`, then half open
//! - Anything else (NaN): closed
//!
//! The outer bounds are closed and the band is open, so `level == l1` is
//! safe and `level == l2` is critical.

use tk_core::{Millis, Real, VALVE_CLOSED, VALVE_HALF, VALVE_OPEN};
use tracing::debug;

use crate::error::{ControlError, ControlResult};

/// Hysteresis policy configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HysteresisPolicy {
    /// Safe threshold (cm). At or below: close.
    pub l1: Real,
    /// Critical threshold (cm). At or above: open fully.
    pub l2: Real,
    /// Time the level must stay inside the band before half opening (ms).
    pub t1_ms: Millis,
}

impl HysteresisPolicy {
    /// Create a new policy.
    ///
    /// # Arguments
    ///
    /// * `l1` - Safe threshold (cm)
    /// * `l2` - Critical threshold (cm)
    /// * `t1_ms` - Debounce duration inside the band (ms)
    pub fn new(l1: Real, l2: Real, t1_ms: Millis) -> ControlResult<Self> {
        if !l1.is_finite() || !l2.is_finite() {
            return Err(ControlError::InvalidArg {
                what: "thresholds must be finite",
            });
        }
        if l1 >= l2 {
            return Err(ControlError::InvalidArg {
                what: "l1 must be less than l2",
            });
        }
        Ok(Self { l1, l2, t1_ms })
    }

    /// Compute the target opening for `level` at time `now`.
    ///
    /// # Arguments
    ///
    /// * `state` - Hysteresis timer state from the previous call
    /// * `level` - Current level (cm)
    /// * `now` - Current time (ms)
    /// * `current_opening` - Opening currently commanded, returned while debouncing
    ///
    /// # Returns
    ///
    /// Updated timer state and target opening.
    pub fn decide(
        &self,
        state: &HysteresisState,
        level: Real,
        now: Millis,
        current_opening: u8,
    ) -> (HysteresisState, u8) {
        if level >= self.l2 {
            return (HysteresisState::default(), VALVE_OPEN);
        }
        if level <= self.l1 {
            return (HysteresisState::default(), VALVE_CLOSED);
        }
        if level > self.l1 && level < self.l2 {
            return match state.above_l1_since {
                // First tick in the band only starts the timer.
                None => (
                    HysteresisState {
                        above_l1_since: Some(now),
                    },
                    current_opening,
                ),
                Some(since) if now.saturating_sub(since) >= self.t1_ms => (*state, VALVE_HALF),
                Some(_) => (*state, current_opening),
            };
        }
        (*state, VALVE_CLOSED)
    }
}

impl Default for HysteresisPolicy {
    fn default() -> Self {
        Self {
            l1: 20.0,
            l2: 40.0,
            t1_ms: 10_000,
        }
    }
}

/// Hysteresis timer state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HysteresisState {
    /// When the level entered the band; `None` while outside it.
    pub above_l1_since: Option<Millis>,
}

impl HysteresisState {
    pub fn in_band(&self) -> bool {
        self.above_l1_since.is_some()
    }
}

/// Policy plus its timer state, owned by the control loop thread.
///
/// `decide` must be called sequentially; the engine is deliberately not
/// `Sync`-shared anywhere.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyEngine {
    policy: HysteresisPolicy,
    state: HysteresisState,
}

impl PolicyEngine {
    pub fn new(policy: HysteresisPolicy) -> Self {
        Self {
            policy,
            state: HysteresisState::default(),
        }
    }

    pub fn policy(&self) -> &HysteresisPolicy {
        &self.policy
    }

    pub fn state(&self) -> HysteresisState {
        self.state
    }

    /// Compute the target opening and advance the timer state.
    pub fn decide(&mut self, level: Real, now: Millis, current_opening: u8) -> u8 {
        let (next, target) = self.policy.decide(&self.state, level, now, current_opening);
        if !self.state.in_band() && next.in_band() {
            debug!(level_cm = level, at = now, "level above L1, hysteresis timer started");
        }
        self.state = next;
        target
    }

    /// Forget any running band timer.
    pub fn reset(&mut self) {
        self.state = HysteresisState::default();
    }
}
