//! The periodic control driver.
//!
//! Each tick is one bounded, synchronous step:
//! 1. Lost telemetry moves the unit to `Unconnected`; nothing is commanded
//!    and the valve keeps its last position.
//! 2. Outside `Automatic` the policy is not consulted.
//! 3. Otherwise the policy target is commanded if it differs from the
//!    recorded opening.
//!
//! A failed command leaves the recorded opening untouched, so the next tick
//! sees the same delta and sends it again. There is no other retry.
//!
//! A delivered command is recorded only if the unit is still in `Automatic`
//! afterwards; an operator switch during the send wins.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;

use tk_controls::{
    ActuatorSink, ConnectivityWatchdog, ModeController, PolicyEngine, TickConfig, TickStats,
};
use tk_core::{Clock, Mode};
use tk_state::SharedState;
use tracing::{info, warn};

use crate::config::ControlConfig;
use crate::error::AppResult;

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Telemetry is stale; `entered` is true on the tick that switched modes.
    Disconnected { entered: bool },
    /// Not in automatic mode; the policy was skipped.
    Idle { mode: Mode },
    /// Policy target equals the recorded opening.
    Holding { opening: u8 },
    /// A new opening was delivered and recorded.
    Commanded { from: u8, to: u8 },
    /// Delivery failed; the recorded opening was left as is.
    CommandFailed { target: u8 },
    /// Delivered, but the mode changed during the send; not recorded.
    Preempted { target: u8, mode: Mode },
}

pub struct ControlLoop {
    state: Arc<SharedState>,
    modes: ModeController,
    watchdog: ConnectivityWatchdog,
    policy: PolicyEngine,
    actuator: Arc<dyn ActuatorSink>,
    clock: Arc<dyn Clock>,
}

impl ControlLoop {
    pub fn new(
        config: &ControlConfig,
        state: Arc<SharedState>,
        actuator: Arc<dyn ActuatorSink>,
        clock: Arc<dyn Clock>,
    ) -> AppResult<Self> {
        Ok(Self {
            modes: ModeController::new(Arc::clone(&state)),
            watchdog: config.watchdog()?,
            policy: PolicyEngine::new(config.policy()?),
            state,
            actuator,
            clock,
        })
    }

    pub fn policy(&self) -> &PolicyEngine {
        &self.policy
    }

    pub fn tick(&mut self) -> TickOutcome {
        let now = self.clock.now_ms();

        if !self.watchdog.is_connected(&self.state, now) {
            self.policy.reset();
            let entered = self.modes.enter_unconnected();
            if entered {
                warn!(
                    timeout_ms = self.watchdog.timeout_ms(),
                    "telemetry timeout, entering UNCONNECTED"
                );
            }
            return TickOutcome::Disconnected { entered };
        }

        let snapshot = self.state.snapshot();
        if snapshot.mode != Mode::Automatic {
            // Returning to AUTOMATIC later counts as a fresh band entry.
            self.policy.reset();
            return TickOutcome::Idle {
                mode: snapshot.mode,
            };
        }

        let current = snapshot.valve_opening;
        let target = self.policy.decide(snapshot.level, now, current);
        if target == current {
            return TickOutcome::Holding { opening: current };
        }

        if let Err(error) = self.actuator.send_valve_command(target) {
            warn!(%error, opening = target, "valve command not delivered, retrying next tick");
            return TickOutcome::CommandFailed { target };
        }

        match self
            .state
            .set_valve_opening_in(Mode::Automatic, target.into())
        {
            Ok(_) => {
                info!(
                    level_cm = snapshot.level,
                    from = current,
                    to = target,
                    "valve commanded"
                );
                TickOutcome::Commanded {
                    from: current,
                    to: target,
                }
            }
            Err(mode) => {
                self.policy.reset();
                info!(
                    opening = target,
                    mode = %mode,
                    "mode changed during valve command, not recorded"
                );
                TickOutcome::Preempted { target, mode }
            }
        }
    }

    /// Tick every period until `stop` is raised; returns timing statistics.
    ///
    /// The flag is checked once per period, so a stop request is observed
    /// within one tick.
    pub fn run(mut self, tick: TickConfig, stop: &AtomicBool) -> TickStats {
        let mut stats = TickStats::default();
        info!(period_ms = tick.period_ms, "control loop started");

        while !stop.load(Ordering::Acquire) {
            let started = Instant::now();
            self.tick();
            let elapsed = started.elapsed();
            stats.record(elapsed, tick.period());
            thread::sleep(tick.remaining(elapsed));
        }

        info!(
            ticks = stats.ticks,
            overruns = stats.overruns,
            "control loop stopped"
        );
        stats
    }
}
