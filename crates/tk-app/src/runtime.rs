//! Running control unit: shared state, collaborator handles and the
//! dedicated control-loop thread.
//!
//! Lifecycle is `start` → running → `stop` (terminal). Transports are owned
//! by the caller; they hold the handles returned here and run on their own
//! threads.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use tk_controls::{ActuatorSink, TickStats};
use tk_core::Clock;
use tk_state::SharedState;
use tracing::info;

use crate::config::ControlConfig;
use crate::control_loop::ControlLoop;
use crate::error::{AppError, AppResult};
use crate::ingress::TelemetryIngress;
use crate::operator::OperatorService;
use crate::reports::ReportHandler;

/// Name of the control-loop thread.
pub const CONTROL_THREAD_NAME: &str = "tank-control";

pub struct ControlUnit {
    config: ControlConfig,
    state: Arc<SharedState>,
    ingress: TelemetryIngress,
    reports: ReportHandler,
    operator: Arc<OperatorService>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<TickStats>>,
}

impl ControlUnit {
    /// Validate `config`, build the shared state and spawn the control loop.
    pub fn start(
        config: ControlConfig,
        actuator: Arc<dyn ActuatorSink>,
        clock: Arc<dyn Clock>,
    ) -> AppResult<Self> {
        config.validate()?;

        let state = Arc::new(SharedState::new(config.history_capacity)?);
        let control = ControlLoop::new(
            &config,
            Arc::clone(&state),
            Arc::clone(&actuator),
            Arc::clone(&clock),
        )?;
        let tick = config.tick()?;

        let ingress = TelemetryIngress::new(Arc::clone(&state), Arc::clone(&clock));
        let reports = ReportHandler::new(Arc::clone(&state));
        let operator = Arc::new(OperatorService::new(
            Arc::clone(&state),
            config.watchdog()?,
            actuator,
            clock,
        ));

        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name(CONTROL_THREAD_NAME.to_string())
            .spawn(move || control.run(tick, &stop_flag))?;

        info!(
            l1_cm = config.l1_cm,
            l2_cm = config.l2_cm,
            t1_ms = config.t1_ms,
            t2_ms = config.t2_ms,
            "control unit started"
        );

        Ok(Self {
            config,
            state,
            ingress,
            reports,
            operator,
            stop,
            handle: Some(handle),
        })
    }

    pub fn config(&self) -> &ControlConfig {
        &self.config
    }

    pub fn state(&self) -> &Arc<SharedState> {
        &self.state
    }

    /// Handle for the telemetry transport; cheap to clone.
    pub fn ingress(&self) -> TelemetryIngress {
        self.ingress.clone()
    }

    /// Handle for actuator status frames; cheap to clone.
    pub fn reports(&self) -> ReportHandler {
        self.reports.clone()
    }

    pub fn operator(&self) -> Arc<OperatorService> {
        Arc::clone(&self.operator)
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Signal the loop and wait for it to exit.
    ///
    /// Returns the loop's timing statistics on the first call and `None`
    /// afterwards.
    pub fn stop(&mut self) -> AppResult<Option<TickStats>> {
        self.stop.store(true, Ordering::Release);
        match self.handle.take() {
            Some(handle) => {
                let stats = handle.join().map_err(|_| AppError::ControlThreadPanicked)?;
                info!(ticks = stats.ticks, "control unit stopped");
                Ok(Some(stats))
            }
            None => Ok(None),
        }
    }
}

impl Drop for ControlUnit {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
