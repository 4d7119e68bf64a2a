//! Control period and tick timing statistics.
//!
//! The control loop runs one bounded, synchronous step per period and sleeps
//! in between. [`TickStats`] records how long steps take against that budget.

use std::time::Duration;

use tk_core::Millis;

use crate::error::{ControlError, ControlResult};

/// Default control period in milliseconds.
pub const DEFAULT_TICK_MS: Millis = 500;

/// Fixed control period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickConfig {
    /// Period in milliseconds.
    pub period_ms: Millis,
}

impl TickConfig {
    /// # Errors
    ///
    /// Returns error if `period_ms` is zero.
    pub fn new(period_ms: Millis) -> ControlResult<Self> {
        if period_ms == 0 {
            return Err(ControlError::InvalidArg {
                what: "tick period must be positive",
            });
        }
        Ok(Self { period_ms })
    }

    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }

    /// Sleep needed after a step that took `elapsed`, never negative.
    pub fn remaining(&self, elapsed: Duration) -> Duration {
        self.period().saturating_sub(elapsed)
    }
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            period_ms: DEFAULT_TICK_MS,
        }
    }
}

/// Step timing against the period budget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    pub ticks: u64,
    /// Steps that took longer than one period.
    pub overruns: u64,
    pub worst_case: Duration,
}

impl TickStats {
    pub fn record(&mut self, elapsed: Duration, budget: Duration) {
        self.ticks += 1;
        if elapsed > budget {
            self.overruns += 1;
        }
        if elapsed > self.worst_case {
            self.worst_case = elapsed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_config_creation() {
        let config = TickConfig::new(250).unwrap();
        assert_eq!(config.period(), Duration::from_millis(250));
        assert_eq!(TickConfig::default().period_ms, 500);
        assert!(TickConfig::new(0).is_err());
    }

    #[test]
    fn remaining_saturates() {
        let config = TickConfig::new(100).unwrap();
        assert_eq!(
            config.remaining(Duration::from_millis(30)),
            Duration::from_millis(70)
        );
        assert_eq!(config.remaining(Duration::from_millis(130)), Duration::ZERO);
    }

    #[test]
    fn stats_track_overruns_and_worst_case() {
        let budget = Duration::from_millis(10);
        let mut stats = TickStats::default();
        stats.record(Duration::from_millis(2), budget);
        stats.record(Duration::from_millis(15), budget);
        stats.record(Duration::from_millis(5), budget);

        assert_eq!(stats.ticks, 3);
        assert_eq!(stats.overruns, 1);
        assert_eq!(stats.worst_case, Duration::from_millis(15));
    }
}
