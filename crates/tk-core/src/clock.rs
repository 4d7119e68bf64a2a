//! Monotonic millisecond time sources.
//!
//! Every component takes its notion of "now" from a [`Clock`] so the control
//! logic can be driven deterministically in tests. Timestamps are plain
//! milliseconds since an arbitrary epoch; `0` is reserved as [`NEVER`].

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Monotonic milliseconds since an arbitrary epoch.
pub type Millis = u64;

/// Sentinel timestamp meaning "no telemetry received yet".
pub const NEVER: Millis = 0;

/// A source of monotonic, non-decreasing timestamps.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now_ms(&self) -> Millis;
}

/// Process clock backed by [`Instant`].
///
/// Counts from construction and starts at 1 ms so it never yields [`NEVER`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> Millis {
        let elapsed = self.start.elapsed().as_millis();
        Millis::try_from(elapsed).unwrap_or(Millis::MAX - 1) + 1
    }
}

/// Hand-driven clock for tests and simulations.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub const fn new(start: Millis) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    /// Move the clock forward by `delta` milliseconds; returns the new time.
    pub fn advance(&self, delta: Millis) -> Millis {
        self.now.fetch_add(delta, Ordering::SeqCst) + delta
    }

    /// Jump to `t`. Going backwards is ignored to keep the clock monotonic.
    pub fn set(&self, t: Millis) {
        self.now.fetch_max(t, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> Millis {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_clock_never_returns_sentinel() {
        let clock = MonotonicClock::new();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(a > NEVER);
        assert!(b >= a);
    }

    #[test]
    fn manual_clock_advance_and_set() {
        let clock = ManualClock::new(1_000);
        assert_eq!(clock.now_ms(), 1_000);
        assert_eq!(clock.advance(500), 1_500);
        clock.set(1_200);
        assert_eq!(clock.now_ms(), 1_500, "set must not move backwards");
        clock.set(9_000);
        assert_eq!(clock.now_ms(), 9_000);
    }
}
