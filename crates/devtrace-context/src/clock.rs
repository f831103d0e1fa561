// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Host clock sources
//!
//! Contexts read host time through [`ClockSource`] so that replays and tests can drive time
//! explicitly. The last host/device synchronization point lives on the clock instead of in a
//! process-wide variable.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Instant;

/// Monotonic host time supplier
pub trait ClockSource: Send + Sync {
    /// Current host time in host ticks
    fn now(&self) -> i64;

    /// Nanoseconds per host tick
    fn timer_multiplier(&self) -> f64;

    /// Host time of the last device synchronization, 0 when none was recorded
    fn sync_time(&self) -> i64;
}

/// Host ticks are nanoseconds since the clock was created
#[derive(Debug)]
pub struct MonotonicClock {
    origin: Instant,
    sync_time: AtomicI64,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            sync_time: AtomicI64::new(0),
        }
    }

    /// Record the host time at which the devices were last synchronized
    pub fn set_sync_time(&self, host_time: i64) {
        self.sync_time.store(host_time, Ordering::Relaxed);
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockSource for MonotonicClock {
    fn now(&self) -> i64 {
        i64::try_from(self.origin.elapsed().as_nanos()).unwrap_or(i64::MAX)
    }

    fn timer_multiplier(&self) -> f64 {
        1.0
    }

    fn sync_time(&self) -> i64 {
        self.sync_time.load(Ordering::Relaxed)
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: AtomicI64,
    sync_time: AtomicI64,
    // f64 bits
    timer_multiplier: AtomicU64,
}

impl ManualClock {
    pub fn new(start: i64) -> Self {
        Self {
            now: AtomicI64::new(start),
            sync_time: AtomicI64::new(0),
            timer_multiplier: AtomicU64::new(1.0f64.to_bits()),
        }
    }

    pub fn set_now(&self, host_time: i64) {
        self.now.store(host_time, Ordering::Relaxed);
    }

    pub fn advance(&self, ticks: i64) -> i64 {
        self.now.fetch_add(ticks, Ordering::Relaxed) + ticks
    }

    pub fn set_sync_time(&self, host_time: i64) {
        self.sync_time.store(host_time, Ordering::Relaxed);
    }

    pub fn set_timer_multiplier(&self, multiplier: f64) {
        self.timer_multiplier
            .store(multiplier.to_bits(), Ordering::Relaxed);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(0)
    }
}

impl ClockSource for ManualClock {
    fn now(&self) -> i64 {
        self.now.load(Ordering::Relaxed)
    }

    fn timer_multiplier(&self) -> f64 {
        f64::from_bits(self.timer_multiplier.load(Ordering::Relaxed))
    }

    fn sync_time(&self) -> i64 {
        self.sync_time.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_clock_does_not_go_backwards() {
        let clock = MonotonicClock::new();
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
        assert_eq!(clock.sync_time(), 0);
        clock.set_sync_time(77);
        assert_eq!(clock.sync_time(), 77);
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(100);
        assert_eq!(clock.advance(5), 105);
        assert_eq!(clock.now(), 105);
        clock.set_timer_multiplier(2.5);
        assert_eq!(clock.timer_multiplier(), 2.5);
    }
}
