//! Clock capability and its two implementations.

use crate::types::Time;
use core::fmt;
use std::cell::Cell;
use std::time::{Duration, Instant};

/// A source of monotonic timestamps.
///
/// Implementations must never move backwards between observations.
pub trait Clock: fmt::Debug {
    /// Returns the current time.
    fn now(&self) -> Time;
}

/// A clock backed by the host's monotonic timer.
///
/// Timestamps count from the moment the clock was constructed.
#[derive(Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Creates a clock anchored at the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Time {
        Time::from_nanos(u64::try_from(self.origin.elapsed().as_nanos()).unwrap_or(u64::MAX))
    }
}

/// A virtual clock advanced explicitly by the caller.
///
/// Starts at [`Time::ZERO`] and only moves when told to, which makes
/// time-dependent scheduling deterministic in tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Time>,
}

impl ManualClock {
    /// Creates a clock at [`Time::ZERO`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Cell::new(Time::ZERO),
        }
    }

    /// Creates a clock at the given instant.
    #[must_use]
    pub const fn starting_at(now: Time) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    /// Moves the clock forward by `duration`.
    pub fn advance(&self, duration: Duration) {
        self.now.set(self.now.get() + duration);
    }

    /// Sets the clock to an absolute instant.
    ///
    /// Callers are expected to keep time monotonic; moving backwards is not
    /// checked here but breaks the [`Clock`] contract for observers.
    pub fn set(&self, now: Time) {
        self.now.set(now);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Time {
        self.now.get()
    }
}
