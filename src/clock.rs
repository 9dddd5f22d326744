//! Monotonic phase timing.
//!
//! Everything here works on [`Instant`], never on wall-clock time, so clock
//! adjustments (DST, NTP, the user changing the date) cannot stretch or
//! shrink a phase.

use std::cell::Cell;
use std::time::{Duration, Instant};

/// Countdown for the active phase.
///
/// A clock is either running towards an absolute deadline or paused with a
/// frozen number of whole seconds left, never both.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhaseClock {
    Running { deadline: Instant },
    Paused { remaining_secs: u64 },
}

impl PhaseClock {
    /// Starts a countdown of `duration` from `now`.
    ///
    /// A deadline beyond what [`Instant`] can represent leaves the clock
    /// paused at the full duration instead.
    pub fn start(now: Instant, duration: Duration) -> Self {
        Self::try_start(now, duration).unwrap_or(PhaseClock::Paused {
            remaining_secs: duration.as_secs(),
        })
    }

    /// Like [`PhaseClock::start`], but `None` when the deadline overflows.
    pub fn try_start(now: Instant, duration: Duration) -> Option<Self> {
        now.checked_add(duration)
            .map(|deadline| PhaseClock::Running { deadline })
    }

    /// Whole seconds left, rounded to nearest and never negative.
    pub fn remaining(&self, now: Instant) -> u64 {
        match *self {
            PhaseClock::Running { deadline } => {
                let left = deadline.saturating_duration_since(now);
                ((left.as_millis() + 500) / 1000) as u64
            }
            PhaseClock::Paused { remaining_secs } => remaining_secs,
        }
    }

    /// Freezes the remaining time. A paused clock is returned unchanged.
    pub fn pause(&self, now: Instant) -> Self {
        match self {
            PhaseClock::Running { .. } => PhaseClock::Paused {
                remaining_secs: self.remaining(now),
            },
            PhaseClock::Paused { .. } => *self,
        }
    }

    /// Re-arms the deadline from the frozen value. A running clock, or one
    /// whose deadline would overflow, is returned unchanged.
    pub fn resume(&self, now: Instant) -> Self {
        match *self {
            PhaseClock::Paused { remaining_secs } => {
                PhaseClock::try_start(now, Duration::from_secs(remaining_secs)).unwrap_or(*self)
            }
            PhaseClock::Running { .. } => *self,
        }
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, PhaseClock::Paused { .. })
    }
}

/// Source of monotonic instants.
pub trait MonotonicSource {
    fn now(&self) -> Instant;
}

/// Production source backed by [`Instant::now`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl MonotonicSource for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Hand-advanced source for deterministic tests and replays.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<Instant>,
}

impl ManualClock {
    pub fn new(origin: Instant) -> Self {
        Self {
            now: Cell::new(origin),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Instant::now())
    }
}

impl MonotonicSource for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}
