//! Run state and its transitions.
//!
//! [`RunState`] is a plain value. Every operation takes the current state and
//! returns the next one, so the whole study/break cycle can be replayed
//! against synthetic instants without a terminal.

use crate::clock::PhaseClock;
use crate::config::Settings;
use std::time::{Duration, Instant};

/// Every n-th completed study session is followed by a long break.
pub const LONG_BREAK_EVERY: u32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum Mode {
    Idle,
    Study,
    Break,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BreakKind {
    Short,
    Long,
}

impl BreakKind {
    /// Break that follows the `completed`-th study session.
    pub fn after_session(completed: u32) -> Self {
        if completed % LONG_BREAK_EVERY == 0 {
            BreakKind::Long
        } else {
            BreakKind::Short
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhaseKind {
    Study,
    Break(BreakKind),
}

impl PhaseKind {
    pub fn duration(&self, settings: &Settings) -> Duration {
        match self {
            PhaseKind::Study => settings.study,
            PhaseKind::Break(BreakKind::Short) => settings.short_break,
            PhaseKind::Break(BreakKind::Long) => settings.long_break,
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            PhaseKind::Study => Mode::Study,
            PhaseKind::Break(_) => Mode::Break,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActivePhase {
    pub kind: PhaseKind,
    pub clock: PhaseClock,
}

impl ActivePhase {
    fn begin(kind: PhaseKind, settings: &Settings, now: Instant) -> Self {
        Self {
            kind,
            clock: PhaseClock::start(now, kind.duration(settings)),
        }
    }
}

/// What happened when a running phase reached zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    StudyEnded(BreakKind),
    BreakEnded,
    /// The last study session finished; the run is back at idle.
    RunCompleted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct RunState {
    active: Option<ActivePhase>,
    completed_sessions: u32,
}

impl RunState {
    pub fn idle() -> Self {
        Self::default()
    }

    /// Begins the first study session of a fresh run.
    pub fn start(settings: &Settings, now: Instant) -> Self {
        Self {
            active: Some(ActivePhase::begin(PhaseKind::Study, settings, now)),
            completed_sessions: 0,
        }
    }

    pub fn mode(&self) -> Mode {
        self.active.map_or(Mode::Idle, |p| p.kind.mode())
    }

    pub fn active(&self) -> Option<&ActivePhase> {
        self.active.as_ref()
    }

    pub fn is_paused(&self) -> bool {
        self.active.is_some_and(|p| p.clock.is_paused())
    }

    pub fn completed_sessions(&self) -> u32 {
        self.completed_sessions
    }

    /// Seconds left in the active phase, `None` when idle.
    pub fn remaining(&self, now: Instant) -> Option<u64> {
        self.active.map(|p| p.clock.remaining(now))
    }

    /// Session number shown to the user: the one in progress while studying,
    /// the ones finished so far otherwise.
    pub fn display_numerator(&self) -> u32 {
        match self.mode() {
            Mode::Study => self.completed_sessions + 1,
            Mode::Break | Mode::Idle => self.completed_sessions,
        }
    }

    pub fn pause(self, now: Instant) -> Self {
        self.map_clock(|clock| clock.pause(now))
    }

    pub fn resume(self, now: Instant) -> Self {
        self.map_clock(|clock| clock.resume(now))
    }

    pub fn reset(self) -> Self {
        Self::idle()
    }

    /// Advances the run if the active phase has run out.
    ///
    /// Idle and paused states are returned unchanged.
    pub fn tick(self, settings: &Settings, now: Instant) -> (Self, Option<Transition>) {
        let Some(phase) = self.active else {
            return (self, None);
        };
        if phase.clock.is_paused() || phase.clock.remaining(now) > 0 {
            return (self, None);
        }

        match phase.kind {
            PhaseKind::Study => {
                let completed = self.completed_sessions + 1;
                if completed >= settings.session_count {
                    let done = Self {
                        active: None,
                        completed_sessions: completed,
                    };
                    return (done, Some(Transition::RunCompleted));
                }
                let kind = BreakKind::after_session(completed);
                let next = Self {
                    active: Some(ActivePhase::begin(PhaseKind::Break(kind), settings, now)),
                    completed_sessions: completed,
                };
                (next, Some(Transition::StudyEnded(kind)))
            }
            PhaseKind::Break(_) => {
                let next = Self {
                    active: Some(ActivePhase::begin(PhaseKind::Study, settings, now)),
                    ..self
                };
                (next, Some(Transition::BreakEnded))
            }
        }
    }

    fn map_clock(mut self, f: impl FnOnce(PhaseClock) -> PhaseClock) -> Self {
        if let Some(ref mut phase) = self.active {
            phase.clock = f(phase.clock);
        }
        self
    }
}
