use crate::alert::AlertSink;
use crate::config::{ConfigSource, Settings};
use crate::error::TimerError;
use crate::presentation::{PresentationSink, Snapshot, Status};
use crate::state::{Mode, RunState, Transition};
use std::time::Instant;

/// Owns the run state and drives it from commands and ticks.
///
/// Every operation finishes by pushing a fresh [`Snapshot`] to the
/// presentation sink.
#[derive(Debug)]
pub struct SessionController<C, P, A> {
    source: C,
    presenter: P,
    alert: A,
    settings: Option<Settings>,
    state: RunState,
}

impl<C: ConfigSource, P: PresentationSink, A: AlertSink> SessionController<C, P, A> {
    pub fn new(source: C, presenter: P, alert: A) -> Self {
        Self {
            source,
            presenter,
            alert,
            settings: None,
            state: RunState::idle(),
        }
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn settings(&self) -> Option<&Settings> {
        self.settings.as_ref()
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn source(&self) -> &C {
        &self.source
    }

    /// Starts a new run from idle with freshly read configuration.
    ///
    /// Does nothing while a run is already in progress.
    pub fn start(&mut self, now: Instant) -> Result<(), TimerError> {
        if self.state.mode() != Mode::Idle {
            return Ok(());
        }

        let checked = self
            .source
            .current()
            .validate()
            .and_then(|settings| settings.check_schedulable(now).map(|_| settings));
        let settings = match checked {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("refusing to start: {}", e);
                self.presenter.show_error(&e);
                self.publish(now);
                return Err(e);
            }
        };

        log::info!(
            "starting run: {} sessions, study {:?}, short break {:?}, long break {:?}",
            settings.session_count,
            settings.study,
            settings.short_break,
            settings.long_break
        );
        self.settings = Some(settings);
        self.state = RunState::start(&settings, now);
        self.presenter.clear_error();
        self.publish(now);
        Ok(())
    }

    pub fn pause(&mut self, now: Instant) {
        if self.state.mode() != Mode::Idle && !self.state.is_paused() {
            self.state = self.state.pause(now);
            log::info!(
                "paused {} with {}s left",
                self.state.mode(),
                self.state.remaining(now).unwrap_or(0)
            );
        }
        self.publish(now);
    }

    pub fn resume(&mut self, now: Instant) {
        if self.state.is_paused() {
            self.state = self.state.resume(now);
            log::info!("resumed {}", self.state.mode());
        }
        self.publish(now);
    }

    pub fn toggle_pause(&mut self, now: Instant) {
        if self.state.is_paused() {
            self.resume(now);
        } else {
            self.pause(now);
        }
    }

    /// Abandons any run in progress and returns to idle.
    ///
    /// Loads settings when none exist yet so the idle screen can show the
    /// session total.
    pub fn reset(&mut self, now: Instant) {
        if self.state.mode() != Mode::Idle {
            log::info!(
                "reset during {} after {} completed sessions",
                self.state.mode(),
                self.state.completed_sessions()
            );
        }
        self.state = self.state.reset();
        if self.settings.is_none() {
            match self.source.current().validate() {
                Ok(settings) => self.settings = Some(settings),
                Err(e) => {
                    log::warn!("configuration not usable: {}", e);
                    self.presenter.show_error(&e);
                }
            }
        }
        self.publish(now);
    }

    /// Advances the run if the active phase has elapsed.
    ///
    /// Returns the transition taken, if any. The alert plays once for every
    /// phase that reaches zero, including the one that completes the run.
    pub fn tick(&mut self, now: Instant) -> Option<Transition> {
        let transition = match self.settings {
            Some(ref settings) => {
                let (next, transition) = self.state.tick(settings, now);
                self.state = next;
                transition
            }
            None => None,
        };

        if let Some(t) = transition {
            match t {
                Transition::StudyEnded(kind) => log::info!(
                    "session {} done, {:?} break",
                    self.state.completed_sessions(),
                    kind
                ),
                Transition::BreakEnded => log::info!(
                    "break over, starting session {}",
                    self.state.display_numerator()
                ),
                Transition::RunCompleted => log::info!(
                    "run complete after {} sessions",
                    self.state.completed_sessions()
                ),
            }
            self.alert.play();
        }

        self.publish(now);
        transition
    }

    pub fn snapshot(&self, now: Instant) -> Snapshot {
        let denominator = self.settings.map_or(0, |s| s.session_count);
        match self.state.active() {
            Some(phase) => {
                let status = if phase.clock.is_paused() {
                    Status::Pause
                } else {
                    match self.state.mode() {
                        Mode::Break => Status::Break,
                        Mode::Study | Mode::Idle => Status::Study,
                    }
                };
                Snapshot {
                    status,
                    numerator: self.state.display_numerator(),
                    denominator,
                    remaining_secs: phase.clock.remaining(now),
                    phase: Some(phase.kind),
                    phase_total_secs: self
                        .settings
                        .map_or(0, |s| phase.kind.duration(&s).as_secs()),
                }
            }
            None => {
                let study = self.settings.map_or(0, |s| s.study.as_secs());
                Snapshot {
                    status: Status::Ready,
                    numerator: self.state.display_numerator(),
                    denominator,
                    remaining_secs: study,
                    phase: None,
                    phase_total_secs: study,
                }
            }
        }
    }

    fn publish(&mut self, now: Instant) {
        let snapshot = self.snapshot(now);
        self.presenter.render(&snapshot);
    }
}
