use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent};

use crate::clock::{MonotonicSource, SystemClock};

/// Default tick cadence driving the session controller.
pub const TICK_RATE_MS: u64 = 200;

/// Raw terminal input, before the runner stamps it with the time.
#[derive(Clone, Debug)]
pub enum TerminalInput {
    Key(KeyEvent),
    Resize,
}

/// Event handed to the app, carrying the monotonic instant it applies at.
#[derive(Clone, Debug)]
pub enum TimerEvent {
    Key(KeyEvent, Instant),
    Resize,
    Tick(Instant),
}

/// Source of terminal input (keyboard, resize, etc.)
pub trait TimerEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for input.
    /// Returns Ok(input) if something arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<TerminalInput, RecvTimeoutError>;
}

/// Production input source reading crossterm events on a background thread.
pub struct CrosstermEventSource {
    rx: Receiver<TerminalInput>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let input = match event::read() {
                Ok(CtEvent::Key(key)) => TerminalInput::Key(key),
                Ok(CtEvent::Resize(_, _)) => TerminalInput::Resize,
                Ok(_) => continue,
                Err(e) => {
                    log::error!("terminal event stream closed: {}", e);
                    break;
                }
            };
            if tx.send(input).is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<TerminalInput, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// How often the runner ticks when no input arrives.
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Default for FixedTicker {
    fn default() -> Self {
        Self::new(Duration::from_millis(TICK_RATE_MS))
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Channel-fed input source for headless runs and tests.
pub struct TestEventSource {
    rx: Receiver<TerminalInput>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<TerminalInput>) -> Self {
        Self { rx }
    }
}

impl TimerEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<TerminalInput, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Drives the timer one event at a time, stamping each with the instant read
/// from its monotonic source.
pub struct Runner<E: TimerEventSource, T: Ticker, C: MonotonicSource = SystemClock> {
    event_source: E,
    ticker: T,
    clock: C,
}

impl<E: TimerEventSource, T: Ticker> Runner<E, T, SystemClock> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self::with_clock(event_source, ticker, SystemClock)
    }
}

impl<E: TimerEventSource, T: Ticker, C: MonotonicSource> Runner<E, T, C> {
    pub fn with_clock(event_source: E, ticker: T, clock: C) -> Self {
        Self {
            event_source,
            ticker,
            clock,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Blocks up to one tick interval. Input that arrives in time is passed
    /// through, otherwise the phase clock gets a tick.
    pub fn step(&self) -> TimerEvent {
        let input = self.event_source.recv_timeout(self.ticker.interval());
        let now = self.clock.now();
        match input {
            Ok(TerminalInput::Key(key)) => TimerEvent::Key(key, now),
            Ok(TerminalInput::Resize) => TimerEvent::Resize,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                TimerEvent::Tick(now)
            }
        }
    }
}
