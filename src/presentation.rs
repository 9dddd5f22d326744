use crate::error::TimerError;
use crate::state::PhaseKind;

/// Status label shown on the first line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Status {
    Ready,
    Study,
    Break,
    Pause,
}

/// Everything a renderer needs after a state change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub status: Status,
    pub numerator: u32,
    pub denominator: u32,
    pub remaining_secs: u64,
    /// Phase in progress (paused or not), `None` when idle.
    pub phase: Option<PhaseKind>,
    pub phase_total_secs: u64,
}

impl Snapshot {
    pub fn progress_text(&self) -> String {
        format_progress(self.numerator, self.denominator)
    }

    pub fn countdown_text(&self) -> String {
        format_countdown(self.remaining_secs.min(i64::MAX as u64) as i64)
    }

    /// Fraction of the current phase already elapsed, in `[0, 1]`.
    pub fn phase_ratio(&self) -> f64 {
        if self.phase.is_none() || self.phase_total_secs == 0 {
            return 0.0;
        }
        let left = self.remaining_secs.min(self.phase_total_secs) as f64;
        1.0 - left / self.phase_total_secs as f64
    }
}

/// `NN/DD`, both zero-padded to two digits.
pub fn format_progress(numerator: u32, denominator: u32) -> String {
    format!("{:02}/{:02}", numerator, denominator)
}

/// `MM:SS`, clamped at zero. Minutes are not wrapped into hours.
pub fn format_countdown(secs: i64) -> String {
    let secs = secs.max(0);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Receives state notifications from the session controller.
pub trait PresentationSink {
    fn render(&mut self, snapshot: &Snapshot);
    fn show_error(&mut self, err: &TimerError);
    /// Called when a run starts successfully after an earlier error.
    fn clear_error(&mut self) {}
}

/// Keeps the most recent snapshot and error for a renderer to pick up.
#[derive(Debug, Clone, Default)]
pub struct LatestFrame {
    pub snapshot: Option<Snapshot>,
    pub error: Option<String>,
    pub renders: usize,
}

impl PresentationSink for LatestFrame {
    fn render(&mut self, snapshot: &Snapshot) {
        self.snapshot = Some(*snapshot);
        self.renders += 1;
    }

    fn show_error(&mut self, err: &TimerError) {
        self.error = Some(err.to_string());
    }

    fn clear_error(&mut self) {
        self.error = None;
    }
}
