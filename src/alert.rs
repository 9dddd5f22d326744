use notify_rust::Notification;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::thread;

/// How the end of a phase is announced.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AlertMode {
    /// terminal bell
    Bell,
    /// desktop notification
    Notify,
    /// bell and desktop notification
    Both,
    /// no alert at all
    Silent,
}

impl AlertMode {
    fn rings_bell(&self) -> bool {
        matches!(self, AlertMode::Bell | AlertMode::Both)
    }

    fn notifies(&self) -> bool {
        matches!(self, AlertMode::Notify | AlertMode::Both)
    }
}

/// Plays the phase-end alert. Must not block the caller.
pub trait AlertSink {
    fn play(&self);
}

/// Best-effort alert dispatched on a detached thread, so a slow audio or
/// notification backend never delays the next tick.
#[derive(Debug, Clone, Copy)]
pub struct AlertDispatcher {
    mode: AlertMode,
}

impl AlertDispatcher {
    pub fn new(mode: AlertMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> AlertMode {
        self.mode
    }
}

impl AlertSink for AlertDispatcher {
    fn play(&self) {
        if self.mode == AlertMode::Silent {
            return;
        }
        let mode = self.mode;
        let spawned = thread::Builder::new()
            .name("pomotui-alert".into())
            .spawn(move || {
                if mode.rings_bell() {
                    if let Err(e) = ring_bell() {
                        log::debug!("terminal bell failed: {}", e);
                    }
                }
                if mode.notifies() {
                    if let Err(e) = Notification::new()
                        .summary("pomotui")
                        .body("Phase finished")
                        .show()
                    {
                        log::debug!("desktop notification failed: {}", e);
                    }
                }
            });
        if let Err(e) = spawned {
            log::debug!("could not spawn alert thread: {}", e);
        }
    }
}

// Deliberately not coordinated with the terminal backend, which also owns
// stdout. The stdout lock keeps the lone BEL byte out of any single write the
// renderer makes.
fn ring_bell() -> io::Result<()> {
    let mut out = io::stdout();
    out.write_all(b"\x07")?;
    out.flush()
}
