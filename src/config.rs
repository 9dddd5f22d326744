use crate::alert::AlertMode;
use crate::app_dirs::AppDirs;
use crate::error::TimerError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::io;
use std::time::{Duration, Instant};

pub const MIN_SESSIONS: i64 = 1;
pub const MAX_SESSIONS: i64 = 20;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub session_count: i64,
    pub study_minutes: i64,
    pub short_break_minutes: i64,
    pub long_break_minutes: i64,
    pub accent_color: String,
    pub show_date: bool,
    pub alert: AlertMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session_count: 4,
            study_minutes: 25,
            short_break_minutes: 5,
            long_break_minutes: 15,
            accent_color: "cyan".to_string(),
            show_date: true,
            alert: AlertMode::Bell,
        }
    }
}

impl Config {
    /// Checks the timing values and returns the settings a run uses.
    pub fn validate(&self) -> Result<Settings, TimerError> {
        if !(MIN_SESSIONS..=MAX_SESSIONS).contains(&self.session_count) {
            return Err(TimerError::invalid(
                "session_count",
                self.session_count,
                "must be between 1 and 20",
            ));
        }

        let minutes = |field: &'static str, value: i64| {
            if value <= 0 {
                return Err(TimerError::invalid(field, value, "must be positive"));
            }
            (value as u64)
                .checked_mul(60)
                .map(Duration::from_secs)
                .ok_or_else(|| TimerError::invalid(field, value, "too large to represent"))
        };

        Ok(Settings {
            session_count: self.session_count as u32,
            study: minutes("study_minutes", self.study_minutes)?,
            short_break: minutes("short_break_minutes", self.short_break_minutes)?,
            long_break: minutes("long_break_minutes", self.long_break_minutes)?,
        })
    }
}

/// Validated timing configuration, fixed for the duration of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub session_count: u32,
    pub study: Duration,
    pub short_break: Duration,
    pub long_break: Duration,
}

impl Settings {
    /// Fails when a phase starting at `now` would end past the range of
    /// [`Instant`] on this platform.
    pub fn check_schedulable(&self, now: Instant) -> Result<(), TimerError> {
        let phases = [
            ("study_minutes", self.study),
            ("short_break_minutes", self.short_break),
            ("long_break_minutes", self.long_break),
        ];
        for (field, duration) in phases {
            if now.checked_add(duration).is_none() {
                let minutes = (duration.as_secs() / 60).min(i64::MAX as u64) as i64;
                return Err(TimerError::invalid(field, minutes, "too large to represent"));
            }
        }
        Ok(())
    }
}

/// Values given on the command line that win over the stored config.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub session_count: Option<i64>,
    pub study_minutes: Option<i64>,
    pub short_break_minutes: Option<i64>,
    pub long_break_minutes: Option<i64>,
    pub accent_color: Option<String>,
    pub hide_date: bool,
    pub alert: Option<AlertMode>,
}

impl ConfigOverrides {
    pub fn apply(&self, mut cfg: Config) -> Config {
        if let Some(v) = self.session_count {
            cfg.session_count = v;
        }
        if let Some(v) = self.study_minutes {
            cfg.study_minutes = v;
        }
        if let Some(v) = self.short_break_minutes {
            cfg.short_break_minutes = v;
        }
        if let Some(v) = self.long_break_minutes {
            cfg.long_break_minutes = v;
        }
        if let Some(ref v) = self.accent_color {
            cfg.accent_color = v.clone();
        }
        if self.hide_date {
            cfg.show_date = false;
        }
        if let Some(v) = self.alert {
            cfg.alert = v;
        }
        cfg
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

/// Supplies the configuration on demand, each time a run starts from idle.
pub trait ConfigSource {
    fn current(&self) -> Config;
}

impl ConfigSource for Config {
    fn current(&self) -> Config {
        self.clone()
    }
}

impl ConfigSource for FileConfigStore {
    fn current(&self) -> Config {
        self.load()
    }
}

/// A store with command line overrides layered on every read.
#[derive(Debug, Clone)]
pub struct LayeredConfig<S> {
    store: S,
    overrides: ConfigOverrides,
}

impl<S: ConfigStore> LayeredConfig<S> {
    pub fn new(store: S, overrides: ConfigOverrides) -> Self {
        Self { store, overrides }
    }

    /// Writes the merged configuration back to the underlying store.
    pub fn persist(&self) -> std::io::Result<()> {
        self.store.save(&self.current())
    }
}

impl<S: ConfigStore> ConfigSource for LayeredConfig<S> {
    fn current(&self) -> Config {
        self.overrides.apply(self.store.load())
    }
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("pomotui_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            return Config::default();
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!(
                    "ignoring malformed config {}: {}",
                    self.path.display(),
                    e
                );
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).map_err(io::Error::from)?;
        fs::write(&self.path, data)
    }
}
