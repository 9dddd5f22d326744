pub mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use pomotui::{
    alert::{AlertDispatcher, AlertMode},
    app_dirs::AppDirs,
    clock::MonotonicSource,
    config::{ConfigOverrides, ConfigSource, FileConfigStore, LayeredConfig},
    controller::SessionController,
    logging,
    presentation::LatestFrame,
    runtime::{CrosstermEventSource, FixedTicker, Runner, TimerEvent, TimerEventSource, Ticker},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    style::Color,
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    str::FromStr,
    time::Instant,
};

/// pomodoro study/break countdown timer for the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A pomodoro timer that alternates study sessions with short breaks, and a long break after every fifth session."
)]
pub struct Cli {
    /// number of study sessions in a run (1-20)
    #[clap(short = 'n', long = "sessions", allow_negative_numbers = true)]
    session_count: Option<i64>,

    /// minutes per study session
    #[clap(short = 's', long = "study", allow_negative_numbers = true)]
    study_minutes: Option<i64>,

    /// minutes per short break
    #[clap(short = 'b', long = "short-break", allow_negative_numbers = true)]
    short_break_minutes: Option<i64>,

    /// minutes per long break
    #[clap(short = 'l', long = "long-break", allow_negative_numbers = true)]
    long_break_minutes: Option<i64>,

    /// how to announce the end of a phase
    #[clap(short = 'a', long, value_enum)]
    alert: Option<AlertMode>,

    /// colour of the countdown, a name like "cyan" or "#rrggbb"
    #[clap(long)]
    accent_color: Option<String>,

    /// hide the date line
    #[clap(long)]
    no_date: bool,

    /// read and write configuration at this path instead of the default
    #[clap(long)]
    config: Option<PathBuf>,

    /// save the effective configuration (file plus flags) before starting
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    fn to_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            session_count: self.session_count,
            study_minutes: self.study_minutes,
            short_break_minutes: self.short_break_minutes,
            long_break_minutes: self.long_break_minutes,
            accent_color: self.accent_color.clone(),
            hide_date: self.no_date,
            alert: self.alert,
        }
    }

    fn config_source(&self) -> LayeredConfig<FileConfigStore> {
        let store = match self.config {
            Some(ref path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        };
        LayeredConfig::new(store, self.to_overrides())
    }
}

pub type Controller = SessionController<LayeredConfig<FileConfigStore>, LatestFrame, AlertDispatcher>;

/// Presentation settings read once at launch.
#[derive(Debug, Clone, PartialEq)]
pub struct Appearance {
    pub accent: Color,
    pub show_date: bool,
}

#[derive(Debug)]
pub struct App {
    pub controller: Controller,
    pub appearance: Appearance,
}

impl App {
    /// Builds the app and shows the idle screen as of `now`.
    pub fn new(cli: &Cli, now: Instant) -> Self {
        let source = cli.config_source();
        let cfg = source.current();
        let accent = Color::from_str(&cfg.accent_color).unwrap_or_else(|_| {
            log::warn!("unknown accent colour {:?}, using cyan", cfg.accent_color);
            Color::Cyan
        });
        let appearance = Appearance {
            accent,
            show_date: cfg.show_date,
        };

        let mut controller =
            SessionController::new(source, LatestFrame::default(), AlertDispatcher::new(cfg.alert));
        controller.reset(now);

        Self {
            controller,
            appearance,
        }
    }

    pub fn tick(&mut self, now: Instant) {
        self.controller.tick(now);
    }

    /// Applies a key press at `now`. Returns false when the app should quit.
    pub fn on_key(&mut self, key: KeyEvent, now: Instant) -> bool {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return false,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return false,
            KeyCode::Char('s') | KeyCode::Enter => {
                // rejection is already shown through the presenter's error line
                let _ = self.controller.start(now);
            }
            KeyCode::Char(' ') | KeyCode::Char('p') => self.controller.toggle_pause(now),
            KeyCode::Char('r') => self.controller.reset(now),
            _ => {}
        }
        true
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(path) = AppDirs::log_path() {
        // logging is optional; the timer works without it
        let _ = logging::init(&path);
    }

    if cli.save_config {
        let source = cli.config_source();
        source.persist()?;
        log::info!("saved configuration");
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default());
    let mut app = App::new(&cli, runner.clock().now());
    let result = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend, E: TimerEventSource, T: Ticker, C: MonotonicSource>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T, C>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| ui(app, f))?;

    loop {
        match runner.step() {
            TimerEvent::Tick(now) => app.tick(now),
            TimerEvent::Resize => {}
            TimerEvent::Key(key, now) => {
                if !app.on_key(key, now) {
                    break;
                }
            }
        }
        terminal.draw(|f| ui(app, f))?;
    }

    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}

#[cfg(test)]
mod tests {
    use super::*;
    use pomotui::clock::ManualClock;
    use pomotui::config::{Config, ConfigStore};
    use pomotui::presentation::Status;
    use pomotui::runtime::{TerminalInput, TestEventSource};
    use pomotui::state::Mode;
    use ratatui::backend::TestBackend;
    use std::sync::mpsc;
    use std::time::Duration;
    use tempfile::{tempdir, TempDir};

    fn cli_with_config(dir: &TempDir, extra: &[&str]) -> Cli {
        let path = dir.path().join("config.json");
        let path = path.to_str().unwrap();
        let mut args = vec!["pomotui", "--config", path, "--alert", "silent"];
        args.extend_from_slice(extra);
        Cli::parse_from(args)
    }

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["pomotui"]);

        assert_eq!(cli.session_count, None);
        assert_eq!(cli.study_minutes, None);
        assert_eq!(cli.short_break_minutes, None);
        assert_eq!(cli.long_break_minutes, None);
        assert_eq!(cli.alert, None);
        assert!(!cli.no_date);
        assert!(!cli.save_config);
        assert_eq!(cli.to_overrides(), ConfigOverrides::default());
    }

    #[test]
    fn test_cli_timing_flags() {
        let cli = Cli::parse_from([
            "pomotui", "-n", "3", "--study", "50", "-b", "10", "--long-break", "30",
        ]);
        let overrides = cli.to_overrides();
        assert_eq!(overrides.session_count, Some(3));
        assert_eq!(overrides.study_minutes, Some(50));
        assert_eq!(overrides.short_break_minutes, Some(10));
        assert_eq!(overrides.long_break_minutes, Some(30));
    }

    #[test]
    fn test_cli_accepts_negative_values_for_validation_later() {
        let cli = Cli::parse_from(["pomotui", "--study", "-5"]);
        assert_eq!(cli.study_minutes, Some(-5));
    }

    #[test]
    fn test_cli_alert_and_appearance_flags() {
        let cli = Cli::parse_from([
            "pomotui",
            "--alert",
            "both",
            "--accent-color",
            "magenta",
            "--no-date",
        ]);
        assert_eq!(cli.alert, Some(AlertMode::Both));
        assert_eq!(cli.accent_color.as_deref(), Some("magenta"));
        assert!(cli.no_date);
    }

    #[test]
    fn test_cli_rejects_unknown_alert() {
        assert!(Cli::try_parse_from(["pomotui", "--alert", "siren"]).is_err());
    }

    #[test]
    fn test_app_new_starts_ready() {
        let dir = tempdir().unwrap();
        let t0 = Instant::now();
        let app = App::new(&cli_with_config(&dir, &[]), t0);

        let frame = app.controller.presenter();
        let snap = frame.snapshot.unwrap();
        assert_eq!(snap.status, Status::Ready);
        assert_eq!(snap.progress_text(), "00/04");
        assert_eq!(snap.countdown_text(), "25:00");
        assert!(frame.error.is_none());
    }

    #[test]
    fn test_app_reads_config_file_and_flags() {
        let dir = tempdir().unwrap();
        let t0 = Instant::now();
        FileConfigStore::with_path(dir.path().join("config.json"))
            .save(&Config {
                session_count: 8,
                accent_color: "#112233".into(),
                ..Config::default()
            })
            .unwrap();

        let app = App::new(&cli_with_config(&dir, &["--study", "40"]), t0);
        let snap = app.controller.presenter().snapshot.unwrap();
        assert_eq!(snap.progress_text(), "00/08");
        assert_eq!(snap.countdown_text(), "40:00");
        assert_eq!(app.appearance.accent, Color::Rgb(0x11, 0x22, 0x33));
    }

    #[test]
    fn test_app_unknown_accent_falls_back_to_cyan() {
        let dir = tempdir().unwrap();
        let t0 = Instant::now();
        let app = App::new(
            &cli_with_config(&dir, &["--accent-color", "not-a-colour"]),
            t0,
        );
        assert_eq!(app.appearance.accent, Color::Cyan);
    }

    #[test]
    fn test_key_bindings_drive_controller() {
        let dir = tempdir().unwrap();
        let t0 = Instant::now();
        let mut app = App::new(&cli_with_config(&dir, &[]), t0);

        assert!(app.on_key(key(KeyCode::Char('s')), t0));
        assert_eq!(app.controller.state().mode(), Mode::Study);

        assert!(app.on_key(key(KeyCode::Char(' ')), t0 + secs(60)));
        assert!(app.controller.state().is_paused());

        assert!(app.on_key(key(KeyCode::Char('p')), t0 + secs(660)));
        assert!(!app.controller.state().is_paused());
        let snap = app.controller.presenter().snapshot.unwrap();
        assert_eq!(snap.countdown_text(), "24:00");

        assert!(app.on_key(key(KeyCode::Char('r')), t0 + secs(700)));
        assert_eq!(app.controller.state().mode(), Mode::Idle);
    }

    #[test]
    fn test_quit_keys() {
        let dir = tempdir().unwrap();
        let t0 = Instant::now();
        let mut app = App::new(&cli_with_config(&dir, &[]), t0);
        assert!(!app.on_key(key(KeyCode::Esc), t0));
        assert!(!app.on_key(key(KeyCode::Char('q')), t0));
        assert!(!app.on_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), t0));
        assert!(app.on_key(key(KeyCode::Char('x')), t0));
    }

    #[test]
    fn test_invalid_config_shows_error_on_start() {
        let dir = tempdir().unwrap();
        let t0 = Instant::now();
        let mut app = App::new(&cli_with_config(&dir, &["--sessions", "21"]), t0);
        app.on_key(key(KeyCode::Enter), t0);
        assert_eq!(app.controller.state().mode(), Mode::Idle);
        let error = app.controller.presenter().error.clone().unwrap();
        assert!(error.contains("session_count"));
    }

    #[test]
    fn test_tick_advances_through_phase() {
        let dir = tempdir().unwrap();
        let t0 = Instant::now();
        let mut app = App::new(
            &cli_with_config(&dir, &["--sessions", "2", "--study", "1", "--short-break", "1"]),
            t0,
        );
        app.on_key(key(KeyCode::Char('s')), t0);
        app.tick(t0 + secs(60));
        let snap = app.controller.presenter().snapshot.unwrap();
        assert_eq!(snap.status, Status::Break);
        assert_eq!(snap.progress_text(), "01/02");
    }

    #[test]
    fn test_ui_renders_ready_screen() {
        let dir = tempdir().unwrap();
        let t0 = Instant::now();
        let app = App::new(&cli_with_config(&dir, &[]), t0);

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| ui(&app, f)).unwrap();

        let content = buffer_text(&terminal);
        assert!(content.contains("READY"));
        assert!(content.contains("00/04"));
        assert!(content.contains("25:00"));
    }

    #[test]
    fn test_ui_renders_running_and_paused() {
        let dir = tempdir().unwrap();
        let t0 = Instant::now();
        let mut app = App::new(&cli_with_config(&dir, &[]), t0);
        app.on_key(key(KeyCode::Char('s')), t0);
        app.tick(t0 + secs(90));

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| ui(&app, f)).unwrap();
        let content = buffer_text(&terminal);
        assert!(content.contains("STUDY"));
        assert!(content.contains("01/04"));
        assert!(content.contains("23:30"));

        app.on_key(key(KeyCode::Char(' ')), t0 + secs(95));
        terminal.draw(|f| ui(&app, f)).unwrap();
        assert!(buffer_text(&terminal).contains("PAUSE"));
    }

    #[test]
    fn test_ui_shows_error_line() {
        let dir = tempdir().unwrap();
        let t0 = Instant::now();
        let mut app = App::new(&cli_with_config(&dir, &["--study", "0"]), t0);
        app.on_key(key(KeyCode::Char('s')), t0);

        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal.draw(|f| ui(&app, f)).unwrap();
        assert!(buffer_text(&terminal).contains("study_minutes"));
    }

    #[test]
    fn test_ui_survives_tiny_terminal() {
        let dir = tempdir().unwrap();
        let t0 = Instant::now();
        let app = App::new(&cli_with_config(&dir, &[]), t0);
        let mut terminal = Terminal::new(TestBackend::new(10, 3)).unwrap();
        terminal.draw(|f| ui(&app, f)).unwrap();
    }

    #[test]
    fn test_event_loop_uses_runner_instants() {
        let dir = tempdir().unwrap();
        // far enough ahead that a wall-clock stamp would already have expired
        let origin = Instant::now() + secs(3600);
        let mut app = App::new(&cli_with_config(&dir, &[]), origin);

        let (tx, rx) = mpsc::channel();
        let runner = Runner::with_clock(
            TestEventSource::new(rx),
            FixedTicker::new(Duration::from_millis(1)),
            ManualClock::new(origin),
        );
        tx.send(TerminalInput::Key(key(KeyCode::Char('s')))).unwrap();
        tx.send(TerminalInput::Key(key(KeyCode::Char('q')))).unwrap();

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        start_tui(&mut terminal, &mut app, &runner).unwrap();

        assert_eq!(app.controller.state().mode(), Mode::Study);
        assert_eq!(app.controller.state().remaining(origin), Some(25 * 60));
        assert!(buffer_text(&terminal).contains("25:00"));
    }
}
