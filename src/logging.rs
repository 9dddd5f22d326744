use env_logger::{Builder, Env, Target, WriteStyle};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;

/// Environment variable holding the log filter, e.g. `POMOTUI_LOG=debug`.
pub const LOG_ENV: &str = "POMOTUI_LOG";

/// Sends log output to `path`. The terminal belongs to the UI, so nothing is
/// ever written to stdout or stderr.
pub fn init(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    Builder::from_env(Env::new().filter_or(LOG_ENV, "info"))
        .target(Target::Pipe(Box::new(file)))
        .write_style(WriteStyle::Never)
        .format_timestamp_millis()
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
}
