// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod alert;
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod presentation;
pub mod runtime;
pub mod state;

pub use controller::SessionController;
pub use error::TimerError;
