//! Process setup shared by the `atm` binary.

use tracing_subscriber::{EnvFilter, prelude::*};

/// Loads a `.env` file from the current directory, if any.
///
/// Variables already set in the environment take precedence.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => debug!(?path, "loaded .env"),
        Err(err) if err.not_found() => {}
        Err(err) => warn!(%err, "failed to load .env"),
    }
}

/// Initializes a tracing subscriber writing to stderr, filtered by `RUST_LOG`.
pub fn subscriber() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Enables colored output when stdout is a terminal that supports it.
pub fn enable_paint() {
    yansi::whenever(yansi::Condition::TTY_AND_COLOR);
}
