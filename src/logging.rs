//! Tracing subscriber setup shared by the binary and tests.

use thiserror::Error;
use tracing_subscriber::{fmt, EnvFilter};

/// Error raised when the global subscriber cannot be installed.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The filter directive does not parse.
    #[error("invalid log level: {0}")]
    InvalidLevel(String),
    /// A global subscriber is already set.
    #[error("logging already initialized")]
    AlreadyInitialized,
}

/// Installs a stderr `fmt` subscriber filtered by `level`.
///
/// `level` takes `EnvFilter` directives, so `warn` and
/// `backchain::history=debug,warn` both work.
pub fn init_logging(level: &str) -> Result<(), LoggingError> {
    fmt()
        .with_env_filter(
            EnvFilter::try_new(level).map_err(|e| LoggingError::InvalidLevel(e.to_string()))?,
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInitialized)
}
