//! Tracing subscriber for the `trialscout` binary.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::LoggingConfig;

/// `RUST_LOG` when set and valid, otherwise the configured level.
pub fn log_filter(logging: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level))
}

/// Installs the global subscriber. Later calls leave the first one in place.
pub fn init_tracing(logging: &LoggingConfig) {
    let _ = tracing_subscriber::registry()
        .with(log_filter(logging))
        .with(fmt::layer().with_ansi(logging.ansi))
        .try_init();
}
