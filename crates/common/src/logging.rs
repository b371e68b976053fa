//! Tracing setup.
//!
//! Everything goes to stderr: stdout carries the CLI's progress lines and
//! must stay readable when logs are on.

use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Install the global subscriber. `RUST_LOG`, when set, wins over
/// `config.level`. Later calls are no-ops.
pub fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal());

    // Only fails when a subscriber is already in place.
    let _ = if config.json {
        builder.json().try_init()
    } else {
        builder.compact().with_target(false).try_init()
    };
}

/// Install the subscriber with default settings, for tests and scratch tools.
pub fn init_default_logging() {
    init_logging(&LoggingConfig::default());
}
