//! logging
//!
//! Diagnostic logging setup.
//!
//! The library only emits `tracing` events. Binaries call [`init`] once at
//! startup to install a subscriber writing to stderr. `RUST_LOG` overrides
//! the configured level unless `--debug` was given.

use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

use crate::ui::output::Verbosity;

/// Filter directive for a verbosity and configured default level.
pub fn filter_directive(verbosity: Verbosity, default_level: &str) -> &str {
    match verbosity {
        Verbosity::Quiet => "error",
        Verbosity::Debug => "debug",
        Verbosity::Normal => default_level,
    }
}

/// Install the global subscriber.
///
/// Calling this more than once keeps the first subscriber.
pub fn init(verbosity: Verbosity, default_level: &str) {
    let directive = filter_directive(verbosity, default_level);
    let filter = match verbosity {
        Verbosity::Debug => EnvFilter::new(directive),
        _ => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive)),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .try_init();
}
