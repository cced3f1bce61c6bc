//! cli
//!
//! Command-line interface for the desktop metadata store.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Load configuration and set up logging
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. Handlers open a [`MetadataStore`], act on it
//! through a [`CachedFile`] standing in for the desktop icon, and write the
//! result before exiting.
//!
//! [`MetadataStore`]: crate::core::metadata::MetadataStore
//! [`CachedFile`]: crate::core::metadata::CachedFile

pub mod args;
pub mod commands;

pub use args::Cli;
pub use clap_complete::Shell;

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::core::config::Config;
use crate::logging;
use crate::ui::output::Verbosity;

/// Settings shared by every command.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Key file override.
    pub file: Option<PathBuf>,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
    /// Loaded configuration.
    pub config: Config,
}

impl Context {
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let config = Config::load().context("Failed to load configuration")?;
    let ctx = Context {
        file: cli.file.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
        config,
    };

    logging::init(ctx.verbosity(), ctx.config.log_level());
    if let Some(path) = ctx.config.source_path() {
        tracing::debug!(path = %path.display(), "loaded configuration");
    }

    commands::dispatch(cli.command, &ctx)
}
