//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Opens the metadata store for the configured key file
//! 2. Reads or edits one group through the store
//! 3. Formats and displays output
//!
//! Editing commands run inside a current-thread runtime so the store can arm
//! its deferred write as usual; the handler then writes synchronously with
//! `flush_now` so failures reach the exit status.

mod completion;
mod edit;
mod get;
mod list;

// Re-export command functions for testing and direct invocation
pub use completion::completion;
pub use edit::{remove, set, set_list, unset};
pub use get::get;
pub use list::list;

use crate::cli::args::Command;
use crate::cli::Context;
use crate::core::metadata::MetadataStore;
use anyhow::{Context as _, Result};

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Get { group, key, json } => get::get(ctx, &group, key.as_deref(), json),
        Command::Set { group, key, value } => edit::set(ctx, &group, &key, &value),
        Command::SetList { group, key, values } => edit::set_list(ctx, &group, &key, &values),
        Command::Unset { group, key } => edit::unset(ctx, &group, &key),
        Command::Remove { group } => edit::remove(ctx, &group),
        Command::List { json } => list::list(ctx, json),
        Command::Completion { shell } => completion::completion(shell),
    }
}

/// Open the store for the key file selected by `--file` or the config.
pub(crate) fn open_store(ctx: &Context) -> Result<MetadataStore> {
    match &ctx.file {
        Some(path) => Ok(MetadataStore::with_path(
            path.clone(),
            ctx.config.flush_delay(),
        )),
        None => MetadataStore::open(&ctx.config)
            .context("Failed to locate the desktop metadata file"),
    }
}
