//! edit commands - set, set-list, unset and remove
//!
//! Each command seeds a [`CachedFile`] from the stored group, applies one
//! edit through the store, and writes the key file before returning. The
//! printed message says whether the icon's metadata actually changed.

use anyhow::{Context as _, Result};

use super::open_store;
use crate::cli::Context;
use crate::core::keyfile::{validate_group_name, validate_key};
use crate::core::metadata::{CachedFile, MetadataStore};
use crate::ui::output;

/// Set a key to a single string.
pub fn set(ctx: &Context, group: &str, key: &str, value: &str) -> Result<()> {
    let file = edit(ctx, group, Some(key), |store, file| {
        store.set_string(file, group, key, Some(value))
    })?;
    report(ctx, &file, format!("Set {}: {}", group, output::format_entry(key, value)));
    Ok(())
}

/// Set a key to a list of strings.
pub fn set_list(ctx: &Context, group: &str, key: &str, values: &[String]) -> Result<()> {
    let file = edit(ctx, group, Some(key), |store, file| {
        store.set_string_list(file, group, key, values)
    })?;
    report(
        ctx,
        &file,
        format!("Set {}: {}", group, output::format_entry(key, values.join(";"))),
    );
    Ok(())
}

/// Remove a key.
pub fn unset(ctx: &Context, group: &str, key: &str) -> Result<()> {
    let file = edit(ctx, group, Some(key), |store, file| {
        store.set_string(file, group, key, None)
    })?;
    report(ctx, &file, format!("Removed {} from {}", key, group));
    Ok(())
}

/// Remove every key of a group.
pub fn remove(ctx: &Context, group: &str) -> Result<()> {
    let file = edit(ctx, group, None, |store, file| store.remove_group(file, group))?;
    report(ctx, &file, format!("Removed all metadata of {}", group));
    Ok(())
}

/// Apply one edit and write the key file.
///
/// Names the key file cannot hold are rejected up front; the store itself
/// would only log them.
fn edit<F>(ctx: &Context, group: &str, key: Option<&str>, apply: F) -> Result<CachedFile>
where
    F: FnOnce(&mut MetadataStore, &mut CachedFile),
{
    validate_group_name(group)?;
    if let Some(key) = key {
        validate_key(key)?;
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to start async runtime")?;
    let _guard = runtime.enter();

    let mut store = open_store(ctx)?;
    let mut file = CachedFile::new(group);
    store.project(&mut file, group);

    apply(&mut store, &mut file);

    store
        .flush_now()
        .with_context(|| format!("Failed to save {}", store.path().display()))?;

    Ok(file)
}

fn report(ctx: &Context, file: &CachedFile, message: String) {
    if file.change_count() == 0 {
        tracing::debug!(group = file.name(), "metadata unchanged");
        output::print(format!("{} (unchanged)", message), ctx.verbosity());
    } else {
        output::print(message, ctx.verbosity());
    }
}
