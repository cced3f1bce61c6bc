//! list command - List groups, or dump the whole store as JSON

use anyhow::Result;
use serde_json::{Map, Value};

use super::open_store;
use crate::cli::Context;
use crate::ui::output;

/// List every group with its key count.
pub fn list(ctx: &Context, json: bool) -> Result<()> {
    let store = open_store(ctx)?;
    let groups = store.groups();

    if json {
        let mut dump = Map::new();
        for group in &groups {
            let mut entries = Map::new();
            if let Some(info) = store.file_info(group) {
                for (key, value) in info.metadata() {
                    entries.insert(key.to_string(), serde_json::to_value(value)?);
                }
            }
            dump.insert(group.clone(), Value::Object(entries));
        }
        println!("{}", serde_json::to_string_pretty(&Value::Object(dump))?);
        return Ok(());
    }

    if groups.is_empty() {
        output::print("No desktop metadata stored", ctx.verbosity());
        return Ok(());
    }

    let lines: Vec<String> = groups
        .iter()
        .map(|group| {
            let count = store.keys(group).map(|keys| keys.len()).unwrap_or(0);
            format!("{} ({} keys)", group, count)
        })
        .collect();
    println!("{}", output::format_list(&lines, ""));

    Ok(())
}
