//! get command - Show the metadata of one group

use anyhow::{anyhow, Result};

use super::open_store;
use crate::cli::Context;
use crate::core::metadata::AttributeValue;
use crate::ui::output;

/// Show one key, or every key, of `group`.
pub fn get(ctx: &Context, group: &str, key: Option<&str>, json: bool) -> Result<()> {
    let store = open_store(ctx)?;

    if let Some(key) = key {
        let value = store
            .get(group, key)
            .ok_or_else(|| anyhow!("No metadata key '{}' for '{}'", key, group))?;

        if json {
            println!("{}", serde_json::to_string_pretty(&value)?);
        } else {
            match &value {
                AttributeValue::String(s) => println!("{}", s),
                AttributeValue::StringV(values) => {
                    if !values.is_empty() {
                        println!("{}", output::format_list(values, ""));
                    }
                }
            }
        }
        return Ok(());
    }

    let info = store
        .file_info(group)
        .ok_or_else(|| anyhow!("No metadata for '{}'", group))?;

    if json {
        let map = info
            .metadata()
            .map(|(k, v)| serde_json::to_value(v).map(|v| (k.to_string(), v)))
            .collect::<Result<serde_json::Map<_, _>, _>>()?;
        println!("{}", serde_json::to_string_pretty(&map)?);
    } else {
        let lines: Vec<String> = info
            .metadata()
            .map(|(k, v)| output::format_entry(k, v))
            .collect();
        if !lines.is_empty() {
            println!("{}", output::format_list(&lines, ""));
        }
    }

    tracing::debug!(group, keys = info.len(), "printed metadata");
    Ok(())
}
