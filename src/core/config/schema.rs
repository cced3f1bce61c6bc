//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Location
//!
//! Searched in order:
//! 1. `$CAJA_METADATA_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/caja/metadata.toml`
//!
//! # Validation
//!
//! Values are validated after parsing so that a typo in the file fails the
//! load instead of silently falling back to a default.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Longest accepted flush delay, in milliseconds.
pub const MAX_FLUSH_DELAY_MS: u64 = 60_000;

/// Log levels accepted by `log_level`.
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Metadata store configuration.
///
/// # Example
///
/// ```toml
/// user_dir = "/home/me/.config/caja"
/// flush_delay_ms = 250
/// log_level = "info"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct MetadataConfig {
    /// Directory holding the `desktop-metadata` key file
    pub user_dir: Option<PathBuf>,

    /// Inactivity window before pending edits are written
    pub flush_delay_ms: Option<u64>,

    /// Default log filter when `RUST_LOG` is unset
    pub log_level: Option<String>,
}

impl MetadataConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(delay) = self.flush_delay_ms {
            if delay > MAX_FLUSH_DELAY_MS {
                return Err(ConfigError::InvalidValue(format!(
                    "flush_delay_ms must be at most {}, got {}",
                    MAX_FLUSH_DELAY_MS, delay
                )));
            }
        }

        if let Some(dir) = &self.user_dir {
            if dir.as_os_str().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "user_dir cannot be empty".into(),
                ));
            }
        }

        if let Some(level) = &self.log_level {
            if !LOG_LEVELS.contains(&level.as_str()) {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid log_level '{}', must be one of: {}",
                    level,
                    LOG_LEVELS.join(", ")
                )));
            }
        }

        Ok(())
    }
}
