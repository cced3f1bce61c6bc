//! core::config
//!
//! Configuration schema and loading.
//!
//! # Locations
//!
//! Searched in order:
//! 1. `$CAJA_METADATA_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/caja/metadata.toml` (canonical location)
//!
//! A missing file is not an error; defaults are used.
//!
//! # Defaults
//!
//! - User directory: `$XDG_CONFIG_HOME/caja`
//! - Key file: `<user directory>/desktop-metadata`
//! - Flush delay: 0 ms (write at the next idle point)
//!
//! # Example
//!
//! ```no_run
//! use caja_metadata::core::config::Config;
//!
//! let config = Config::load().unwrap();
//! println!("Key file: {}", config.keyfile_path().unwrap().display());
//! println!("Flush delay: {:?}", config.flush_delay());
//! ```

pub mod schema;

pub use schema::MetadataConfig;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "CAJA_METADATA_CONFIG";

/// Name of the key file inside the user directory.
pub const KEYFILE_NAME: &str = "desktop-metadata";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("user config directory not found")]
    NoConfigDir,
}

/// Loaded configuration with defaults applied by the accessors.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Values read from the config file
    pub file: MetadataConfig,
    /// Path the values were read from (if any)
    path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read, parsed
    /// or validated.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Self::load_from(&path);
            }
        }

        if let Ok(path) = Self::config_path() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let file: MetadataConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        file.validate()?;

        Ok(Self {
            file,
            path: Some(path.to_path_buf()),
        })
    }

    /// Build a configuration from in-memory values.
    pub fn from_values(file: MetadataConfig) -> Result<Self, ConfigError> {
        file.validate()?;
        Ok(Self { file, path: None })
    }

    /// Get the canonical config file path.
    ///
    /// Returns `$XDG_CONFIG_HOME/caja/metadata.toml`.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(dir.join("caja").join("metadata.toml"))
    }

    /// Path the configuration was loaded from, if any.
    pub fn source_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    /// Get the user directory holding the key file.
    ///
    /// Defaults to `$XDG_CONFIG_HOME/caja`.
    pub fn user_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.file.user_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join("caja"))
                .ok_or(ConfigError::NoConfigDir),
        }
    }

    /// Get the path of the desktop metadata key file.
    pub fn keyfile_path(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.user_dir()?.join(KEYFILE_NAME))
    }

    /// Get the flush delay.
    ///
    /// Defaults to zero: flush at the next idle point.
    pub fn flush_delay(&self) -> Duration {
        Duration::from_millis(self.file.flush_delay_ms.unwrap_or(0))
    }

    /// Get the default log filter.
    ///
    /// Defaults to `"warn"`.
    pub fn log_level(&self) -> &str {
        self.file.log_level.as_deref().unwrap_or("warn")
    }
}
