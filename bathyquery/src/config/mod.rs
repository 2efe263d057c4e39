//! Configuration file handling.
//!
//! Settings live in an INI file at `<config dir>/bathyquery/config.ini`:
//!
//! ```ini
//! [service]
//! endpoint = https://.../MapServer/dynamicLayer/query
//! depth_field = DEPTH
//! timeout = 30
//!
//! [scheduler]
//! batch_size = 10
//! concurrency = 5
//! rate_limit = 60
//! max_attempts = 5
//! half_width = 1000
//! requeue = front
//!
//! [logging]
//! level = warn
//! file = false
//! directory = /home/user/.config/bathyquery/logs
//! ```
//!
//! A missing file means defaults. Every key is optional.

mod keys;

pub use keys::ConfigKey;

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

use crate::logging::LoggingConfig;
use crate::provider::ProviderSettings;
use crate::scheduler::SchedulerConfig;

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Errors from loading, saving or editing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),
}

/// Directory holding configuration and logs.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bathyquery")
}

/// Path of the configuration file.
pub fn config_file_path() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}

/// All persisted settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub service: ProviderSettings,
    pub scheduler: SchedulerConfig,
    pub logging: LoggingConfig,
}

impl ConfigFile {
    /// Loads from the default path, falling back to defaults if absent.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Loads from `path`, falling back to defaults if absent.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = ConfigFile::default();
        if !path.exists() {
            return Ok(config);
        }

        let ini = Ini::load_from_file(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        for key in ConfigKey::all() {
            let value = ini
                .section(Some(key.section()))
                .and_then(|section| section.get(key.key_name()));
            if let Some(value) = value {
                key.set(&mut config, value)?;
            }
        }

        Ok(config)
    }

    /// Saves to the default path.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Saves to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_error = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }

        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            ini.with_section(Some(key.section()))
                .set(key.key_name(), key.get(self));
        }
        ini.write_to_file(path).map_err(write_error)
    }
}
