//! Settable configuration keys.

use std::path::PathBuf;
use std::str::FromStr;

use super::{ConfigError, ConfigFile};
use crate::scheduler::RequeuePolicy;

/// A single `section.key` setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    ServiceEndpoint,
    ServiceDepthField,
    ServiceTimeout,
    SchedulerBatchSize,
    SchedulerConcurrency,
    SchedulerRateLimit,
    SchedulerMaxAttempts,
    SchedulerHalfWidth,
    SchedulerRequeue,
    LoggingLevel,
    LoggingFile,
    LoggingDirectory,
}

impl ConfigKey {
    /// Every key, in file order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::ServiceEndpoint,
            ConfigKey::ServiceDepthField,
            ConfigKey::ServiceTimeout,
            ConfigKey::SchedulerBatchSize,
            ConfigKey::SchedulerConcurrency,
            ConfigKey::SchedulerRateLimit,
            ConfigKey::SchedulerMaxAttempts,
            ConfigKey::SchedulerHalfWidth,
            ConfigKey::SchedulerRequeue,
            ConfigKey::LoggingLevel,
            ConfigKey::LoggingFile,
            ConfigKey::LoggingDirectory,
        ]
    }

    /// INI section holding the key.
    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::ServiceEndpoint
            | ConfigKey::ServiceDepthField
            | ConfigKey::ServiceTimeout => "service",
            ConfigKey::SchedulerBatchSize
            | ConfigKey::SchedulerConcurrency
            | ConfigKey::SchedulerRateLimit
            | ConfigKey::SchedulerMaxAttempts
            | ConfigKey::SchedulerHalfWidth
            | ConfigKey::SchedulerRequeue => "scheduler",
            ConfigKey::LoggingLevel | ConfigKey::LoggingFile | ConfigKey::LoggingDirectory => {
                "logging"
            }
        }
    }

    /// Key name within its section.
    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::ServiceEndpoint => "endpoint",
            ConfigKey::ServiceDepthField => "depth_field",
            ConfigKey::ServiceTimeout => "timeout",
            ConfigKey::SchedulerBatchSize => "batch_size",
            ConfigKey::SchedulerConcurrency => "concurrency",
            ConfigKey::SchedulerRateLimit => "rate_limit",
            ConfigKey::SchedulerMaxAttempts => "max_attempts",
            ConfigKey::SchedulerHalfWidth => "half_width",
            ConfigKey::SchedulerRequeue => "requeue",
            ConfigKey::LoggingLevel => "level",
            ConfigKey::LoggingFile => "file",
            ConfigKey::LoggingDirectory => "directory",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value, formatted as it is stored.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::ServiceEndpoint => config.service.endpoint.clone(),
            ConfigKey::ServiceDepthField => config.service.depth_field.clone(),
            ConfigKey::ServiceTimeout => config.service.timeout_secs.to_string(),
            ConfigKey::SchedulerBatchSize => config.scheduler.batch_size.to_string(),
            ConfigKey::SchedulerConcurrency => config.scheduler.concurrency.to_string(),
            ConfigKey::SchedulerRateLimit => config.scheduler.rate_limit_per_minute.to_string(),
            ConfigKey::SchedulerMaxAttempts => config.scheduler.max_attempts.to_string(),
            ConfigKey::SchedulerHalfWidth => config.scheduler.half_width_m.to_string(),
            ConfigKey::SchedulerRequeue => config.scheduler.requeue.to_string(),
            ConfigKey::LoggingLevel => config.logging.level.clone(),
            ConfigKey::LoggingFile => config.logging.file.to_string(),
            ConfigKey::LoggingDirectory => config.logging.directory.to_string_lossy().to_string(),
        }
    }

    /// Validates `value` and stores it.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match self {
            ConfigKey::ServiceEndpoint => {
                if !(value.starts_with("http://") || value.starts_with("https://")) {
                    return Err(self.invalid(value, "must be an http(s) URL"));
                }
                config.service.endpoint = value.to_string();
            }
            ConfigKey::ServiceDepthField => {
                if value.is_empty() {
                    return Err(self.invalid(value, "must not be empty"));
                }
                config.service.depth_field = value.to_string();
            }
            ConfigKey::ServiceTimeout => config.service.timeout_secs = self.positive(value)?,
            ConfigKey::SchedulerBatchSize => config.scheduler.batch_size = self.positive(value)?,
            ConfigKey::SchedulerConcurrency => config.scheduler.concurrency = self.positive(value)?,
            ConfigKey::SchedulerRateLimit => {
                config.scheduler.rate_limit_per_minute = self.positive(value)?
            }
            ConfigKey::SchedulerMaxAttempts => {
                config.scheduler.max_attempts = self.positive(value)?
            }
            ConfigKey::SchedulerHalfWidth => {
                let width: f64 = self.parse(value)?;
                if !(width.is_finite() && width > 0.0) {
                    return Err(self.invalid(value, "must be a positive number of metres"));
                }
                config.scheduler.half_width_m = width;
            }
            ConfigKey::SchedulerRequeue => {
                config.scheduler.requeue = value
                    .parse::<RequeuePolicy>()
                    .map_err(|reason| self.invalid(value, &reason))?
            }
            ConfigKey::LoggingLevel => {
                if value.is_empty() {
                    return Err(self.invalid(value, "must not be empty"));
                }
                config.logging.level = value.to_string();
            }
            ConfigKey::LoggingFile => {
                config.logging.file = match value.to_lowercase().as_str() {
                    "true" | "yes" | "on" | "1" => true,
                    "false" | "no" | "off" | "0" => false,
                    _ => return Err(self.invalid(value, "must be true or false")),
                }
            }
            ConfigKey::LoggingDirectory => config.logging.directory = PathBuf::from(value),
        }
        Ok(())
    }

    fn parse<T: FromStr>(&self, value: &str) -> Result<T, ConfigError>
    where
        T::Err: std::fmt::Display,
    {
        value
            .parse::<T>()
            .map_err(|e| self.invalid(value, &e.to_string()))
    }

    fn positive<T>(&self, value: &str) -> Result<T, ConfigError>
    where
        T: FromStr + PartialOrd + Default,
        T::Err: std::fmt::Display,
    {
        let parsed: T = self.parse(value)?;
        if parsed <= T::default() {
            return Err(self.invalid(value, "must be greater than zero"));
        }
        Ok(parsed)
    }

    fn invalid(&self, value: &str, reason: &str) -> ConfigError {
        ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}
