// SPDX-License-Identifier: MIT

//! Declared configuration schema and the typed settings snapshot.

use std::str::FromStr;
use thiserror::Error;

/// Default storage location, relative to the working directory.
pub const DEFAULT_DB_PATH: &str = ".data/queuectl.db";

/// Recognized configuration keys.
///
/// Values are persisted as strings and typed at read time according to the
/// key's parse rule. Unknown keys are rejected on `set`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    /// Retries allowed after a job's first attempt, unless overridden per job.
    MaxRetries,
    /// Base b of the retry delay b^attempts seconds.
    BackoffBase,
    /// Worker idle sleep between empty claim attempts.
    PollIntervalMs,
    /// Storage location of the embedded database.
    DbPath,
    /// Heartbeat age beyond which a worker is considered stale.
    StaleWorkerTimeoutSeconds,
    /// Cadence at which workers refresh their heartbeat.
    HeartbeatIntervalSeconds,
}

crate::simple_display! {
    ConfigKey {
        MaxRetries => "max_retries",
        BackoffBase => "backoff_base",
        PollIntervalMs => "poll_interval_ms",
        DbPath => "db_path",
        StaleWorkerTimeoutSeconds => "stale_worker_timeout_seconds",
        HeartbeatIntervalSeconds => "heartbeat_interval_seconds",
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown config key: {0:?}")]
    UnknownKey(String),
    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "max_retries" => Ok(ConfigKey::MaxRetries),
            "backoff_base" => Ok(ConfigKey::BackoffBase),
            "poll_interval_ms" => Ok(ConfigKey::PollIntervalMs),
            "db_path" => Ok(ConfigKey::DbPath),
            "stale_worker_timeout_seconds" => Ok(ConfigKey::StaleWorkerTimeoutSeconds),
            "heartbeat_interval_seconds" => Ok(ConfigKey::HeartbeatIntervalSeconds),
            other => Err(ConfigError::UnknownKey(other.to_string())),
        }
    }
}

impl ConfigKey {
    /// All declared keys, in listing order.
    pub const ALL: [ConfigKey; 6] = [
        ConfigKey::MaxRetries,
        ConfigKey::BackoffBase,
        ConfigKey::PollIntervalMs,
        ConfigKey::DbPath,
        ConfigKey::StaleWorkerTimeoutSeconds,
        ConfigKey::HeartbeatIntervalSeconds,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::MaxRetries => "max_retries",
            ConfigKey::BackoffBase => "backoff_base",
            ConfigKey::PollIntervalMs => "poll_interval_ms",
            ConfigKey::DbPath => "db_path",
            ConfigKey::StaleWorkerTimeoutSeconds => "stale_worker_timeout_seconds",
            ConfigKey::HeartbeatIntervalSeconds => "heartbeat_interval_seconds",
        }
    }

    pub fn default_value(&self) -> &'static str {
        match self {
            ConfigKey::MaxRetries => "3",
            ConfigKey::BackoffBase => "2",
            ConfigKey::PollIntervalMs => "500",
            ConfigKey::DbPath => DEFAULT_DB_PATH,
            ConfigKey::StaleWorkerTimeoutSeconds => "30",
            ConfigKey::HeartbeatIntervalSeconds => "5",
        }
    }

    /// Check a candidate value against this key's parse rule.
    pub fn validate_value(&self, value: &str) -> Result<(), ConfigError> {
        let key = self.as_str();
        match self {
            ConfigKey::MaxRetries => parse_int_min(key, value, 0).map(|_| ()),
            ConfigKey::BackoffBase => parse_int_min(key, value, 1).map(|_| ()),
            ConfigKey::PollIntervalMs => parse_int_min(key, value, 1).map(|_| ()),
            ConfigKey::StaleWorkerTimeoutSeconds => parse_int_min(key, value, 1).map(|_| ()),
            ConfigKey::HeartbeatIntervalSeconds => parse_int_min(key, value, 1).map(|_| ()),
            ConfigKey::DbPath => {
                if value.trim().is_empty() {
                    Err(ConfigError::InvalidValue {
                        key,
                        reason: "path must be non-empty".to_string(),
                    })
                } else {
                    Ok(())
                }
            }
        }
    }
}

fn parse_int_min(key: &'static str, value: &str, min: i64) -> Result<i64, ConfigError> {
    let parsed: i64 = value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        reason: format!("expected an integer, got {value:?}"),
    })?;
    if parsed < min {
        return Err(ConfigError::InvalidValue {
            key,
            reason: format!("must be >= {min}, got {parsed}"),
        });
    }
    Ok(parsed)
}

/// Typed snapshot of the configuration table, defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub max_retries: i64,
    pub backoff_base: i64,
    pub poll_interval_ms: i64,
    pub db_path: String,
    pub stale_worker_timeout_seconds: i64,
    pub heartbeat_interval_seconds: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base: 2,
            poll_interval_ms: 500,
            db_path: DEFAULT_DB_PATH.to_string(),
            stale_worker_timeout_seconds: 30,
            heartbeat_interval_seconds: 5,
        }
    }
}

impl Settings {
    /// Build settings from stored `(key, value)` entries, applying defaults
    /// for absent keys. Stored values that no longer parse fall back to the
    /// default rather than poisoning every command.
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut settings = Settings::default();
        for (key, value) in entries {
            let Ok(key) = key.parse::<ConfigKey>() else {
                continue;
            };
            if key.validate_value(value).is_err() {
                continue;
            }
            match key {
                ConfigKey::MaxRetries => settings.max_retries = int_or_default(value, 3),
                ConfigKey::BackoffBase => settings.backoff_base = int_or_default(value, 2),
                ConfigKey::PollIntervalMs => settings.poll_interval_ms = int_or_default(value, 500),
                ConfigKey::DbPath => settings.db_path = value.to_string(),
                ConfigKey::StaleWorkerTimeoutSeconds => {
                    settings.stale_worker_timeout_seconds = int_or_default(value, 30)
                }
                ConfigKey::HeartbeatIntervalSeconds => {
                    settings.heartbeat_interval_seconds = int_or_default(value, 5)
                }
            }
        }
        settings
    }
}

fn int_or_default(value: &str, default: i64) -> i64 {
    value.trim().parse().unwrap_or(default)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
