// SPDX-License-Identifier: MIT

//! Guarded access to the config registry.

use qc_core::{Clock, ConfigKey};
use serde::Serialize;

use crate::{Engine, EngineError};

/// One declared config key with its effective value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
    /// True when the value comes from the declared default rather than a
    /// stored row.
    pub default: bool,
}

impl<C: Clock> Engine<C> {
    /// Effective value of one declared key. Unknown keys are rejected.
    pub async fn config_get(&self, key: &str) -> Result<String, EngineError> {
        let key: ConfigKey = key.parse()?;
        let stored = self.store().get_config(key.as_str()).await?;
        Ok(stored.unwrap_or_else(|| key.default_value().to_string()))
    }

    /// Validate and persist one config value. Unknown keys and values that
    /// fail the key's parse rule are rejected.
    pub async fn config_set(&self, key: &str, value: &str) -> Result<(), EngineError> {
        let key: ConfigKey = key.parse()?;
        key.validate_value(value)?;
        self.store().set_config(key.as_str(), value).await?;
        tracing::info!(key = key.as_str(), value, "config updated");
        Ok(())
    }

    /// Every declared key with its effective value.
    pub async fn config_list(&self) -> Result<Vec<ConfigEntry>, EngineError> {
        let stored = self.store().list_config().await?;
        Ok(ConfigKey::ALL
            .into_iter()
            .map(|key| {
                let row = stored.iter().find(|(k, _)| k == key.as_str());
                ConfigEntry {
                    key: key.as_str().to_string(),
                    value: row
                        .map(|(_, v)| v.clone())
                        .unwrap_or_else(|| key.default_value().to_string()),
                    default: row.is_none(),
                }
            })
            .collect())
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
