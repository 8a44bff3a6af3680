// SPDX-License-Identifier: MIT

//! Config table access. Key validation lives in the queue service; the
//! store treats entries as opaque strings.

use crate::error::StoreError;
use crate::{retry_busy, Store};

impl Store {
    /// Read one stored config value.
    pub async fn get_config(&self, key: &str) -> Result<Option<String>, StoreError> {
        let pool = self.pool().clone();
        let key = key.to_string();
        let row = retry_busy("get_config", || {
            let pool = pool.clone();
            let key = key.clone();
            async move {
                sqlx::query_as::<_, (String,)>("SELECT value FROM config WHERE key = ?1")
                    .bind(key)
                    .fetch_optional(&pool)
                    .await
            }
        })
        .await?;

        Ok(row.map(|(value,)| value))
    }

    /// Upsert one config value. Setting the same value twice is a no-op.
    pub async fn set_config(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let pool = self.pool().clone();
        let key = key.to_string();
        let value = value.to_string();
        retry_busy("set_config", || {
            let pool = pool.clone();
            let key = key.clone();
            let value = value.clone();
            async move {
                sqlx::query(
                    "INSERT INTO config (key, value) VALUES (?1, ?2) \
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                )
                .bind(key)
                .bind(value)
                .execute(&pool)
                .await
                .map(|_| ())
            }
        })
        .await
    }

    /// All stored config entries, sorted by key.
    pub async fn list_config(&self) -> Result<Vec<(String, String)>, StoreError> {
        let pool = self.pool().clone();
        retry_busy("list_config", || {
            let pool = pool.clone();
            async move {
                sqlx::query_as::<_, (String, String)>(
                    "SELECT key, value FROM config ORDER BY key ASC",
                )
                .fetch_all(&pool)
                .await
            }
        })
        .await
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
