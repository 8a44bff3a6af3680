// SPDX-License-Identifier: MIT

//! Transactional persistence for the queue engine.
//!
//! A single SQLite database (WAL mode) holds the jobs table, the dead
//! letter queue, the worker registry, and the config table. Every mutation
//! is a single statement or an explicit transaction; the atomic job claim
//! is one conditional `UPDATE … RETURNING`. Transient `SQLITE_BUSY`
//! contention is retried internally with a short bounded backoff.

mod config;
mod dlq;
mod error;
mod jobs;
mod schema;
mod workers;

pub use error::StoreError;
pub use jobs::NewJob;
pub use workers::{RecoveredJob, RecoveryOutcome};

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};

/// Attempts made against a busy database before giving up.
const BUSY_RETRY_LIMIT: u32 = 5;
/// First retry delay; doubles per attempt.
const BUSY_RETRY_BASE: Duration = Duration::from_millis(20);

/// Handle to the shared persistent store. Cheap to clone.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (creating if missing) the database at `path` and ensure the
    /// schema exists. The parent directory is created as needed.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| StoreError::Open {
                    path: path.display().to_string(),
                    source: sqlx::Error::Io(e),
                })?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|source| StoreError::Open {
                path: path.display().to_string(),
                source,
            })?;

        schema::init(&pool).await?;
        Ok(Self { pool })
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Run `op` until it succeeds, retrying bounded times on SQLITE_BUSY.
pub(crate) async fn retry_busy<T, Fut>(
    command: &'static str,
    mut op: impl FnMut() -> Fut,
) -> Result<T, StoreError>
where
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    let mut delay = BUSY_RETRY_BASE;
    let mut attempt = 0u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if is_busy(&err) && attempt < BUSY_RETRY_LIMIT => {
                attempt += 1;
                tracing::warn!(command, attempt, "store busy, retrying");
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
            Err(source) => return Err(StoreError::Query { command, source }),
        }
    }
}

fn is_busy(err: &sqlx::Error) -> bool {
    match err.as_database_error() {
        Some(db) => {
            let message = db.message();
            message.contains("database is locked") || message.contains("database table is locked")
        }
        None => false,
    }
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db| db.message().contains("UNIQUE constraint failed"))
        .unwrap_or(false)
}
