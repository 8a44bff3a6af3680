// SPDX-License-Identifier: MIT

//! Schema bootstrap. Tables are created on first open; there is no
//! migration machinery.

use sqlx::SqlitePool;

use crate::error::StoreError;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS jobs (
    id              TEXT PRIMARY KEY,
    command         TEXT NOT NULL,
    state           TEXT NOT NULL DEFAULT 'pending',
    priority        INTEGER NOT NULL DEFAULT 0,
    max_retries     INTEGER NOT NULL DEFAULT 3,
    attempts        INTEGER NOT NULL DEFAULT 0,
    timeout_seconds INTEGER,
    run_at          INTEGER NOT NULL,
    next_run_at     INTEGER NOT NULL,
    worker_id       TEXT,
    last_error      TEXT,
    created_at      INTEGER NOT NULL,
    updated_at      INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_jobs_claim
    ON jobs (state, next_run_at, priority, created_at, id);

CREATE TABLE IF NOT EXISTS dlq (
    dlq_id          TEXT PRIMARY KEY,
    original_job_id TEXT NOT NULL,
    command         TEXT NOT NULL,
    attempts        INTEGER NOT NULL,
    last_error      TEXT,
    moved_at        INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS workers (
    worker_id         TEXT PRIMARY KEY,
    pid               INTEGER NOT NULL,
    hostname          TEXT NOT NULL,
    started_at        INTEGER NOT NULL,
    last_heartbeat_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS config (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

pub(crate) async fn init(pool: &SqlitePool) -> Result<(), StoreError> {
    sqlx::raw_sql(SCHEMA)
        .execute(pool)
        .await
        .map_err(|source| StoreError::Query {
            command: "schema init",
            source,
        })?;
    Ok(())
}
