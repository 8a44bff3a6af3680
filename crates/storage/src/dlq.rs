// SPDX-License-Identifier: MIT

//! Dead letter queue operations. Moving a job in, retrying an entry out,
//! and purging are each a single transaction.

use qc_core::{truncate_error, DlqEntry, DlqId, Job, JobId, JobState};

use crate::error::StoreError;
use crate::{retry_busy, Store};

#[derive(sqlx::FromRow)]
struct DlqRow {
    dlq_id: String,
    original_job_id: String,
    command: String,
    attempts: i64,
    last_error: Option<String>,
    moved_at: i64,
}

impl From<DlqRow> for DlqEntry {
    fn from(row: DlqRow) -> Self {
        DlqEntry {
            dlq_id: DlqId::new(row.dlq_id),
            original_job_id: JobId::new(row.original_job_id),
            command: row.command,
            attempts: row.attempts,
            last_error: row.last_error,
            moved_at: row.moved_at,
        }
    }
}

impl Store {
    /// Consume a processing job's final attempt and freeze it in the DLQ.
    ///
    /// The state transition and the DLQ insert commit together.
    pub async fn fail_and_deadletter(
        &self,
        id: &JobId,
        error: &str,
        now_ms: i64,
    ) -> Result<DlqEntry, StoreError> {
        let message = truncate_error(error);
        let dlq_id = DlqId::generate();

        let pool = self.pool().clone();
        let job_id = id.as_str().to_string();
        let moved = retry_busy("fail_and_deadletter", || {
            let pool = pool.clone();
            let job_id = job_id.clone();
            let message = message.clone();
            let dlq_id = dlq_id.as_str().to_string();
            async move {
                let mut tx = pool.begin().await?;

                let row: Option<(String, i64)> = sqlx::query_as(
                    "UPDATE jobs SET state = 'dead', attempts = attempts + 1, \
                     worker_id = NULL, last_error = ?1, updated_at = ?2 \
                     WHERE id = ?3 AND state = 'processing' \
                     RETURNING command, attempts",
                )
                .bind(&message)
                .bind(now_ms)
                .bind(&job_id)
                .fetch_optional(&mut *tx)
                .await?;

                let Some((command, attempts)) = row else {
                    return Ok(None);
                };

                sqlx::query(
                    "INSERT INTO dlq (dlq_id, original_job_id, command, attempts, last_error, moved_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                )
                .bind(&dlq_id)
                .bind(&job_id)
                .bind(&command)
                .bind(attempts)
                .bind(&message)
                .bind(now_ms)
                .execute(&mut *tx)
                .await?;

                tx.commit().await?;
                Ok(Some((command, attempts)))
            }
        })
        .await?;

        let Some((command, attempts)) = moved else {
            return Err(StoreError::NotFound {
                kind: "processing job",
                id: id.to_string(),
            });
        };

        Ok(DlqEntry {
            dlq_id,
            original_job_id: id.clone(),
            command,
            attempts,
            last_error: Some(message),
            moved_at: now_ms,
        })
    }

    /// List DLQ entries, most recently moved first.
    pub async fn list_dlq(&self, limit: i64) -> Result<Vec<DlqEntry>, StoreError> {
        let pool = self.pool().clone();
        let rows = retry_busy("list_dlq", || {
            let pool = pool.clone();
            async move {
                sqlx::query_as::<_, DlqRow>(
                    "SELECT dlq_id, original_job_id, command, attempts, last_error, moved_at \
                     FROM dlq ORDER BY moved_at DESC, dlq_id ASC LIMIT ?1",
                )
                .bind(limit)
                .fetch_all(&pool)
                .await
            }
        })
        .await?;

        Ok(rows.into_iter().map(DlqEntry::from).collect())
    }

    /// Retry a DLQ entry: delete the entry and insert a fresh pending job
    /// (new id, zero attempts) in one transaction. `max_retries` comes from
    /// the caller's current defaults.
    pub async fn retry_dlq(
        &self,
        dlq_id: &DlqId,
        max_retries: i64,
        now_ms: i64,
    ) -> Result<Job, StoreError> {
        let new_id = JobId::generate();

        let pool = self.pool().clone();
        let entry_id = dlq_id.as_str().to_string();
        let command = retry_busy("retry_dlq", || {
            let pool = pool.clone();
            let entry_id = entry_id.clone();
            let new_id = new_id.as_str().to_string();
            async move {
                let mut tx = pool.begin().await?;

                let row: Option<(String,)> = sqlx::query_as(
                    "DELETE FROM dlq WHERE dlq_id = ?1 RETURNING command",
                )
                .bind(&entry_id)
                .fetch_optional(&mut *tx)
                .await?;

                let Some((command,)) = row else {
                    return Ok(None);
                };

                sqlx::query(
                    "INSERT INTO jobs (id, command, state, priority, max_retries, attempts, \
                     timeout_seconds, run_at, next_run_at, worker_id, last_error, created_at, updated_at) \
                     VALUES (?1, ?2, 'pending', 0, ?3, 0, NULL, ?4, ?4, NULL, NULL, ?4, ?4)",
                )
                .bind(&new_id)
                .bind(&command)
                .bind(max_retries)
                .bind(now_ms)
                .execute(&mut *tx)
                .await?;

                tx.commit().await?;
                Ok(Some(command))
            }
        })
        .await?;

        let Some(command) = command else {
            return Err(StoreError::NotFound {
                kind: "dlq entry",
                id: dlq_id.to_string(),
            });
        };

        Ok(Job {
            id: new_id,
            command,
            state: JobState::Pending,
            priority: 0,
            max_retries,
            attempts: 0,
            timeout_seconds: None,
            run_at: now_ms,
            next_run_at: now_ms,
            worker_id: None,
            last_error: None,
            created_at: now_ms,
            updated_at: now_ms,
        })
    }

    /// Delete DLQ entries moved before `cutoff_ms`. Returns the purge count.
    pub async fn purge_dlq(&self, cutoff_ms: i64) -> Result<u64, StoreError> {
        let pool = self.pool().clone();
        retry_busy("purge_dlq", || {
            let pool = pool.clone();
            async move {
                sqlx::query("DELETE FROM dlq WHERE moved_at < ?1")
                    .bind(cutoff_ms)
                    .execute(&pool)
                    .await
                    .map(|r| r.rows_affected())
            }
        })
        .await
    }
}

#[cfg(test)]
#[path = "dlq_tests.rs"]
mod tests;
