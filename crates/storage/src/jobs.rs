// SPDX-License-Identifier: MIT

//! Job table operations: enqueue, the atomic claim, and resolution.

use qc_core::{truncate_error, Job, JobId, JobState, WorkerId};

use crate::error::StoreError;
use crate::{is_unique_violation, retry_busy, Store};

pub(crate) const JOB_COLUMNS: &str = "id, command, state, priority, max_retries, attempts, \
     timeout_seconds, run_at, next_run_at, worker_id, last_error, created_at, updated_at";

/// A validated job ready for insertion. `next_run_at` starts equal to
/// `run_at` and `attempts` at zero.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub id: JobId,
    pub command: String,
    pub priority: i64,
    pub max_retries: i64,
    pub timeout_seconds: Option<i64>,
    pub run_at: i64,
    pub created_at: i64,
}

#[derive(sqlx::FromRow)]
pub(crate) struct JobRow {
    pub(crate) id: String,
    pub(crate) command: String,
    pub(crate) state: String,
    pub(crate) priority: i64,
    pub(crate) max_retries: i64,
    pub(crate) attempts: i64,
    pub(crate) timeout_seconds: Option<i64>,
    pub(crate) run_at: i64,
    pub(crate) next_run_at: i64,
    pub(crate) worker_id: Option<String>,
    pub(crate) last_error: Option<String>,
    pub(crate) created_at: i64,
    pub(crate) updated_at: i64,
}

impl TryFrom<JobRow> for Job {
    type Error = StoreError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        let state = row.state.parse().map_err(|reason| StoreError::Corrupt {
            table: "jobs",
            reason,
        })?;
        Ok(Job {
            id: JobId::new(row.id),
            command: row.command,
            state,
            priority: row.priority,
            max_retries: row.max_retries,
            attempts: row.attempts,
            timeout_seconds: row.timeout_seconds,
            run_at: row.run_at,
            next_run_at: row.next_run_at,
            worker_id: row.worker_id.map(WorkerId::new),
            last_error: row.last_error,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl Store {
    /// Insert a new pending job. Fails with [`StoreError::DuplicateId`]
    /// when the id already exists.
    pub async fn enqueue(&self, new: &NewJob) -> Result<Job, StoreError> {
        let pool = self.pool().clone();
        let job = new.clone();
        let result = retry_busy("enqueue", || {
            let pool = pool.clone();
            let job = job.clone();
            async move {
                sqlx::query(
                    "INSERT INTO jobs (id, command, state, priority, max_retries, attempts, \
                     timeout_seconds, run_at, next_run_at, worker_id, last_error, created_at, updated_at) \
                     VALUES (?1, ?2, 'pending', ?3, ?4, 0, ?5, ?6, ?6, NULL, NULL, ?7, ?7)",
                )
                .bind(job.id.as_str())
                .bind(&job.command)
                .bind(job.priority)
                .bind(job.max_retries)
                .bind(job.timeout_seconds)
                .bind(job.run_at)
                .bind(job.created_at)
                .execute(&pool)
                .await
            }
        })
        .await;

        match result {
            Ok(_) => Ok(Job {
                id: new.id.clone(),
                command: new.command.clone(),
                state: JobState::Pending,
                priority: new.priority,
                max_retries: new.max_retries,
                attempts: 0,
                timeout_seconds: new.timeout_seconds,
                run_at: new.run_at,
                next_run_at: new.run_at,
                worker_id: None,
                last_error: None,
                created_at: new.created_at,
                updated_at: new.created_at,
            }),
            Err(StoreError::Query { source, .. }) if is_unique_violation(&source) => {
                Err(StoreError::DuplicateId(new.id.clone()))
            }
            Err(err) => Err(err),
        }
    }

    /// Atomically claim the highest-priority eligible job for `worker_id`.
    ///
    /// Selection and transition happen in one conditional UPDATE so that
    /// under concurrent callers exactly one observes any given job. Ties
    /// break by ascending `created_at`, then ascending id.
    pub async fn claim_next(
        &self,
        worker_id: &WorkerId,
        now_ms: i64,
    ) -> Result<Option<Job>, StoreError> {
        let sql = format!(
            "UPDATE jobs SET state = 'processing', worker_id = ?1, updated_at = ?2 \
             WHERE state = 'pending' AND next_run_at <= ?2 AND id = ( \
                 SELECT id FROM jobs WHERE state = 'pending' AND next_run_at <= ?2 \
                 ORDER BY priority DESC, created_at ASC, id ASC LIMIT 1) \
             RETURNING {JOB_COLUMNS}"
        );

        let pool = self.pool().clone();
        let worker = worker_id.as_str().to_string();
        let row = retry_busy("claim_next", || {
            let pool = pool.clone();
            let worker = worker.clone();
            let sql = sql.clone();
            async move {
                sqlx::query_as::<_, JobRow>(&sql)
                    .bind(worker)
                    .bind(now_ms)
                    .fetch_optional(&pool)
                    .await
            }
        })
        .await?;

        row.map(Job::try_from).transpose()
    }

    /// Transition a processing job to completed.
    pub async fn complete(&self, id: &JobId, now_ms: i64) -> Result<(), StoreError> {
        let pool = self.pool().clone();
        let job_id = id.as_str().to_string();
        let affected = retry_busy("complete", || {
            let pool = pool.clone();
            let job_id = job_id.clone();
            async move {
                sqlx::query(
                    "UPDATE jobs SET state = 'completed', worker_id = NULL, updated_at = ?1 \
                     WHERE id = ?2 AND state = 'processing'",
                )
                .bind(now_ms)
                .bind(job_id)
                .execute(&pool)
                .await
                .map(|r| r.rows_affected())
            }
        })
        .await?;

        if affected == 0 {
            return Err(StoreError::NotFound {
                kind: "processing job",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// Release a processing job back to pending after a failed attempt,
    /// consuming the attempt and delaying eligibility by `delay_seconds`.
    pub async fn fail_and_retry(
        &self,
        id: &JobId,
        error: &str,
        delay_seconds: i64,
        now_ms: i64,
    ) -> Result<(), StoreError> {
        let next_run_at = now_ms.saturating_add(delay_seconds.saturating_mul(1_000));
        let message = truncate_error(error);

        let pool = self.pool().clone();
        let job_id = id.as_str().to_string();
        let affected = retry_busy("fail_and_retry", || {
            let pool = pool.clone();
            let job_id = job_id.clone();
            let message = message.clone();
            async move {
                sqlx::query(
                    "UPDATE jobs SET state = 'pending', attempts = attempts + 1, \
                     next_run_at = ?1, worker_id = NULL, last_error = ?2, updated_at = ?3 \
                     WHERE id = ?4 AND state = 'processing'",
                )
                .bind(next_run_at)
                .bind(message)
                .bind(now_ms)
                .bind(job_id)
                .execute(&pool)
                .await
                .map(|r| r.rows_affected())
            }
        })
        .await?;

        if affected == 0 {
            return Err(StoreError::NotFound {
                kind: "processing job",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// Fetch a single job by id.
    pub async fn get_job(&self, id: &JobId) -> Result<Option<Job>, StoreError> {
        let pool = self.pool().clone();
        let job_id = id.as_str().to_string();
        let sql = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = ?1");
        let row = retry_busy("get_job", || {
            let pool = pool.clone();
            let job_id = job_id.clone();
            let sql = sql.clone();
            async move {
                sqlx::query_as::<_, JobRow>(&sql)
                    .bind(job_id)
                    .fetch_optional(&pool)
                    .await
            }
        })
        .await?;

        row.map(Job::try_from).transpose()
    }

    /// Paginated read of jobs, newest first, optionally filtered by state.
    pub async fn list_jobs(
        &self,
        state: Option<JobState>,
        limit: i64,
    ) -> Result<Vec<Job>, StoreError> {
        let sql = match state {
            Some(_) => format!(
                "SELECT {JOB_COLUMNS} FROM jobs WHERE state = ?1 \
                 ORDER BY created_at DESC, id ASC LIMIT ?2"
            ),
            None => format!(
                "SELECT {JOB_COLUMNS} FROM jobs \
                 ORDER BY created_at DESC, id ASC LIMIT ?1"
            ),
        };

        let pool = self.pool().clone();
        let rows = retry_busy("list_jobs", || {
            let pool = pool.clone();
            let sql = sql.clone();
            async move {
                let query = sqlx::query_as::<_, JobRow>(&sql);
                let query = match state {
                    Some(state) => query.bind(state.to_string()).bind(limit),
                    None => query.bind(limit),
                };
                query.fetch_all(&pool).await
            }
        })
        .await?;

        rows.into_iter().map(Job::try_from).collect()
    }

    /// Count jobs grouped by state.
    pub async fn count_jobs_by_state(&self) -> Result<Vec<(JobState, i64)>, StoreError> {
        let pool = self.pool().clone();
        let rows = retry_busy("count_jobs", || {
            let pool = pool.clone();
            async move {
                sqlx::query_as::<_, (String, i64)>(
                    "SELECT state, COUNT(*) FROM jobs GROUP BY state",
                )
                .fetch_all(&pool)
                .await
            }
        })
        .await?;

        rows.into_iter()
            .map(|(state, count)| {
                let state: JobState = state.parse().map_err(|reason| StoreError::Corrupt {
                    table: "jobs",
                    reason,
                })?;
                Ok((state, count))
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "jobs_tests.rs"]
mod tests;
