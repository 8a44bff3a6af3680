// SPDX-License-Identifier: MIT

//! Worker registry and orphan recovery.

use qc_core::{DlqId, JobId, WorkerId, WorkerRecord};

use crate::error::StoreError;
use crate::{retry_busy, Store};

/// What orphan recovery did with one interrupted job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryOutcome {
    /// The interrupted attempt was consumed and the job returned to pending.
    Requeued,
    /// Consuming the interrupted attempt exhausted the retries; the job
    /// moved to the DLQ.
    DeadLettered,
}

/// One job touched by an orphan-recovery sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredJob {
    pub job_id: JobId,
    pub worker_id: WorkerId,
    pub outcome: RecoveryOutcome,
}

#[derive(sqlx::FromRow)]
struct WorkerRow {
    worker_id: String,
    pid: i64,
    hostname: String,
    started_at: i64,
    last_heartbeat_at: i64,
}

impl From<WorkerRow> for WorkerRecord {
    fn from(row: WorkerRow) -> Self {
        WorkerRecord {
            worker_id: WorkerId::new(row.worker_id),
            pid: row.pid,
            hostname: row.hostname,
            started_at: row.started_at,
            last_heartbeat_at: row.last_heartbeat_at,
        }
    }
}

impl Store {
    /// Insert (or refresh) a worker's registry row.
    pub async fn register_worker(&self, record: &WorkerRecord) -> Result<(), StoreError> {
        let pool = self.pool().clone();
        let record = record.clone();
        retry_busy("register_worker", || {
            let pool = pool.clone();
            let record = record.clone();
            async move {
                sqlx::query(
                    "INSERT INTO workers (worker_id, pid, hostname, started_at, last_heartbeat_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5) \
                     ON CONFLICT(worker_id) DO UPDATE SET \
                         pid = excluded.pid, hostname = excluded.hostname, \
                         started_at = excluded.started_at, \
                         last_heartbeat_at = excluded.last_heartbeat_at",
                )
                .bind(record.worker_id.as_str())
                .bind(record.pid)
                .bind(&record.hostname)
                .bind(record.started_at)
                .bind(record.last_heartbeat_at)
                .execute(&pool)
                .await
                .map(|_| ())
            }
        })
        .await
    }

    /// Refresh a worker's liveness timestamp.
    ///
    /// Returns [`StoreError::NotFound`] when the registry row is gone
    /// (e.g. removed by a stale sweep); the caller should re-register.
    pub async fn heartbeat(&self, worker_id: &WorkerId, now_ms: i64) -> Result<(), StoreError> {
        let pool = self.pool().clone();
        let id = worker_id.as_str().to_string();
        let affected = retry_busy("heartbeat", || {
            let pool = pool.clone();
            let id = id.clone();
            async move {
                sqlx::query("UPDATE workers SET last_heartbeat_at = ?1 WHERE worker_id = ?2")
                    .bind(now_ms)
                    .bind(id)
                    .execute(&pool)
                    .await
                    .map(|r| r.rows_affected())
            }
        })
        .await?;

        if affected == 0 {
            return Err(StoreError::NotFound {
                kind: "worker",
                id: worker_id.to_string(),
            });
        }
        Ok(())
    }

    /// Remove a worker's registry row on graceful shutdown.
    pub async fn unregister_worker(&self, worker_id: &WorkerId) -> Result<(), StoreError> {
        let pool = self.pool().clone();
        let id = worker_id.as_str().to_string();
        retry_busy("unregister_worker", || {
            let pool = pool.clone();
            let id = id.clone();
            async move {
                sqlx::query("DELETE FROM workers WHERE worker_id = ?1")
                    .bind(id)
                    .execute(&pool)
                    .await
                    .map(|_| ())
            }
        })
        .await
    }

    /// All registered workers, oldest first.
    pub async fn list_workers(&self) -> Result<Vec<WorkerRecord>, StoreError> {
        let pool = self.pool().clone();
        let rows = retry_busy("list_workers", || {
            let pool = pool.clone();
            async move {
                sqlx::query_as::<_, WorkerRow>(
                    "SELECT worker_id, pid, hostname, started_at, last_heartbeat_at \
                     FROM workers ORDER BY started_at ASC, worker_id ASC",
                )
                .fetch_all(&pool)
                .await
            }
        })
        .await?;

        Ok(rows.into_iter().map(WorkerRecord::from).collect())
    }

    /// Workers whose heartbeat is strictly older than `timeout_seconds`.
    pub async fn find_stale_workers(
        &self,
        now_ms: i64,
        timeout_seconds: i64,
    ) -> Result<Vec<WorkerId>, StoreError> {
        let cutoff = now_ms.saturating_sub(timeout_seconds.saturating_mul(1_000));
        let pool = self.pool().clone();
        let rows = retry_busy("find_stale_workers", || {
            let pool = pool.clone();
            async move {
                sqlx::query_as::<_, (String,)>(
                    "SELECT worker_id FROM workers WHERE last_heartbeat_at < ?1 \
                     ORDER BY worker_id ASC",
                )
                .bind(cutoff)
                .fetch_all(&pool)
                .await
            }
        })
        .await?;

        Ok(rows.into_iter().map(|(id,)| WorkerId::new(id)).collect())
    }

    /// Reclaim jobs held by stale workers.
    ///
    /// Each interrupted attempt is treated as consumed: the job returns to
    /// pending with `attempts + 1`, or moves to the DLQ when that exhausts
    /// its retries. Stale registry rows are deleted in the same
    /// transaction.
    pub async fn recover_orphans(
        &self,
        stale: &[WorkerId],
        now_ms: i64,
    ) -> Result<Vec<RecoveredJob>, StoreError> {
        if stale.is_empty() {
            return Ok(Vec::new());
        }

        let pool = self.pool().clone();
        let stale: Vec<String> = stale.iter().map(|w| w.as_str().to_string()).collect();
        let recovered = retry_busy("recover_orphans", || {
            let pool = pool.clone();
            let stale = stale.clone();
            async move {
                let mut tx = pool.begin().await?;
                let mut recovered = Vec::new();

                for worker in &stale {
                    let orphans: Vec<(String, i64, i64)> = sqlx::query_as(
                        "SELECT id, attempts, max_retries FROM jobs \
                         WHERE worker_id = ?1 AND state = 'processing' ORDER BY id ASC",
                    )
                    .bind(worker)
                    .fetch_all(&mut *tx)
                    .await?;

                    let message = format!("Worker {worker} went stale while processing");

                    for (job_id, attempts, max_retries) in orphans {
                        if attempts + 1 > max_retries {
                            let row: Option<(String,)> = sqlx::query_as(
                                "UPDATE jobs SET state = 'dead', attempts = attempts + 1, \
                                 worker_id = NULL, last_error = ?1, updated_at = ?2 \
                                 WHERE id = ?3 RETURNING command",
                            )
                            .bind(&message)
                            .bind(now_ms)
                            .bind(&job_id)
                            .fetch_optional(&mut *tx)
                            .await?;

                            if let Some((command,)) = row {
                                sqlx::query(
                                    "INSERT INTO dlq (dlq_id, original_job_id, command, \
                                     attempts, last_error, moved_at) \
                                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                                )
                                .bind(DlqId::generate().as_str())
                                .bind(&job_id)
                                .bind(&command)
                                .bind(attempts + 1)
                                .bind(&message)
                                .bind(now_ms)
                                .execute(&mut *tx)
                                .await?;
                            }
                            recovered.push((job_id, worker.clone(), true));
                        } else {
                            sqlx::query(
                                "UPDATE jobs SET state = 'pending', attempts = attempts + 1, \
                                 worker_id = NULL, last_error = ?1, updated_at = ?2 \
                                 WHERE id = ?3",
                            )
                            .bind(&message)
                            .bind(now_ms)
                            .bind(&job_id)
                            .execute(&mut *tx)
                            .await?;
                            recovered.push((job_id, worker.clone(), false));
                        }
                    }

                    sqlx::query("DELETE FROM workers WHERE worker_id = ?1")
                        .bind(worker)
                        .execute(&mut *tx)
                        .await?;
                }

                tx.commit().await?;
                Ok(recovered)
            }
        })
        .await?;

        Ok(recovered
            .into_iter()
            .map(|(job_id, worker_id, dead)| RecoveredJob {
                job_id: JobId::new(job_id),
                worker_id: WorkerId::new(worker_id),
                outcome: if dead {
                    RecoveryOutcome::DeadLettered
                } else {
                    RecoveryOutcome::Requeued
                },
            })
            .collect())
    }
}

#[cfg(test)]
#[path = "workers_tests.rs"]
mod tests;
