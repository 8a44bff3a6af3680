// SPDX-License-Identifier: MIT

//! DLQ operations exposed to the CLI.

use qc_core::{Clock, DlqEntry, DlqId, Job};

use crate::{Engine, EngineError};

const DAY_MS: i64 = 86_400_000;

impl<C: Clock> Engine<C> {
    /// List DLQ entries, newest first.
    pub async fn dlq_list(&self, limit: i64) -> Result<Vec<DlqEntry>, EngineError> {
        Ok(self.store().list_dlq(limit).await?)
    }

    /// Retry a DLQ entry: a fresh job (new id, zero attempts, current
    /// default retries) replaces the entry atomically.
    pub async fn dlq_retry(&self, dlq_id: &DlqId) -> Result<Job, EngineError> {
        let job = self
            .store()
            .retry_dlq(dlq_id, self.settings().max_retries, self.now_ms())
            .await?;
        tracing::info!(dlq_id = %dlq_id, job_id = %job.id, "dlq entry requeued");
        Ok(job)
    }

    /// Purge DLQ entries older than `older_than_days`. Returns the count.
    pub async fn dlq_purge(&self, older_than_days: i64) -> Result<u64, EngineError> {
        let cutoff = self
            .now_ms()
            .saturating_sub(older_than_days.saturating_mul(DAY_MS));
        let purged = self.store().purge_dlq(cutoff).await?;
        tracing::info!(purged, older_than_days, "dlq purged");
        Ok(purged)
    }
}
