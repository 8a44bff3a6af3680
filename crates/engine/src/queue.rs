// SPDX-License-Identifier: MIT

//! Enqueue and read paths.

use qc_core::{Clock, Job, JobId, JobSpec, JobState};
use qc_storage::NewJob;

use crate::{Engine, EngineError};

impl<C: Clock> Engine<C> {
    /// Validate a job spec, fill defaults, and insert the pending job.
    pub async fn enqueue(&self, spec: &JobSpec) -> Result<Job, EngineError> {
        let validated = spec.validate()?;
        let now = self.now_ms();

        let new = NewJob {
            id: validated.id.unwrap_or_else(JobId::generate),
            command: validated.command,
            priority: validated.priority,
            max_retries: validated
                .max_retries
                .unwrap_or(self.settings().max_retries),
            timeout_seconds: validated.timeout_seconds,
            run_at: validated.run_at_ms.unwrap_or(now),
            created_at: now,
        };

        let job = self.store().enqueue(&new).await?;
        tracing::info!(job_id = %job.id, priority = job.priority, "job enqueued");
        Ok(job)
    }

    /// Paginated job listing, optionally filtered by state.
    pub async fn list_jobs(
        &self,
        state: Option<JobState>,
        limit: i64,
    ) -> Result<Vec<Job>, EngineError> {
        Ok(self.store().list_jobs(state, limit).await?)
    }

    /// Inspect one job.
    pub async fn get_job(&self, id: &JobId) -> Result<Option<Job>, EngineError> {
        Ok(self.store().get_job(id).await?)
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
