// SPDX-License-Identifier: MIT

//! The centralized failure handler.
//!
//! Workers never decide retry-vs-dead-letter themselves; every failed
//! attempt lands here.

use qc_core::{Clock, DlqEntry, Job, JobId};

use crate::{Engine, EngineError};

/// How a failed attempt was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureResolution {
    /// Attempt consumed; the job is pending again after a backoff delay.
    Retrying { delay_seconds: i64 },
    /// Retries exhausted; the job is frozen in the DLQ.
    DeadLettered(DlqEntry),
}

/// Exponential backoff delay in seconds for the given attempt number,
/// saturating instead of overflowing.
pub fn backoff_delay_seconds(base: i64, attempt: i64) -> i64 {
    let exponent = attempt.clamp(0, u32::MAX as i64) as u32;
    base.checked_pow(exponent).unwrap_or(i64::MAX)
}

impl<C: Clock> Engine<C> {
    /// Mark a claimed job's attempt successful.
    pub async fn complete_job(&self, id: &JobId) -> Result<(), EngineError> {
        self.store().complete(id, self.now_ms()).await?;
        tracing::info!(job_id = %id, "job completed");
        Ok(())
    }

    /// Resolve a failed attempt: schedule a retry with exponential backoff,
    /// or move the job to the DLQ once `max_retries` is exhausted.
    pub async fn handle_job_failure(
        &self,
        job: &Job,
        error: &str,
    ) -> Result<FailureResolution, EngineError> {
        if job.retries_remaining() == 0 {
            let entry = self
                .store()
                .fail_and_deadletter(&job.id, error, self.now_ms())
                .await?;
            tracing::warn!(
                job_id = %job.id,
                attempts = entry.attempts,
                error,
                "job dead-lettered"
            );
            return Ok(FailureResolution::DeadLettered(entry));
        }

        // Delay keyed to the attempt this failure just consumed.
        let delay_seconds = backoff_delay_seconds(self.settings().backoff_base, job.attempts + 1);
        self.store()
            .fail_and_retry(&job.id, error, delay_seconds, self.now_ms())
            .await?;
        tracing::info!(
            job_id = %job.id,
            attempt = job.attempts + 1,
            delay_seconds,
            error,
            "job scheduled for retry"
        );
        Ok(FailureResolution::Retrying { delay_seconds })
    }
}

#[cfg(test)]
#[path = "failure_tests.rs"]
mod tests;
