// SPDX-License-Identifier: MIT

//! Status aggregation: job counts per state and live workers.

use qc_core::{Clock, JobState, WorkerRecord};
use serde::Serialize;

use crate::{Engine, EngineError};

#[derive(Debug, Clone, Serialize)]
pub struct StateCount {
    pub state: JobState,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    /// One entry per declared state, zero-filled.
    pub counts: Vec<StateCount>,
    /// Registered workers whose heartbeat is within the staleness window.
    pub live_workers: Vec<WorkerRecord>,
}

impl StatusReport {
    pub fn count(&self, state: JobState) -> i64 {
        self.counts
            .iter()
            .find(|c| c.state == state)
            .map(|c| c.count)
            .unwrap_or(0)
    }
}

impl<C: Clock> Engine<C> {
    /// Aggregate queue counts and enumerate live workers.
    pub async fn status(&self) -> Result<StatusReport, EngineError> {
        let raw = self.store().count_jobs_by_state().await?;
        let counts = JobState::ALL
            .into_iter()
            .map(|state| StateCount {
                state,
                count: raw
                    .iter()
                    .find(|(s, _)| *s == state)
                    .map(|(_, n)| *n)
                    .unwrap_or(0),
            })
            .collect();

        let now = self.now_ms();
        let timeout = self.settings().stale_worker_timeout_seconds;
        let live_workers = self
            .store()
            .list_workers()
            .await?
            .into_iter()
            .filter(|w| !w.is_stale(now, timeout))
            .collect();

        Ok(StatusReport {
            counts,
            live_workers,
        })
    }

    /// Find stale workers and reclaim their jobs. Returns what was touched.
    pub async fn recover_stale_workers(
        &self,
    ) -> Result<Vec<qc_storage::RecoveredJob>, EngineError> {
        let now = self.now_ms();
        let stale = self
            .store()
            .find_stale_workers(now, self.settings().stale_worker_timeout_seconds)
            .await?;
        if stale.is_empty() {
            return Ok(Vec::new());
        }
        let recovered = self.store().recover_orphans(&stale, now).await?;
        for job in &recovered {
            tracing::warn!(
                job_id = %job.job_id,
                worker_id = %job.worker_id,
                outcome = ?job.outcome,
                "orphaned job recovered"
            );
        }
        Ok(recovered)
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
