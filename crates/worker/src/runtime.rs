// SPDX-License-Identifier: MIT

//! The per-process worker loop.

use std::time::{Duration, Instant};

use qc_core::{Clock, Job, SystemClock, WorkerId, WorkerRecord};
use qc_engine::Engine;
use tokio_util::sync::CancellationToken;

use crate::execute::{self, ExecOutcome};
use crate::WorkerError;

/// One worker's claim-execute-resolve loop.
pub struct WorkerRuntime {
    engine: Engine<SystemClock>,
    worker_id: WorkerId,
    shutdown: CancellationToken,
}

impl WorkerRuntime {
    pub fn new(engine: Engine<SystemClock>, shutdown: CancellationToken) -> Self {
        Self {
            engine,
            worker_id: WorkerId::generate(),
            shutdown,
        }
    }

    pub fn worker_id(&self) -> &WorkerId {
        &self.worker_id
    }

    /// Run until the shutdown token fires. The current job (if any) always
    /// resolves before the loop exits.
    pub async fn run(&self) -> Result<(), WorkerError> {
        let settings = self.engine.settings().clone();
        let poll_interval = Duration::from_millis(settings.poll_interval_ms.max(1) as u64);
        let heartbeat_interval =
            Duration::from_secs(settings.heartbeat_interval_seconds.max(1) as u64);

        self.register().await?;
        tracing::info!(worker_id = %self.worker_id, "worker started");

        // Reclaim anything a crashed predecessor left in processing.
        self.sweep_stale().await;

        let mut last_heartbeat = Instant::now();
        while !self.shutdown.is_cancelled() {
            if last_heartbeat.elapsed() >= heartbeat_interval {
                self.emit_heartbeat().await;
                self.sweep_stale().await;
                last_heartbeat = Instant::now();
            }

            let now = self.engine.clock().epoch_ms();
            match self.engine.store().claim_next(&self.worker_id, now).await {
                Ok(Some(job)) => {
                    self.process(job, heartbeat_interval, &mut last_heartbeat)
                        .await;
                }
                Ok(None) => {
                    tokio::select! {
                        _ = self.shutdown.cancelled() => break,
                        _ = tokio::time::sleep(poll_interval) => {}
                    }
                }
                Err(err) => {
                    // Store trouble is not fatal; if it persists the worker
                    // goes stale and its claims are recovered.
                    tracing::error!(worker_id = %self.worker_id, error = %err, "claim failed");
                    tokio::select! {
                        _ = self.shutdown.cancelled() => break,
                        _ = tokio::time::sleep(poll_interval) => {}
                    }
                }
            }
        }

        if let Err(err) = self.engine.store().unregister_worker(&self.worker_id).await {
            tracing::warn!(worker_id = %self.worker_id, error = %err, "unregister failed");
        }
        tracing::info!(worker_id = %self.worker_id, "worker stopped");
        Ok(())
    }

    /// Execute one claimed job and resolve it through the engine.
    ///
    /// Heartbeats keep flowing while the child runs so a long job does not
    /// make this worker look stale.
    async fn process(
        &self,
        job: Job,
        heartbeat_interval: Duration,
        last_heartbeat: &mut Instant,
    ) {
        tracing::info!(worker_id = %self.worker_id, job_id = %job.id, "job claimed");

        let exec = execute::run_job(&job);
        tokio::pin!(exec);
        let outcome = loop {
            tokio::select! {
                outcome = &mut exec => break outcome,
                _ = tokio::time::sleep(heartbeat_interval) => {
                    self.emit_heartbeat().await;
                    *last_heartbeat = Instant::now();
                }
            }
        };

        let resolved = match outcome {
            ExecOutcome::Success => self.engine.complete_job(&job.id).await.map(|_| ()),
            ExecOutcome::Failure { message } => self
                .engine
                .handle_job_failure(&job, &message)
                .await
                .map(|_| ()),
        };
        if let Err(err) = resolved {
            tracing::error!(
                worker_id = %self.worker_id,
                job_id = %job.id,
                error = %err,
                "failed to resolve job"
            );
        }
    }

    async fn register(&self) -> Result<(), WorkerError> {
        let now = self.engine.clock().epoch_ms();
        let record = WorkerRecord {
            worker_id: self.worker_id.clone(),
            pid: std::process::id() as i64,
            hostname: hostname(),
            started_at: now,
            last_heartbeat_at: now,
        };
        self.engine.store().register_worker(&record).await?;
        Ok(())
    }

    async fn emit_heartbeat(&self) {
        let now = self.engine.clock().epoch_ms();
        match self.engine.store().heartbeat(&self.worker_id, now).await {
            Ok(()) => {}
            Err(err) if err.is_not_found() => {
                // A stale sweep dropped our row while we were busy; put it back.
                tracing::warn!(worker_id = %self.worker_id, "registry row missing, re-registering");
                if let Err(err) = self.register().await {
                    tracing::error!(worker_id = %self.worker_id, error = %err, "re-register failed");
                }
            }
            Err(err) => {
                tracing::warn!(worker_id = %self.worker_id, error = %err, "heartbeat failed");
            }
        }
    }

    async fn sweep_stale(&self) {
        if let Err(err) = self.engine.recover_stale_workers().await {
            tracing::warn!(worker_id = %self.worker_id, error = %err, "stale sweep failed");
        }
    }
}

fn hostname() -> String {
    nix::unistd::gethostname()
        .ok()
        .and_then(|name| name.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
