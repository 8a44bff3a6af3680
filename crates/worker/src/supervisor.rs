// SPDX-License-Identifier: MIT

//! Supervision of a pool of worker processes.
//!
//! The supervisor runs in the foreground: it spawns N children executing
//! the hidden `worker run` subcommand of the current binary, then waits
//! for a termination signal (forward SIGTERM, grace, SIGKILL) or for all
//! children to exit on their own.

use std::path::Path;
use std::time::{Duration, Instant};

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use qc_core::SystemClock;
use qc_engine::Engine;
use tokio::process::Command;

use crate::WorkerError;

/// How long children get between SIGTERM and SIGKILL.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Why a foreground supervision run returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuperviseOutcome {
    /// `--detach`: children were spawned and left running.
    Detached { pids: Vec<u32> },
    /// All children exited by themselves.
    Drained,
    /// A termination signal arrived and the pool was shut down.
    Signalled,
}

/// Spawn `count` worker processes and supervise them.
///
/// Runs the startup orphan sweep first, so jobs stranded in `processing`
/// by a previous crash return to `pending` before the new pool starts.
pub async fn supervise(
    engine: &Engine<SystemClock>,
    db_path: &Path,
    count: u32,
    detach: bool,
) -> Result<SuperviseOutcome, WorkerError> {
    engine.recover_stale_workers().await?;

    let exe = std::env::current_exe().map_err(WorkerError::Spawn)?;
    let mut children = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let mut command = Command::new(&exe);
        command
            .arg("worker")
            .arg("run")
            .env("QUEUECTL_DB", db_path);
        if detach {
            command
                .stdin(std::process::Stdio::null())
                .stdout(std::process::Stdio::null())
                .stderr(std::process::Stdio::null());
        }
        let child = command.spawn().map_err(WorkerError::Spawn)?;
        tracing::info!(pid = child.id(), "worker process spawned");
        children.push(child);
    }

    let pids: Vec<u32> = children.iter().filter_map(|c| c.id()).collect();
    if detach {
        // Children keep running; dropping the handles does not kill them.
        return Ok(SuperviseOutcome::Detached { pids });
    }

    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        .map_err(WorkerError::Signal)?;
    let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())
        .map_err(WorkerError::Signal)?;

    let drained = tokio::select! {
        _ = sigterm.recv() => false,
        _ = sigint.recv() => false,
        _ = wait_all(&mut children) => true,
    };

    if drained {
        tracing::info!("all worker processes exited");
        return Ok(SuperviseOutcome::Drained);
    }

    tracing::info!("forwarding SIGTERM to {} worker(s)", pids.len());
    for pid in &pids {
        kill(Pid::from_raw(*pid as i32), Signal::SIGTERM).ok();
    }

    let deadline = Instant::now() + SHUTDOWN_GRACE;
    for child in children.iter_mut() {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if tokio::time::timeout(remaining, child.wait()).await.is_err() {
            tracing::warn!(pid = child.id(), "worker survived grace period, killing");
            child.kill().await.ok();
        }
    }

    Ok(SuperviseOutcome::Signalled)
}

async fn wait_all(children: &mut [tokio::process::Child]) {
    for child in children.iter_mut() {
        child.wait().await.ok();
    }
}

/// Signal every registered worker to shut down, from the registry's
/// recorded pids. Returns how many processes were signalled.
pub async fn stop_workers(engine: &Engine<SystemClock>) -> Result<usize, WorkerError> {
    let workers = engine.store().list_workers().await?;
    let mut signalled = 0;
    for worker in workers {
        match kill(Pid::from_raw(worker.pid as i32), Signal::SIGTERM) {
            Ok(()) => {
                tracing::info!(worker_id = %worker.worker_id, pid = worker.pid, "sent SIGTERM");
                signalled += 1;
            }
            Err(errno) => {
                tracing::warn!(
                    worker_id = %worker.worker_id,
                    pid = worker.pid,
                    error = %errno,
                    "could not signal worker; it may have already exited"
                );
            }
        }
    }
    Ok(signalled)
}
