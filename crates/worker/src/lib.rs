// SPDX-License-Identifier: MIT

//! Worker runtime and supervisor.
//!
//! A worker process runs one [`WorkerRuntime`]: register, then
//! claim-execute-resolve against the shared store until shutdown, emitting
//! heartbeats and sweeping for stale peers along the way. The
//! [`supervisor`] spawns N such processes, forwards termination signals,
//! and reaps them.

mod execute;
mod runtime;
mod supervisor;

pub use execute::ExecOutcome;
pub use runtime::WorkerRuntime;
pub use supervisor::{stop_workers, supervise, SuperviseOutcome};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error(transparent)]
    Engine(#[from] qc_engine::EngineError),

    #[error(transparent)]
    Store(#[from] qc_storage::StoreError),

    #[error("failed to spawn worker process: {0}")]
    Spawn(std::io::Error),

    #[error("failed to install signal handler: {0}")]
    Signal(std::io::Error),
}

/// Cancellation token wired to SIGTERM and SIGINT.
///
/// The returned token is cancelled on the first signal; workers finish the
/// job in flight and exit, per the cooperative shutdown contract.
pub fn shutdown_token() -> Result<tokio_util::sync::CancellationToken, WorkerError> {
    use tokio::signal::unix::{signal, SignalKind};

    let token = tokio_util::sync::CancellationToken::new();
    let mut sigterm = signal(SignalKind::terminate()).map_err(WorkerError::Signal)?;
    let mut sigint = signal(SignalKind::interrupt()).map_err(WorkerError::Signal)?;

    let handle = token.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = sigterm.recv() => tracing::info!("received SIGTERM, shutting down"),
            _ = sigint.recv() => tracing::info!("received SIGINT, shutting down"),
        }
        handle.cancel();
    });

    Ok(token)
}
