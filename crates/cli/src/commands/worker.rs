// SPDX-License-Identifier: MIT

//! `queuectl worker` - Worker pool management

use anyhow::Result;
use clap::{Args, Subcommand};
use qc_worker::{shutdown_token, stop_workers, supervise, SuperviseOutcome, WorkerRuntime};

use crate::env;
use crate::exit_error::{ExitError, EXIT_INTERNAL};
use crate::output::{format_or_json, OutputFormat};

#[derive(Args)]
pub struct WorkerArgs {
    #[command(subcommand)]
    pub command: WorkerCommand,
}

#[derive(Subcommand)]
pub enum WorkerCommand {
    /// Start a pool of worker processes and supervise them
    Start {
        /// Number of worker processes
        #[arg(long, value_name = "N", default_value_t = 1)]
        count: u32,
        /// Spawn the workers and return instead of supervising
        #[arg(long)]
        detach: bool,
    },
    /// Signal every registered worker to shut down
    Stop,
    /// Run a single worker loop in this process (supervisor child)
    #[command(hide = true)]
    Run,
}

pub async fn handle(command: WorkerCommand, format: OutputFormat) -> Result<()> {
    match command {
        WorkerCommand::Start { count, detach } => start(count, detach, format).await,
        WorkerCommand::Stop => stop(format).await,
        WorkerCommand::Run => run().await,
    }
}

async fn start(count: u32, detach: bool, format: OutputFormat) -> Result<()> {
    if count == 0 {
        return Err(ExitError::validation("--count must be at least 1").into());
    }

    let engine = env::open_engine().await?;
    let outcome = supervise(&engine, &env::db_path(), count, detach)
        .await
        .map_err(|err| ExitError::new(EXIT_INTERNAL, err.to_string()))?;

    match outcome {
        SuperviseOutcome::Detached { pids } => {
            let obj = serde_json::json!({ "detached": true, "pids": pids });
            format_or_json(format, &obj, || {
                println!(
                    "Started {} worker(s): {}",
                    pids.len(),
                    pids.iter()
                        .map(|p| p.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
        }
        SuperviseOutcome::Drained => {
            let obj = serde_json::json!({ "detached": false, "outcome": "drained" });
            format_or_json(format, &obj, || println!("All workers exited"))
        }
        SuperviseOutcome::Signalled => {
            let obj = serde_json::json!({ "detached": false, "outcome": "shutdown" });
            format_or_json(format, &obj, || println!("Workers shut down"))
        }
    }
}

async fn stop(format: OutputFormat) -> Result<()> {
    let engine = env::open_engine().await?;
    let signalled = stop_workers(&engine)
        .await
        .map_err(|err| ExitError::new(EXIT_INTERNAL, err.to_string()))?;

    let obj = serde_json::json!({ "signalled": signalled });
    format_or_json(format, &obj, || {
        if signalled == 0 {
            println!("No registered workers");
        } else {
            println!("Signalled {signalled} worker(s)");
        }
    })
}

/// Entry point of a supervisor-spawned worker process.
async fn run() -> Result<()> {
    let engine = env::open_engine().await?;
    let shutdown =
        shutdown_token().map_err(|err| ExitError::new(EXIT_INTERNAL, err.to_string()))?;
    let runtime = WorkerRuntime::new(engine, shutdown);
    runtime
        .run()
        .await
        .map_err(|err| ExitError::new(EXIT_INTERNAL, err.to_string()))?;
    Ok(())
}
