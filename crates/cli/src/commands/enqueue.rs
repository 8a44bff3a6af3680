// SPDX-License-Identifier: MIT

//! `queuectl enqueue` - Add a job to the queue

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use qc_core::JobSpec;

use crate::commands::engine_exit;
use crate::env;
use crate::exit_error::ExitError;
use crate::output::{format_or_json, OutputFormat};

#[derive(Args)]
pub struct EnqueueArgs {
    /// Job specification as a JSON object
    #[arg(value_name = "JSON", conflicts_with_all = ["file", "command"])]
    pub spec: Option<String>,

    /// Read the JSON job specification from a file
    #[arg(long, value_name = "PATH", conflicts_with = "command")]
    pub file: Option<PathBuf>,

    /// Shell command to run
    #[arg(long, value_name = "STR")]
    pub command: Option<String>,

    /// Job id (generated when omitted)
    #[arg(long, requires = "command")]
    pub id: Option<String>,

    /// Higher runs first (default 0)
    #[arg(long, requires = "command", allow_negative_numbers = true)]
    pub priority: Option<i64>,

    /// Retries after the first attempt (default from config)
    #[arg(long = "max-retries", requires = "command")]
    pub max_retries: Option<i64>,

    /// Kill the job after this many seconds
    #[arg(long = "timeout", value_name = "SECONDS", requires = "command")]
    pub timeout: Option<i64>,

    /// Earliest start time, RFC 3339 (e.g. 2026-03-01T00:00:00Z)
    #[arg(long = "run-at", value_name = "ISO8601", requires = "command")]
    pub run_at: Option<String>,
}

pub async fn handle(args: EnqueueArgs, format: OutputFormat) -> Result<()> {
    let spec = build_spec(&args)?;
    let engine = env::open_engine().await?;
    let job = engine.enqueue(&spec).await.map_err(engine_exit)?;

    let obj = serde_json::json!({
        "job_id": job.id,
        "state": job.state,
        "priority": job.priority,
        "max_retries": job.max_retries,
    });
    format_or_json(format, &obj, || println!("Enqueued job {}", job.id))
}

/// Assemble the job spec from whichever input shape was given: positional
/// JSON, `--file`, or `--command` plus flags.
fn build_spec(args: &EnqueueArgs) -> Result<JobSpec> {
    if let Some(raw) = &args.spec {
        return JobSpec::from_json(raw).map_err(|e| ExitError::validation(e.to_string()).into());
    }

    if let Some(path) = &args.file {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ExitError::validation(format!("could not read {}: {e}", path.display()))
        })?;
        return JobSpec::from_json(&raw).map_err(|e| ExitError::validation(e.to_string()).into());
    }

    if args.command.is_some() {
        return Ok(JobSpec {
            id: args.id.clone(),
            command: args.command.clone(),
            priority: args.priority,
            max_retries: args.max_retries,
            timeout_seconds: args.timeout,
            run_at: args.run_at.clone(),
        });
    }

    Err(ExitError::validation("provide a JSON spec, --file, or --command").into())
}

#[cfg(test)]
#[path = "enqueue_tests.rs"]
mod tests;
