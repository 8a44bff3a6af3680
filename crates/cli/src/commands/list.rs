// SPDX-License-Identifier: MIT

//! `queuectl list` - List jobs

use anyhow::Result;
use clap::Args;
use qc_core::JobState;

use crate::commands::engine_exit;
use crate::env;
use crate::exit_error::ExitError;
use crate::output::{format_timestamp, handle_list, OutputFormat};
use crate::table::{Column, Table};

#[derive(Args)]
pub struct ListArgs {
    /// Filter by state (pending|processing|completed|failed|dead)
    #[arg(long, value_name = "S")]
    pub state: Option<String>,

    /// Maximum number of jobs to show
    #[arg(long, value_name = "N", default_value_t = 50)]
    pub limit: i64,
}

pub async fn handle(args: ListArgs, format: OutputFormat) -> Result<()> {
    let state = match args.state.as_deref() {
        Some(raw) => Some(
            raw.parse::<JobState>()
                .map_err(ExitError::validation)?,
        ),
        None => None,
    };

    let engine = env::open_engine().await?;
    let jobs = engine
        .list_jobs(state, args.limit.max(0))
        .await
        .map_err(engine_exit)?;

    handle_list(format, &jobs, "No jobs found", |items, out| {
        let mut table = Table::new(vec![
            Column::muted("ID"),
            Column::status("STATE"),
            Column::left("PRI"),
            Column::left("ATTEMPTS"),
            Column::left("NEXT RUN"),
            Column::left("WORKER"),
            Column::left("COMMAND").with_max(40),
        ]);
        for job in items {
            table.row(vec![
                job.id.to_string(),
                job.state.to_string(),
                job.priority.to_string(),
                format!("{}/{}", job.attempts, job.max_retries + 1),
                format_timestamp(job.next_run_at),
                job.worker_id
                    .as_ref()
                    .map(|w| w.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                job.command.clone(),
            ]);
        }
        table.render(out);
    })
}
