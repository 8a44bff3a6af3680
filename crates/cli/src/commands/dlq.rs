// SPDX-License-Identifier: MIT

//! `queuectl dlq` - Dead letter queue management

use anyhow::Result;
use clap::{Args, Subcommand};
use qc_core::DlqId;

use crate::commands::engine_exit;
use crate::env;
use crate::exit_error::ExitError;
use crate::output::{format_or_json, format_timestamp, handle_list, OutputFormat};
use crate::table::{Column, Table};

#[derive(Args)]
pub struct DlqArgs {
    #[command(subcommand)]
    pub command: DlqCommand,
}

#[derive(Subcommand)]
pub enum DlqCommand {
    /// List dead-lettered jobs
    List {
        /// Maximum number of entries to show
        #[arg(long, value_name = "N", default_value_t = 50)]
        limit: i64,
    },
    /// Requeue a DLQ entry as a fresh job
    Retry {
        /// DLQ entry id
        #[arg(value_name = "JOB_ID")]
        id: String,
    },
    /// Delete old DLQ entries
    Purge {
        /// Only purge entries older than this many days
        #[arg(long = "older-than", value_name = "DAYS")]
        older_than: i64,
        /// Required confirmation; purge is irreversible
        #[arg(long)]
        force: bool,
    },
}

pub async fn handle(command: DlqCommand, format: OutputFormat) -> Result<()> {
    match command {
        DlqCommand::List { limit } => {
            let engine = env::open_engine().await?;
            let entries = engine.dlq_list(limit.max(0)).await.map_err(engine_exit)?;
            handle_list(format, &entries, "Dead letter queue is empty", |items, out| {
                let mut table = Table::new(vec![
                    Column::muted("DLQ ID"),
                    Column::left("ORIGINAL JOB"),
                    Column::left("ATTEMPTS"),
                    Column::left("MOVED AT"),
                    Column::left("LAST ERROR").with_max(48),
                    Column::left("COMMAND").with_max(32),
                ]);
                for entry in items {
                    table.row(vec![
                        entry.dlq_id.to_string(),
                        entry.original_job_id.to_string(),
                        entry.attempts.to_string(),
                        format_timestamp(entry.moved_at),
                        entry.last_error.clone().unwrap_or_else(|| "-".to_string()),
                        entry.command.clone(),
                    ]);
                }
                table.render(out);
            })
        }
        DlqCommand::Retry { id } => {
            let engine = env::open_engine().await?;
            let job = engine
                .dlq_retry(&DlqId::new(&id))
                .await
                .map_err(engine_exit)?;
            let obj = serde_json::json!({ "dlq_id": id, "job_id": job.id });
            format_or_json(format, &obj, || {
                println!("Requeued {} as job {}", id, job.id)
            })
        }
        DlqCommand::Purge { older_than, force } => {
            if older_than < 0 {
                return Err(ExitError::validation("--older-than must be >= 0").into());
            }
            if !force {
                return Err(ExitError::validation(
                    "refusing to purge the DLQ without --force",
                )
                .into());
            }
            let engine = env::open_engine().await?;
            let purged = engine.dlq_purge(older_than).await.map_err(engine_exit)?;
            let obj = serde_json::json!({ "purged": purged });
            format_or_json(format, &obj, || println!("Purged {purged} DLQ entries"))
        }
    }
}
