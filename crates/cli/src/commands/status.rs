// SPDX-License-Identifier: MIT

//! `queuectl status` - Queue counts and live workers

use anyhow::Result;
use qc_core::Clock;

use crate::color;
use crate::commands::engine_exit;
use crate::env;
use crate::output::{format_age, format_or_json, OutputFormat};
use crate::table::{Column, Table};

pub async fn handle(format: OutputFormat) -> Result<()> {
    let engine = env::open_engine().await?;
    let report = engine.status().await.map_err(engine_exit)?;
    let now = engine.clock().epoch_ms();

    format_or_json(format, &report, || {
        println!("{}", color::header("Jobs:"));
        for entry in &report.counts {
            println!("  {:<12} {}", entry.state.to_string(), entry.count);
        }

        println!();
        if report.live_workers.is_empty() {
            println!("{} none", color::header("Workers:"));
            return;
        }
        println!(
            "{} {} live",
            color::header("Workers:"),
            report.live_workers.len()
        );
        let mut out = String::new();
        let mut table = Table::new(vec![
            Column::muted("WORKER"),
            Column::left("PID"),
            Column::left("HOST"),
            Column::left("HEARTBEAT"),
        ]);
        for worker in &report.live_workers {
            table.row(vec![
                worker.worker_id.to_string(),
                worker.pid.to_string(),
                worker.hostname.clone(),
                format!("{} ago", format_age(now - worker.last_heartbeat_at)),
            ]);
        }
        table.render(&mut out);
        print!("{out}");
    })
}
