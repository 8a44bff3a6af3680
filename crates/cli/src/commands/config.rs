// SPDX-License-Identifier: MIT

//! `queuectl config` - Configuration registry

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::commands::engine_exit;
use crate::env;
use crate::output::{format_or_json, handle_list, OutputFormat};
use crate::table::{Column, Table};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show every declared key with its effective value
    List,
    /// Print one key's effective value
    Get {
        #[arg(value_name = "KEY")]
        key: String,
    },
    /// Set one key (validated against the key's schema)
    Set {
        #[arg(value_name = "KEY")]
        key: String,
        #[arg(value_name = "VALUE")]
        value: String,
    },
}

pub async fn handle(command: ConfigCommand, format: OutputFormat) -> Result<()> {
    let engine = env::open_engine().await?;
    match command {
        ConfigCommand::List => {
            let entries = engine.config_list().await.map_err(engine_exit)?;
            handle_list(format, &entries, "No configuration", |items, out| {
                let mut table = Table::new(vec![
                    Column::left("KEY"),
                    Column::left("VALUE"),
                    Column::muted("SOURCE"),
                ]);
                for entry in items {
                    table.row(vec![
                        entry.key.clone(),
                        entry.value.clone(),
                        if entry.default { "default" } else { "set" }.to_string(),
                    ]);
                }
                table.render(out);
            })
        }
        ConfigCommand::Get { key } => {
            let value = engine.config_get(&key).await.map_err(engine_exit)?;
            let obj = serde_json::json!({ "key": key, "value": value });
            format_or_json(format, &obj, || println!("{value}"))
        }
        ConfigCommand::Set { key, value } => {
            engine.config_set(&key, &value).await.map_err(engine_exit)?;
            let obj = serde_json::json!({ "key": key, "value": value });
            format_or_json(format, &obj, || println!("{key} = {value}"))
        }
    }
}
