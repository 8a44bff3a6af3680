// SPDX-License-Identifier: MIT

//! `queuectl` - persistent background job queue
//!
//! Thin command dispatcher: every subcommand resolves to an engine or
//! supervisor operation; formatting and exit-code mapping happen here.

mod color;
mod commands;
mod env;
mod exit_error;
mod output;
mod table;

use clap::{Parser, Subcommand};

use crate::exit_error::ExitError;
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "queuectl",
    version,
    about = "Persistent background job queue",
    styles = color::styles()
)]
struct Cli {
    /// Emit JSON instead of human-readable output
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a job to the queue
    Enqueue(commands::enqueue::EnqueueArgs),
    /// List jobs
    List(commands::list::ListArgs),
    /// Show queue counts and live workers
    Status,
    /// Start, stop, or run worker processes
    Worker(commands::worker::WorkerArgs),
    /// Inspect and manage the dead letter queue
    Dlq(commands::dlq::DlqArgs),
    /// Read and write configuration
    Config(commands::config::ConfigArgs),
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    if let Err(err) = dispatch(cli.command, format).await {
        match err.downcast_ref::<ExitError>() {
            Some(exit) => {
                eprintln!("error: {exit}");
                std::process::exit(exit.code);
            }
            None => {
                eprintln!("error: {err:#}");
                std::process::exit(exit_error::EXIT_INTERNAL);
            }
        }
    }
}

async fn dispatch(command: Commands, format: OutputFormat) -> anyhow::Result<()> {
    match command {
        Commands::Enqueue(args) => commands::enqueue::handle(args, format).await,
        Commands::List(args) => commands::list::handle(args, format).await,
        Commands::Status => commands::status::handle(format).await,
        Commands::Worker(args) => commands::worker::handle(args.command, format).await,
        Commands::Dlq(args) => commands::dlq::handle(args.command, format).await,
        Commands::Config(args) => commands::config::handle(args.command, format).await,
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}
