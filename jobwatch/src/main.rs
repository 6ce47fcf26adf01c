//! Jobwatch
//!
//! Follows the asynchronous jobs of a Ganeti cluster manager from the
//! terminal.
//!
//! Architecture:
//! - Configuration: connection and poll settings from flags or environment
//! - Repositories: HTTP communication with the web application
//! - Scheduler: adaptive job polling, rendering and callbacks
//! - Presenters: display of the rendered job list
//!
//! The watcher polls the active job listing of one object (a cluster, node
//! or virtual machine) quickly while jobs run and slowly while none do.

mod commands;
mod config;
mod presenter;
mod repository;
mod scheduler;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::{Commands, handle_command};
use crate::config::Connection;

#[derive(Parser)]
#[command(name = "jobwatch")]
#[command(about = "Follow Ganeti cluster manager jobs", long_about = None)]
struct Cli {
    /// Base URL of the web application
    #[arg(
        long,
        env = "JOBWATCH_SERVER_URL",
        default_value = "http://localhost:8000"
    )]
    server_url: String,

    /// Path of the object whose jobs to follow (e.g. /cluster/main)
    #[arg(long, env = "JOBWATCH_CONTEXT")]
    context: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr, the job list to stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jobwatch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let connection = Connection::new(cli.server_url, cli.context);

    handle_command(cli.command, &connection).await
}
