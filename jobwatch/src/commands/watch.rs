//! Watch command
//!
//! Runs the job poller against one context and prints the job list as it
//! changes. Lines typed on stdin are read as commands (`clear <id>`, `quit`).

use std::io::BufRead;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use colored::*;
use jobwatch_client::ClusterClient;
use jobwatch_core::domain::job::JobId;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::{Connection, ErrorNotify, PollerConfig};
use crate::presenter::TerminalPresenter;
use crate::repository::HttpJobRepository;
use crate::scheduler::{JobPoller, LoggingCallbacks, PollerCommand};

/// Options of the watch command
#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Path of the active job listing [default: <context>/jobs/status/]
    #[arg(long, env = "JOBWATCH_JOBS_PATH")]
    pub jobs_path: Option<String>,

    /// Poll interval while jobs are active, in milliseconds
    #[arg(long, env = "JOBWATCH_FAST_INTERVAL_MS", default_value_t = 3_000)]
    pub fast_interval_ms: u64,

    /// Poll interval while no job is active, in milliseconds
    #[arg(long, env = "JOBWATCH_SLOW_INTERVAL_MS", default_value_t = 30_000)]
    pub slow_interval_ms: u64,

    /// How often a job stuck in error is reported
    #[arg(long, env = "JOBWATCH_ERROR_NOTIFY", value_enum, default_value_t = ErrorNotify::EveryPoll)]
    pub error_notify: ErrorNotify,

    /// Exit as soon as no job is active
    #[arg(long)]
    pub exit_when_idle: bool,
}

impl WatchArgs {
    /// Builds the poller configuration from the command line
    pub fn into_config(self, connection: &Connection) -> PollerConfig {
        let mut config = PollerConfig::new(connection.clone())
            .with_intervals(
                Duration::from_millis(self.fast_interval_ms),
                Duration::from_millis(self.slow_interval_ms),
            )
            .with_error_notify(self.error_notify)
            .with_exit_when_idle(self.exit_when_idle);

        if let Some(jobs_path) = self.jobs_path {
            config = config.with_jobs_path(jobs_path);
        }

        config
    }
}

/// Run the poller until Ctrl-C, `quit`, or idle
pub async fn handle_watch(args: WatchArgs, connection: &Connection) -> Result<()> {
    let config = args.into_config(connection);
    config.validate()?;

    let client = ClusterClient::new(&connection.server_url);
    let repository = Arc::new(HttpJobRepository::new(
        client,
        config.jobs_path.clone(),
        connection.context.clone(),
    ));

    let (commands_tx, commands_rx) = mpsc::channel(16);
    spawn_stdin_reader(commands_tx.clone());
    spawn_interrupt_handler(commands_tx);

    println!(
        "{}",
        format!("Watching jobs of {}{}", connection.server_url, connection.context).bold()
    );

    let mut presenter = TerminalPresenter::stdout();
    let mut poller = JobPoller::new(config, repository, LoggingCallbacks::default());
    poller.run(&mut presenter, commands_rx).await?;

    let totals = poller.callbacks();
    println!(
        "{}",
        format!(
            "{} job(s) resolved, {} failure report(s)",
            totals.resolved, totals.failures
        )
        .dimmed()
    );

    Ok(())
}

/// Parses one line typed by the user
fn parse_command(line: &str) -> Option<PollerCommand> {
    let mut words = line.split_whitespace();
    match (words.next(), words.next(), words.next()) {
        (Some("clear"), Some(id), None) => Some(PollerCommand::Clear(JobId::from(id))),
        (Some("quit" | "q" | "exit"), None, None) => Some(PollerCommand::Shutdown),
        _ => None,
    }
}

/// Reads user commands on a dedicated thread
///
/// Blocking stdin reads would otherwise keep the runtime from shutting down.
fn spawn_stdin_reader(commands: mpsc::Sender<PollerCommand>) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!("Failed to read stdin: {}", e);
                    break;
                }
            };

            if line.trim().is_empty() {
                continue;
            }

            match parse_command(&line) {
                Some(command) => {
                    if commands.blocking_send(command).is_err() {
                        break;
                    }
                }
                None => warn!("Unknown command {:?} (try `clear <id>` or `quit`)", line.trim()),
            }
        }
    });
}

fn spawn_interrupt_handler(commands: mpsc::Sender<PollerCommand>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted");
            let _ = commands.send(PollerCommand::Shutdown).await;
        }
    });
}
