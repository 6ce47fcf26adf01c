//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod job;
mod watch;

pub use watch::WatchArgs;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Connection;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Follow the active jobs of the context until interrupted
    Watch(WatchArgs),
    /// Show the status of one job
    Status {
        /// Job id
        id: String,
    },
    /// Dismiss a failed job
    Clear {
        /// Job id
        id: String,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, connection: &Connection) -> Result<()> {
    connection.validate()?;

    match command {
        Commands::Watch(args) => watch::handle_watch(args, connection).await,
        Commands::Status { id } => job::show_status(connection, &id).await,
        Commands::Clear { id } => job::clear_job(connection, &id).await,
    }
}
