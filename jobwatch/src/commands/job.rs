//! One-shot job commands

use anyhow::{Context, Result};
use colored::*;
use jobwatch_client::ClusterClient;
use jobwatch_core::domain::job::{Job, JobId, JobStatus};
use jobwatch_core::label::format_op;

use crate::config::Connection;
use crate::presenter::colorize_status;

/// Fetch and display a single job
pub async fn show_status(connection: &Connection, id: &str) -> Result<()> {
    let client = ClusterClient::new(&connection.server_url);
    let job_id = JobId::from(id);

    let job = client
        .get_job(&connection.context, &job_id)
        .await
        .with_context(|| format!("Failed to fetch job {}", job_id))?;

    print_job_details(&job);

    if !job.status.is_terminal() {
        println!(
            "\n{}",
            "Job is still active; use `watch` to follow it.".dimmed()
        );
    }

    Ok(())
}

/// Dismiss a job on the server
pub async fn clear_job(connection: &Connection, id: &str) -> Result<()> {
    let client = ClusterClient::new(&connection.server_url);
    let job_id = JobId::from(id);

    match client.clear_job(&connection.context, &job_id).await {
        Ok(()) => println!("{}", format!("✓ Cleared job {}", job_id).green()),
        Err(e) if e.is_not_found() => {
            println!("{}", format!("Job {} no longer exists.", job_id).yellow())
        }
        Err(e) => return Err(e).with_context(|| format!("Failed to clear job {}", job_id)),
    }

    Ok(())
}

/// Print detailed job information
fn print_job_details(job: &Job) {
    let op_index = job.active_op_index();

    println!("{}", "Job Details:".bold());
    println!("  ID:        {}", job.id.to_string().cyan());
    println!("  Status:    {}", colorize_status(job.status));
    if let Some(op_id) = job.op_id(op_index) {
        println!("  Operation: {}", format_op(op_id, job.status));
    }
    println!("  Step:      {}/{}", op_index + 1, job.ops.len().max(1));

    if job.status == JobStatus::Error {
        let reason = job
            .failure_reason(op_index)
            .unwrap_or_else(|| "Unknown error".to_string());
        println!("\n{}", "Error:".bold());
        println!("{}", reason.red());
    }

    let log = job.log(op_index);
    if !log.is_empty() {
        println!("\n{}", "Log:".bold());
        println!("{}", "─".repeat(80).dimmed());
        for line in log {
            let stamp = line
                .timestamp()
                .map(|ts| ts.format("%H:%M:%S").to_string())
                .unwrap_or_default();
            let serial = line.serial().map(|n| format!("#{}", n)).unwrap_or_default();
            match line.kind() {
                Some(kind) if kind != "message" => println!(
                    "{} {} [{}] {}",
                    stamp.dimmed(),
                    serial.dimmed(),
                    kind.yellow(),
                    line.message()
                ),
                _ => println!("{} {} {}", stamp.dimmed(), serial.dimmed(), line.message()),
            }
        }
        println!("{}", "─".repeat(80).dimmed());
    }
}
