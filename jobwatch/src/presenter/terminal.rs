//! Terminal presenter
//!
//! Prints every render operation as a line, prefixed with the job it
//! belongs to. Blocks cannot be redrawn in place on a scrolling terminal,
//! so header and status changes are printed as new lines.

use std::io::Write;

use colored::*;
use jobwatch_core::domain::job::{JobId, JobStatus};
use jobwatch_core::render::{Presenter, RenderOp};
use tracing::debug;

/// Presenter writing to a terminal (or any writer)
pub struct TerminalPresenter<W: Write> {
    out: W,
}

impl TerminalPresenter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> TerminalPresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[allow(dead_code)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: String) {
        if let Err(e) = writeln!(self.out, "{}", text) {
            debug!("Failed to write to terminal: {}", e);
        }
    }
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    fn apply(&mut self, op: &RenderOp) {
        match op {
            RenderOp::CreateBlock {
                job_id,
                label,
                status,
            } => {
                let text = format!("{} {}", tag(job_id), colorize_label(label, *status));
                self.line(format!("{} {}", "▸".cyan(), text));
            }
            RenderOp::UpdateHeader { job_id, label } => {
                self.line(format!("  {} {}", tag(job_id), label.bold()));
            }
            RenderOp::SetStatus { job_id, status } => {
                self.line(format!(
                    "  {} status: {}",
                    tag(job_id),
                    colorize_status(*status)
                ));
            }
            RenderOp::ShowError {
                job_id,
                reason,
                clear_url,
            } => {
                self.line(format!("  {} {} {}", tag(job_id), "✗".red(), reason.red()));
                self.line(format!(
                    "  {} {}",
                    tag(job_id),
                    format!("type `clear {}` to dismiss ({})", job_id, clear_url).dimmed()
                ));
            }
            RenderOp::EnableActions => {
                debug!("Actions enabled");
            }
            RenderOp::AppendLog { job_id, lines, .. } => {
                for line in lines {
                    self.line(format!("  {} {} {}", tag(job_id), "│".dimmed(), line));
                }
            }
            RenderOp::RemoveBlock { job_id } => {
                self.line(format!("{} {} {}", "▪".dimmed(), tag(job_id), "done".dimmed()));
            }
        }
    }
}

fn tag(job_id: &JobId) -> ColoredString {
    format!("[job {}]", job_id).dimmed()
}

fn colorize_label(label: &str, status: JobStatus) -> ColoredString {
    match status {
        JobStatus::Error => label.red().bold(),
        JobStatus::Running => label.cyan().bold(),
        _ => label.bold(),
    }
}

/// Colorize job status for display
pub fn colorize_status(status: JobStatus) -> ColoredString {
    let status_str = status.as_str();
    match status {
        JobStatus::Queued | JobStatus::Waiting => status_str.yellow(),
        JobStatus::Running => status_str.cyan(),
        JobStatus::Success => status_str.green(),
        JobStatus::Error => status_str.red(),
        JobStatus::Canceling | JobStatus::Canceled | JobStatus::Unknown => status_str.dimmed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(ops: &[RenderOp]) -> String {
        colored::control::set_override(false);
        let mut presenter = TerminalPresenter::new(Vec::new());
        presenter.apply_all(ops);
        String::from_utf8(presenter.into_inner()).unwrap()
    }

    #[test]
    fn test_block_lifecycle_output() {
        let id = JobId::from("7");
        let output = render(&[
            RenderOp::CreateBlock {
                job_id: id.clone(),
                label: "Do Thing: Running".to_string(),
                status: JobStatus::Running,
            },
            RenderOp::AppendLog {
                job_id: id.clone(),
                op_index: 0,
                lines: vec!["step1 done".to_string(), "step2 done".to_string()],
            },
            RenderOp::RemoveBlock { job_id: id },
        ]);

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("[job 7] Do Thing: Running"));
        assert!(lines[1].ends_with("step1 done"));
        assert!(lines[2].ends_with("step2 done"));
        assert!(lines[3].contains("[job 7] done"));
    }

    #[test]
    fn test_error_output_names_clear_command() {
        let output = render(&[
            RenderOp::ShowError {
                job_id: JobId::from("3"),
                reason: "Disk full".to_string(),
                clear_url: "/cluster/main/job/3/clear/".to_string(),
            },
            RenderOp::EnableActions,
        ]);

        assert!(output.contains("Disk full"));
        assert!(output.contains("clear 3"));
        assert_eq!(output.lines().count(), 2);
    }
}
