//! Render layer
//!
//! Turns job records into incremental patches for a job list view. The
//! renderer owns what has already been drawn for every tracked job so each
//! poll only emits the difference, and a presenter applies the patches to
//! whatever surface is showing the jobs.

mod renderer;
mod state;

pub use renderer::Renderer;
pub use state::RenderState;

use crate::domain::job::{JobId, JobStatus};

/// One change to the job list view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOp {
    /// Add a block for a job seen for the first time
    CreateBlock {
        job_id: JobId,
        label: String,
        status: JobStatus,
    },
    /// Replace the header label of an existing block
    UpdateHeader { job_id: JobId, label: String },
    /// Replace the status class of an existing block
    SetStatus { job_id: JobId, status: JobStatus },
    /// Attach the dismissible error panel
    ShowError {
        job_id: JobId,
        reason: String,
        clear_url: String,
    },
    /// Re-enable action controls that are disabled while jobs run
    EnableActions,
    /// Append log lines to a block's log panel
    AppendLog {
        job_id: JobId,
        op_index: usize,
        lines: Vec<String>,
    },
    /// Drop a job's block
    RemoveBlock { job_id: JobId },
}

/// Surface that displays the job list
pub trait Presenter {
    fn apply(&mut self, op: &RenderOp);

    fn apply_all(&mut self, ops: &[RenderOp]) {
        for op in ops {
            self.apply(op);
        }
    }
}

/// Records the patch stream, for headless use and tests
impl Presenter for Vec<RenderOp> {
    fn apply(&mut self, op: &RenderOp) {
        self.push(op.clone());
    }
}
