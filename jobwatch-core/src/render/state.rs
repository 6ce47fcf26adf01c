//! Per-job render state

use std::collections::HashMap;

use crate::domain::job::JobStatus;

/// What has already been drawn for one job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderState {
    pub(crate) status: JobStatus,
    pub(crate) label: String,
    /// Log lines already appended, keyed by sub-operation index
    pub(crate) watermarks: HashMap<usize, usize>,
    pub(crate) error_shown: bool,
    pub(crate) failure_notified: bool,
}

impl RenderState {
    pub(crate) fn new(status: JobStatus, label: String) -> Self {
        Self {
            status,
            label,
            watermarks: HashMap::new(),
            error_shown: false,
            failure_notified: false,
        }
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Number of log lines drawn for a sub-operation
    pub fn watermark(&self, op_index: usize) -> usize {
        self.watermarks.get(&op_index).copied().unwrap_or(0)
    }

    pub fn error_shown(&self) -> bool {
        self.error_shown
    }

    pub fn failure_notified(&self) -> bool {
        self.failure_notified
    }

    /// Raises the watermark; it never moves backwards
    pub(crate) fn advance_watermark(&mut self, op_index: usize, count: usize) {
        let mark = self.watermarks.entry(op_index).or_insert(0);
        *mark = (*mark).max(count);
    }
}
