//! Caller callbacks fired on job transitions

use jobwatch_core::domain::job::JobId;
use tracing::{info, warn};

/// Something that went wrong while watching jobs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobFailure {
    /// The job listing could not be fetched
    Transport { message: String },
    /// A job is listed with status `error`
    Job { id: JobId, reason: Option<String> },
}

impl std::fmt::Display for JobFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobFailure::Transport { message } => write!(f, "transport failure: {}", message),
            JobFailure::Job { id, reason } => write!(
                f,
                "job {} failed: {}",
                id,
                reason.as_deref().unwrap_or("unknown reason")
            ),
        }
    }
}

/// Hooks invoked by the poller
pub trait JobCallbacks {
    /// A job finished, either reported as `success` or gone from the listing
    fn on_resolved(&mut self, job_id: &JobId);

    /// A transport error happened or a job is in error
    fn on_failed(&mut self, failure: &JobFailure);
}

/// Callbacks that report transitions through tracing and keep totals
#[derive(Debug, Default, Clone)]
pub struct LoggingCallbacks {
    pub resolved: usize,
    pub failures: usize,
}

impl JobCallbacks for LoggingCallbacks {
    fn on_resolved(&mut self, job_id: &JobId) {
        self.resolved += 1;
        info!("Job {} resolved", job_id);
    }

    fn on_failed(&mut self, failure: &JobFailure) {
        self.failures += 1;
        warn!("{}", failure);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_display() {
        let failure = JobFailure::Job {
            id: JobId::from("12"),
            reason: Some("Out of memory".to_string()),
        };
        assert_eq!(failure.to_string(), "job 12 failed: Out of memory");

        let failure = JobFailure::Job {
            id: JobId::from("12"),
            reason: None,
        };
        assert_eq!(failure.to_string(), "job 12 failed: unknown reason");
    }

    #[test]
    fn test_logging_callbacks_count() {
        let mut callbacks = LoggingCallbacks::default();
        callbacks.on_resolved(&JobId::from("1"));
        callbacks.on_failed(&JobFailure::Transport {
            message: "connection refused".to_string(),
        });

        assert_eq!(callbacks.resolved, 1);
        assert_eq!(callbacks.failures, 1);
    }
}
