//! Watcher configuration
//!
//! Defines the parameters of a job watch: where the cluster manager lives,
//! which object's jobs to follow, and how fast to poll.

use std::time::Duration;

/// Default interval while any job is active
pub const DEFAULT_FAST_INTERVAL: Duration = Duration::from_millis(3_000);

/// Default interval while no job is active
pub const DEFAULT_SLOW_INTERVAL: Duration = Duration::from_millis(30_000);

/// How often a job that stays in error is reported to the failure callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ErrorNotify {
    /// Report on every poll cycle the job is still listed as failed
    #[default]
    EveryPoll,
    /// Report the first time only
    Once,
}

/// Connection settings shared by every command
#[derive(Debug, Clone)]
pub struct Connection {
    /// Base URL of the web application (e.g., "http://localhost:8000")
    pub server_url: String,

    /// Path of the object whose jobs are followed (e.g., "/cluster/main")
    pub context: String,
}

impl Connection {
    pub fn new(server_url: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            context: context.into().trim_end_matches('/').to_string(),
        }
    }

    /// Validates the connection settings
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server_url.is_empty() {
            anyhow::bail!("server_url cannot be empty");
        }

        if !self.server_url.starts_with("http://") && !self.server_url.starts_with("https://") {
            anyhow::bail!("server_url must start with http:// or https://");
        }

        if !self.context.starts_with('/') {
            anyhow::bail!("context must be a path starting with '/'");
        }

        Ok(())
    }
}

/// Poller configuration
///
/// Built once per watch; the intervals can be tuned for slow links or busy
/// clusters.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub connection: Connection,

    /// Path listing the active jobs of the context
    pub jobs_path: String,

    /// Cadence while the active job list is non-empty
    pub fast_interval: Duration,

    /// Cadence while the active job list is empty
    pub slow_interval: Duration,

    pub error_notify: ErrorNotify,

    /// Stop watching after the first empty job listing
    pub exit_when_idle: bool,
}

impl PollerConfig {
    /// Creates a configuration with defaults
    pub fn new(connection: Connection) -> Self {
        let jobs_path = format!("{}/jobs/status/", connection.context);
        Self {
            connection,
            jobs_path,
            fast_interval: DEFAULT_FAST_INTERVAL,
            slow_interval: DEFAULT_SLOW_INTERVAL,
            error_notify: ErrorNotify::default(),
            exit_when_idle: false,
        }
    }

    pub fn with_jobs_path(mut self, jobs_path: impl Into<String>) -> Self {
        self.jobs_path = jobs_path.into();
        self
    }

    pub fn with_intervals(mut self, fast: Duration, slow: Duration) -> Self {
        self.fast_interval = fast;
        self.slow_interval = slow;
        self
    }

    pub fn with_error_notify(mut self, error_notify: ErrorNotify) -> Self {
        self.error_notify = error_notify;
        self
    }

    pub fn with_exit_when_idle(mut self, exit_when_idle: bool) -> Self {
        self.exit_when_idle = exit_when_idle;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        self.connection.validate()?;

        if self.jobs_path.is_empty() {
            anyhow::bail!("jobs_path cannot be empty");
        }

        if self.fast_interval.is_zero() {
            anyhow::bail!("fast_interval must be greater than 0");
        }

        if self.slow_interval.is_zero() {
            anyhow::bail!("slow_interval must be greater than 0");
        }

        if self.fast_interval > self.slow_interval {
            anyhow::bail!("fast_interval cannot be longer than slow_interval");
        }

        Ok(())
    }
}
