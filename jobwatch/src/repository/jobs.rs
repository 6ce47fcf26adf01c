//! Jobs repository
//!
//! Handles communication with the cluster manager for job operations:
//! - Fetching the active job listing of one object
//! - Clearing (dismissing) a failed job

use anyhow::{Context, Result};
use async_trait::async_trait;
use jobwatch_client::ClusterClient;
use jobwatch_core::domain::job::{Job, JobId};
use tracing::debug;

/// Repository trait for job operations against the cluster manager
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Fetches the jobs that are still running or failed
    async fn fetch_active_jobs(&self) -> Result<Vec<Job>>;

    /// Dismisses a job
    ///
    /// A job the server no longer knows about counts as cleared.
    async fn clear_job(&self, job_id: &JobId) -> Result<()>;
}

/// HTTP implementation of JobRepository bound to one object's jobs
pub struct HttpJobRepository {
    client: ClusterClient,
    jobs_path: String,
    context: String,
}

impl HttpJobRepository {
    /// Creates a new HTTP job repository
    ///
    /// # Arguments
    /// * `client` - Client for the web application
    /// * `jobs_path` - Path of the active job listing
    /// * `context` - Path of the object owning the jobs
    pub fn new(client: ClusterClient, jobs_path: String, context: String) -> Self {
        Self {
            client,
            jobs_path,
            context,
        }
    }
}

#[async_trait]
impl JobRepository for HttpJobRepository {
    async fn fetch_active_jobs(&self) -> Result<Vec<Job>> {
        let jobs = self
            .client
            .list_active_jobs(&self.jobs_path)
            .await
            .with_context(|| format!("Failed to fetch active jobs from {}", self.jobs_path))?;

        Ok(jobs)
    }

    async fn clear_job(&self, job_id: &JobId) -> Result<()> {
        let result = self.client.clear_job(&self.context, job_id).await;
        clear_outcome(job_id, result)
    }
}

/// A job the server no longer knows about counts as cleared
fn clear_outcome(job_id: &JobId, result: jobwatch_client::Result<()>) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(e) if e.is_not_found() => {
            debug!("Job {} already gone from the server", job_id);
            Ok(())
        }
        Err(e) => Err(e).with_context(|| format!("Failed to clear job {}", job_id)),
    }
}
