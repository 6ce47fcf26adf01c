//! Job-related API endpoints

use jobwatch_core::domain::job::{Job, JobId};
use tracing::debug;

use crate::ClusterClient;
use crate::error::{ClientError, Result};

impl ClusterClient {
    // =============================================================================
    // Job Status
    // =============================================================================

    /// List the jobs of an object that are still running or failed
    ///
    /// # Arguments
    /// * `jobs_path` - Status listing path, e.g. "/cluster/main/jobs/status/"
    pub async fn list_active_jobs(&self, jobs_path: &str) -> Result<Vec<Job>> {
        let url = self.url(jobs_path);
        debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// Get the full status of a single job
    ///
    /// # Arguments
    /// * `context` - Path of the object owning the job, e.g. "/cluster/main"
    /// * `job_id` - The job id
    pub async fn get_job(&self, context: &str, job_id: &JobId) -> Result<Job> {
        let url = self.url(&job_path(context, job_id, "status"));
        debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response)
            .await
            .map_err(|e| missing_job(e, job_id))
    }

    /// Dismiss a job
    ///
    /// The server deletes the job record; the response body carries nothing
    /// of interest.
    ///
    /// # Arguments
    /// * `context` - Path of the object owning the job
    /// * `job_id` - The job id
    pub async fn clear_job(&self, context: &str, job_id: &JobId) -> Result<()> {
        let url = self.url(&job_path(context, job_id, "clear"));
        debug!("POST {}", url);
        let response = self.client.post(&url).send().await?;

        self.handle_empty_response(response).await
    }
}

/// Turns a 404 into `NotFound` naming the job
fn missing_job(error: ClientError, job_id: &JobId) -> ClientError {
    if error.is_not_found() {
        ClientError::NotFound(format!("job {}", job_id))
    } else {
        error
    }
}

/// Builds `<context>/job/<id>/<action>/`
pub(crate) fn job_path(context: &str, job_id: &JobId, action: &str) -> String {
    format!(
        "{}/job/{}/{}/",
        context.trim_end_matches('/'),
        job_id,
        action
    )
}
