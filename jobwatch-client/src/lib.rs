//! Jobwatch HTTP Client
//!
//! A small, type-safe HTTP client for the job-status endpoints of a Ganeti
//! cluster manager web application.
//!
//! Every object that can own jobs (a cluster, a node, a virtual machine) is
//! addressed by a context path such as `/cluster/main`. Job endpoints hang
//! off that path.
//!
//! # Example
//!
//! ```no_run
//! use jobwatch_client::ClusterClient;
//!
//! async fn example() -> jobwatch_client::Result<()> {
//!     let client = ClusterClient::new("http://localhost:8000");
//!
//!     let jobs = client.list_active_jobs("/cluster/main/jobs/status/").await?;
//!     println!("{} active job(s)", jobs.len());
//!     Ok(())
//! }
//! ```

pub mod error;
mod jobs;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use jobwatch_core::domain::job::{Job, JobId};

use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the cluster manager's job endpoints
#[derive(Debug, Clone)]
pub struct ClusterClient {
    /// Base URL of the web application (e.g., "http://localhost:8000")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl ClusterClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the web application (e.g., "http://localhost:8000")
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, cookies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use jobwatch_client::ClusterClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(30))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = ClusterClient::with_client("http://localhost:8000", http_client);
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the web application
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve a path against the base URL
    ///
    /// Absolute URLs are used as-is.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle an API response whose body is not needed
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(())
    }
}
