//! Repository layer
//!
//! Repositories abstract communication with the cluster manager behind
//! small async traits, so the poller can be driven without a server.

mod jobs;

pub use jobs::{HttpJobRepository, JobRepository};
