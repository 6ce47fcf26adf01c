//! Core domain types
//!
//! This module contains the job records exactly as the cluster manager's
//! job-status endpoints report them. These types are shared between the
//! HTTP client (which decodes them) and the renderer (which draws them).

pub mod job;
pub mod log;
