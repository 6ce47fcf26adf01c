//! Jobwatch Core
//!
//! Core types and render logic for the cluster job-status watcher.
//!
//! This crate contains:
//! - Domain types: the job records reported by the cluster manager's job queue
//! - Label formatting for operation names
//! - Render: the per-job render state and the patch operations a presenter applies

pub mod domain;
pub mod label;
pub mod render;
