//! Scheduler layer for the watcher
//!
//! This layer polls the cluster manager for active jobs at an adaptive
//! cadence, feeds them through the renderer and reports terminal
//! transitions to the caller's callbacks.

pub mod callbacks;
pub mod poller;

pub use callbacks::LoggingCallbacks;
pub use poller::{JobPoller, PollerCommand};
