//! Job poller
//!
//! Polls the cluster manager for active jobs and renders their status.
//! The poller is a single actor: timer ticks, request completions and user
//! commands are handled one at a time, so the render state needs no locking.
//! Requests run as separate tasks and report back over a channel.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use jobwatch_core::domain::job::{Job, JobId, JobStatus};
use jobwatch_core::render::{Presenter, RenderOp, Renderer};
use tokio::sync::mpsc;
use tokio::time::{self, Duration, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::{ErrorNotify, PollerConfig};
use crate::repository::JobRepository;
use crate::scheduler::callbacks::{JobCallbacks, JobFailure};

/// Commands accepted by a running poller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollerCommand {
    /// Dismiss a failed job
    Clear(JobId),
    Shutdown,
}

/// Result of asking to clear a job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClearOutcome {
    /// Nothing is rendered for the job; no request was made
    NotTracked,
    /// Only failed jobs can be cleared; no request was made
    NotInError,
    /// The clear request was sent
    Requested,
}

/// A finished background request
#[derive(Debug)]
pub enum Completion {
    Fetch(Result<Vec<Job>>),
    Clear(JobId, Result<()>),
}

/// Job poller that tracks the active jobs of one object
pub struct JobPoller<C: JobCallbacks> {
    config: PollerConfig,
    repository: Arc<dyn JobRepository>,
    renderer: Renderer,
    callbacks: C,
    /// Interval the timer currently runs at
    cadence: Option<Duration>,
    timer: Option<Interval>,
    fetch_in_flight: bool,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
}

impl<C: JobCallbacks> JobPoller<C> {
    /// Creates a new job poller
    ///
    /// No request is made until the poller is told to fetch or run.
    pub fn new(config: PollerConfig, repository: Arc<dyn JobRepository>, callbacks: C) -> Self {
        let renderer = Renderer::new(config.connection.context.clone());
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            config,
            repository,
            renderer,
            callbacks,
            cadence: None,
            timer: None,
            fetch_in_flight: false,
            completions_tx,
            completions_rx,
        }
    }

    #[allow(dead_code)]
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn callbacks(&self) -> &C {
        &self.callbacks
    }

    /// Interval the poll timer is running at, `None` before the first poll
    #[allow(dead_code)]
    pub fn cadence(&self) -> Option<Duration> {
        self.cadence
    }

    #[allow(dead_code)]
    pub fn is_fetch_in_flight(&self) -> bool {
        self.fetch_in_flight
    }

    /// (Re)starts the poll timer at the given interval
    ///
    /// Returns `false` when the timer already runs at that interval. The
    /// previous timer is dropped before the new one is installed, so only
    /// one is ever pending. The first tick fires one interval from now.
    pub fn poll(&mut self, interval: Duration) -> bool {
        if self.cadence == Some(interval) {
            return false;
        }

        let mut timer = time::interval_at(Instant::now() + interval, interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.timer = Some(timer);
        self.cadence = Some(interval);

        debug!("Polling every {:?}", interval);
        true
    }

    /// Starts fetching the active job listing
    ///
    /// Returns `false` without making a request when the previous fetch has
    /// not completed yet.
    pub fn fetch_jobs(&mut self) -> bool {
        if self.fetch_in_flight {
            debug!("Previous job fetch still pending, skipping this tick");
            return false;
        }

        self.fetch_in_flight = true;
        let repository = Arc::clone(&self.repository);
        let completions = self.completions_tx.clone();

        tokio::spawn(async move {
            let result = repository.fetch_active_jobs().await;
            // The receiver only goes away with the poller itself
            let _ = completions.send(Completion::Fetch(result));
        });

        true
    }

    /// Applies the outcome of a job listing request
    pub fn complete_fetch(&mut self, result: Result<Vec<Job>>) -> Vec<RenderOp> {
        self.fetch_in_flight = false;

        match result {
            Ok(jobs) => self.process_jobs(jobs),
            Err(e) => {
                warn!("Failed to fetch active jobs: {:#}", e);
                self.callbacks.on_failed(&JobFailure::Transport {
                    message: format!("{:#}", e),
                });
                Vec::new()
            }
        }
    }

    /// Renders a job listing and adjusts the cadence
    ///
    /// Jobs reported as `success` are resolved and not drawn. Tracked jobs
    /// missing from the listing are removed, and resolved unless they had
    /// failed. Jobs that were already removed are ignored.
    pub fn process_jobs(&mut self, jobs: Vec<Job>) -> Vec<RenderOp> {
        let mut ops = Vec::new();
        let mut seen = HashSet::new();

        for job in &jobs {
            if self.renderer.was_removed(&job.id) {
                debug!("Job {} was already removed, ignoring it", job.id);
                continue;
            }

            if job.status == JobStatus::Success {
                if let Some(op) = self.renderer.remove(&job.id) {
                    ops.push(op);
                }
                self.callbacks.on_resolved(&job.id);
                continue;
            }

            ops.extend(self.renderer.render(job));
            seen.insert(job.id.clone());

            if job.status == JobStatus::Error {
                self.notify_failed(job);
            }
        }

        let mut vanished: Vec<JobId> = self
            .renderer
            .tracked_ids()
            .into_iter()
            .filter(|id| !seen.contains(id))
            .collect();
        vanished.sort();

        for job_id in vanished {
            let failed = self
                .renderer
                .state(&job_id)
                .is_some_and(|state| state.status() == JobStatus::Error);

            if let Some(op) = self.renderer.remove(&job_id) {
                ops.push(op);
            }
            if !failed {
                self.callbacks.on_resolved(&job_id);
            }
        }

        if jobs.is_empty() {
            self.poll(self.config.slow_interval);
        } else {
            self.poll(self.config.fast_interval);
        }

        ops
    }

    fn notify_failed(&mut self, job: &Job) {
        let first = self.renderer.mark_failure_notified(&job.id);
        if self.config.error_notify == ErrorNotify::Once && !first {
            return;
        }

        self.callbacks.on_failed(&JobFailure::Job {
            id: job.id.clone(),
            reason: job.failure_reason(job.active_op_index()),
        });
    }

    /// Asks the server to dismiss a failed job
    ///
    /// The block is removed once the request completes, see
    /// [`JobPoller::complete_clear`].
    pub fn request_clear(&mut self, job_id: &JobId) -> ClearOutcome {
        let Some(state) = self.renderer.state(job_id) else {
            debug!("Job {} is not tracked, nothing to clear", job_id);
            return ClearOutcome::NotTracked;
        };

        if state.status() != JobStatus::Error {
            return ClearOutcome::NotInError;
        }

        let repository = Arc::clone(&self.repository);
        let completions = self.completions_tx.clone();
        let job_id = job_id.clone();

        tokio::spawn(async move {
            let result = repository.clear_job(&job_id).await;
            let _ = completions.send(Completion::Clear(job_id, result));
        });

        ClearOutcome::Requested
    }

    /// Applies the outcome of a clear request
    ///
    /// A job that left the listing while the request was pending was already
    /// removed, so nothing is returned for it.
    pub fn complete_clear(&mut self, job_id: JobId, result: Result<()>) -> Option<RenderOp> {
        match result {
            Ok(()) => {
                let op = self.renderer.remove(&job_id);
                if op.is_none() {
                    debug!("Job {} vanished before its clear completed", job_id);
                }
                op
            }
            Err(e) => {
                warn!("Failed to clear job {}: {:#}", job_id, e);
                None
            }
        }
    }

    /// Waits for the next background request to finish
    #[allow(dead_code)]
    pub async fn next_completion(&mut self) -> Option<Completion> {
        self.completions_rx.recv().await
    }

    /// Applies any finished background request
    pub fn apply_completion(&mut self, completion: Completion) -> Vec<RenderOp> {
        match completion {
            Completion::Fetch(result) => self.complete_fetch(result),
            Completion::Clear(job_id, result) => {
                self.complete_clear(job_id, result).into_iter().collect()
            }
        }
    }

    /// Runs the polling loop until shutdown
    ///
    /// Fetches once immediately, then at the adaptive cadence. Returns when a
    /// `Shutdown` command arrives, the command channel closes, or, with
    /// `exit_when_idle`, after the first empty listing.
    pub async fn run<P: Presenter>(
        &mut self,
        presenter: &mut P,
        mut commands: mpsc::Receiver<PollerCommand>,
    ) -> Result<()> {
        info!(
            "Starting job poller for {} (fast: {:?}, slow: {:?})",
            self.config.jobs_path, self.config.fast_interval, self.config.slow_interval
        );

        self.poll(self.config.slow_interval);
        self.fetch_jobs();

        loop {
            tokio::select! {
                _ = tick(&mut self.timer) => {
                    self.fetch_jobs();
                }
                Some(completion) = self.completions_rx.recv() => {
                    let idle = matches!(&completion, Completion::Fetch(Ok(jobs)) if jobs.is_empty());
                    let ops = self.apply_completion(completion);
                    presenter.apply_all(&ops);

                    if idle && self.config.exit_when_idle {
                        info!("No active jobs left, stopping");
                        return Ok(());
                    }
                }
                command = commands.recv() => match command {
                    Some(PollerCommand::Clear(job_id)) => {
                        match self.request_clear(&job_id) {
                            ClearOutcome::Requested => info!("Clearing job {}", job_id),
                            ClearOutcome::NotInError => warn!("Job {} has not failed, refusing to clear it", job_id),
                            ClearOutcome::NotTracked => debug!("Job {} is not being watched", job_id),
                        }
                    }
                    Some(PollerCommand::Shutdown) | None => {
                        info!("Shutting down job poller");
                        return Ok(());
                    }
                },
            }
        }
    }
}

/// Waits for the next tick of the timer, forever when none is installed
async fn tick(timer: &mut Option<Interval>) {
    match timer {
        Some(timer) => {
            timer.tick().await;
        }
        None => std::future::pending().await,
    }
}
