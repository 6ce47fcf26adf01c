//! Job renderer
//!
//! Maps a job record to the patch that brings its block up to date.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet, VecDeque};

use crate::domain::job::{Job, JobId, JobStatus};
use crate::domain::log::LogLine;
use crate::label::format_op;
use crate::render::{RenderOp, RenderState};

const UNKNOWN_OPCODE: &str = "OP_UNKNOWN";
const UNKNOWN_REASON: &str = "Unknown error";

/// How many removed job ids are remembered
const REMOVED_CAPACITY: usize = 1024;

/// Renders tracked jobs incrementally
#[derive(Debug, Clone)]
pub struct Renderer {
    /// URL path of the object the jobs belong to (e.g. "/cluster/main")
    context: String,
    states: HashMap<JobId, RenderState>,
    /// Jobs whose block was removed; they are never drawn again
    removed: HashSet<JobId>,
    removed_order: VecDeque<JobId>,
    actions_enabled: bool,
}

impl Renderer {
    /// Creates a renderer for jobs of the given context path
    pub fn new(context: impl Into<String>) -> Self {
        let context = context.into();
        Self {
            context: context.trim_end_matches('/').to_string(),
            states: HashMap::new(),
            removed: HashSet::new(),
            removed_order: VecDeque::new(),
            actions_enabled: false,
        }
    }

    /// URL path that dismisses a failed job
    pub fn clear_url(&self, job_id: &JobId) -> String {
        format!("{}/job/{}/clear/", self.context, job_id)
    }

    pub fn is_tracked(&self, job_id: &JobId) -> bool {
        self.states.contains_key(job_id)
    }

    pub fn state(&self, job_id: &JobId) -> Option<&RenderState> {
        self.states.get(job_id)
    }

    /// Ids of every job with a block on screen, in no particular order
    pub fn tracked_ids(&self) -> Vec<JobId> {
        self.states.keys().cloned().collect()
    }

    pub fn tracked_count(&self) -> usize {
        self.states.len()
    }

    /// Whether the job was removed, by disappearing or by being cleared
    ///
    /// Job ids are queue serials and are not reused, so a removed job that
    /// shows up in a stale listing is the same job and stays removed. Only
    /// the most recent removals are remembered.
    pub fn was_removed(&self, job_id: &JobId) -> bool {
        self.removed.contains(job_id)
    }

    /// Brings a job's block up to date
    ///
    /// The first sighting creates the block. Later calls only emit what
    /// changed, so rendering an identical payload twice yields nothing the
    /// second time.
    pub fn render(&mut self, job: &Job) -> Vec<RenderOp> {
        let mut ops = Vec::new();
        if self.was_removed(&job.id) {
            return ops;
        }

        let op_index = job.active_op_index();
        let label = format_op(job.op_id(op_index).unwrap_or(UNKNOWN_OPCODE), job.status);
        let clear_url = self.clear_url(&job.id);

        let state = match self.states.entry(job.id.clone()) {
            Entry::Vacant(entry) => {
                ops.push(RenderOp::CreateBlock {
                    job_id: job.id.clone(),
                    label: label.clone(),
                    status: job.status,
                });
                entry.insert(RenderState::new(job.status, label))
            }
            Entry::Occupied(entry) => {
                let state = entry.into_mut();
                if state.label != label {
                    ops.push(RenderOp::UpdateHeader {
                        job_id: job.id.clone(),
                        label: label.clone(),
                    });
                    state.label = label;
                }
                if state.status != job.status {
                    ops.push(RenderOp::SetStatus {
                        job_id: job.id.clone(),
                        status: job.status,
                    });
                    state.status = job.status;
                }
                state
            }
        };

        if job.status == JobStatus::Error && !state.error_shown {
            let reason = job
                .failure_reason(op_index)
                .unwrap_or_else(|| UNKNOWN_REASON.to_string());
            ops.push(RenderOp::ShowError {
                job_id: job.id.clone(),
                reason,
                clear_url,
            });
            state.error_shown = true;

            if !self.actions_enabled {
                self.actions_enabled = true;
                ops.push(RenderOp::EnableActions);
            }
        }

        let log = job.log(op_index);
        let drawn = state.watermark(op_index);
        if log.len() > drawn {
            ops.push(RenderOp::AppendLog {
                job_id: job.id.clone(),
                op_index,
                lines: log[drawn..].iter().map(LogLine::message).collect(),
            });
            state.advance_watermark(op_index, log.len());
        }

        ops
    }

    /// Forgets a job and returns the op that removes its block
    ///
    /// Returns `None` when the job was not tracked, so the two removal paths
    /// (disappearing from the listing and being cleared by the user) never
    /// remove a block twice. The job is remembered as removed either way.
    pub fn remove(&mut self, job_id: &JobId) -> Option<RenderOp> {
        self.retire(job_id);
        self.states.remove(job_id).map(|_| RenderOp::RemoveBlock {
            job_id: job_id.clone(),
        })
    }

    fn retire(&mut self, job_id: &JobId) {
        if !self.removed.insert(job_id.clone()) {
            return;
        }
        self.removed_order.push_back(job_id.clone());
        if self.removed_order.len() > REMOVED_CAPACITY {
            if let Some(oldest) = self.removed_order.pop_front() {
                self.removed.remove(&oldest);
            }
        }
    }

    /// Records that a failure was reported for a job
    ///
    /// Returns `true` only the first time for a tracked job.
    pub fn mark_failure_notified(&mut self, job_id: &JobId) -> bool {
        match self.states.get_mut(job_id) {
            Some(state) if !state.failure_notified => {
                state.failure_notified = true;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn job(value: serde_json::Value) -> Job {
        serde_json::from_value(value).unwrap()
    }

    fn running_job(log: serde_json::Value) -> Job {
        job(json!({
            "id": 1,
            "status": "running",
            "ops": [{"OP_ID": "OP_DO_THING"}],
            "opstatus": ["running"],
            "oplog": [log],
        }))
    }

    #[test]
    fn test_first_render_creates_block() {
        let mut renderer = Renderer::new("/cluster/main");
        let ops = renderer.render(&running_job(json!([])));

        assert_eq!(
            ops,
            vec![RenderOp::CreateBlock {
                job_id: JobId::from("1"),
                label: "Do Thing: Running".to_string(),
                status: JobStatus::Running,
            }]
        );
        assert!(renderer.is_tracked(&JobId::from("1")));
        assert_eq!(renderer.state(&JobId::from("1")).unwrap().watermark(0), 0);
    }

    #[test]
    fn test_rerender_identical_payload_is_empty() {
        let mut renderer = Renderer::new("/cluster/main");
        let payload = running_job(json!([[1, [0, 0], "message", "step1 done"]]));

        let first = renderer.render(&payload);
        let second = renderer.render(&payload);

        assert_eq!(first.len(), 2);
        assert!(second.is_empty());
    }

    #[test]
    fn test_log_lines_append_past_watermark_only() {
        let mut renderer = Renderer::new("/cluster/main");
        renderer.render(&running_job(json!([[1, [0, 0], "message", "one"]])));

        let ops = renderer.render(&running_job(json!([
            [1, [0, 0], "message", "one"],
            [2, [0, 0], "message", "two"],
            [3, [0, 0], "message", "three"],
        ])));

        assert_eq!(
            ops,
            vec![RenderOp::AppendLog {
                job_id: JobId::from("1"),
                op_index: 0,
                lines: vec!["two".to_string(), "three".to_string()],
            }]
        );
        assert_eq!(renderer.state(&JobId::from("1")).unwrap().watermark(0), 3);
    }

    #[test]
    fn test_shorter_log_never_rewinds_watermark() {
        let mut renderer = Renderer::new("/cluster/main");
        renderer.render(&running_job(json!([
            [1, [0, 0], "message", "one"],
            [2, [0, 0], "message", "two"],
        ])));

        let ops = renderer.render(&running_job(json!([[1, [0, 0], "message", "one"]])));

        assert!(ops.is_empty());
        assert_eq!(renderer.state(&JobId::from("1")).unwrap().watermark(0), 2);
    }

    #[test]
    fn test_watermarks_are_per_sub_operation() {
        let mut renderer = Renderer::new("/cluster/main");
        renderer.render(&job(json!({
            "id": 9,
            "status": "running",
            "ops": [{"OP_ID": "OP_FIRST"}, {"OP_ID": "OP_SECOND"}],
            "opstatus": ["running", "queued"],
            "oplog": [[[1, [0, 0], "message", "a"]], []],
        })));

        let ops = renderer.render(&job(json!({
            "id": 9,
            "status": "running",
            "ops": [{"OP_ID": "OP_FIRST"}, {"OP_ID": "OP_SECOND"}],
            "opstatus": ["success", "running"],
            "oplog": [[[1, [0, 0], "message", "a"]], [[2, [0, 0], "message", "b"]]],
        })));

        assert_eq!(
            ops,
            vec![
                RenderOp::UpdateHeader {
                    job_id: JobId::from("9"),
                    label: "Second: Running".to_string(),
                },
                RenderOp::AppendLog {
                    job_id: JobId::from("9"),
                    op_index: 1,
                    lines: vec!["b".to_string()],
                },
            ]
        );
    }

    #[test]
    fn test_error_panel_shown_once() {
        let mut renderer = Renderer::new("/cluster/main/");
        let failed = job(json!({
            "id": 5,
            "status": "error",
            "ops": [{"OP_ID": "OP_INSTANCE_CREATE"}],
            "opstatus": ["error"],
            "opresult": [["OpPrereqError", ["Out of memory"]]],
        }));

        let first = renderer.render(&failed);
        assert_eq!(
            first,
            vec![
                RenderOp::CreateBlock {
                    job_id: JobId::from("5"),
                    label: "Instance Create: Error".to_string(),
                    status: JobStatus::Error,
                },
                RenderOp::ShowError {
                    job_id: JobId::from("5"),
                    reason: "Out of memory".to_string(),
                    clear_url: "/cluster/main/job/5/clear/".to_string(),
                },
                RenderOp::EnableActions,
            ]
        );

        assert!(renderer.render(&failed).is_empty());
        assert!(renderer.state(&JobId::from("5")).unwrap().error_shown());
    }

    #[test]
    fn test_actions_enabled_once_per_renderer() {
        let mut renderer = Renderer::new("/cluster/main");
        let mut failed = Job::new(1u64, JobStatus::Error);
        renderer.render(&failed);
        failed.id = JobId::from("2");

        let ops = renderer.render(&failed);
        assert!(!ops.contains(&RenderOp::EnableActions));
        assert!(ops.iter().any(|op| matches!(
            op,
            RenderOp::ShowError { reason, .. } if reason == UNKNOWN_REASON
        )));
    }

    #[test]
    fn test_status_change_on_existing_block() {
        let mut renderer = Renderer::new("/cluster/main");
        renderer.render(&job(json!({
            "id": 4, "status": "queued",
            "ops": [{"OP_ID": "OP_NODE_EVACUATE"}], "opstatus": ["queued"],
        })));

        let ops = renderer.render(&job(json!({
            "id": 4, "status": "running",
            "ops": [{"OP_ID": "OP_NODE_EVACUATE"}], "opstatus": ["running"],
        })));

        assert_eq!(
            ops,
            vec![
                RenderOp::UpdateHeader {
                    job_id: JobId::from("4"),
                    label: "Node Evacuate: Running".to_string(),
                },
                RenderOp::SetStatus {
                    job_id: JobId::from("4"),
                    status: JobStatus::Running,
                },
            ]
        );
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut renderer = Renderer::new("/cluster/main");
        renderer.render(&running_job(json!([])));

        assert_eq!(
            renderer.remove(&JobId::from("1")),
            Some(RenderOp::RemoveBlock {
                job_id: JobId::from("1")
            })
        );
        assert_eq!(renderer.remove(&JobId::from("1")), None);
        assert_eq!(renderer.tracked_count(), 0);
    }

    #[test]
    fn test_removed_job_is_not_drawn_again() {
        let mut renderer = Renderer::new("/cluster/main");
        let payload = running_job(json!([[1, [0, 0], "message", "one"]]));
        renderer.render(&payload);
        renderer.remove(&JobId::from("1"));

        assert!(renderer.render(&payload).is_empty());
        assert!(!renderer.is_tracked(&JobId::from("1")));
        assert!(renderer.was_removed(&JobId::from("1")));
    }

    #[test]
    fn test_removed_ids_are_bounded() {
        let mut renderer = Renderer::new("/cluster/main");
        for id in 0..=REMOVED_CAPACITY as u64 {
            renderer.remove(&JobId::from(id));
        }

        assert!(!renderer.was_removed(&JobId::from(0u64)));
        assert!(renderer.was_removed(&JobId::from(1u64)));
        assert!(renderer.was_removed(&JobId::from(REMOVED_CAPACITY as u64)));
    }

    #[test]
    fn test_failure_notified_once() {
        let mut renderer = Renderer::new("/cluster/main");
        renderer.render(&Job::new(8u64, JobStatus::Error));

        assert!(renderer.mark_failure_notified(&JobId::from("8")));
        assert!(!renderer.mark_failure_notified(&JobId::from("8")));
        assert!(!renderer.mark_failure_notified(&JobId::from("unknown")));
    }
}
