//! Job domain types

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::log::LogLine;

/// Identifier of a job in the cluster's job queue
///
/// The queue reports numeric ids, while some views stringify them, so both
/// forms are accepted and normalized to text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawJobId", into = "String")]
pub struct JobId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawJobId {
    Number(u64),
    Text(String),
}

impl From<RawJobId> for JobId {
    fn from(raw: RawJobId) -> Self {
        match raw {
            RawJobId::Number(n) => JobId(n.to_string()),
            RawJobId::Text(s) => JobId(s),
        }
    }
}

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        JobId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<JobId> for String {
    fn from(id: JobId) -> Self {
        id.0
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        JobId(s.to_string())
    }
}

impl From<u64> for JobId {
    fn from(n: u64) -> Self {
        JobId(n.to_string())
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Status of a job or of one of its sub-operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Waiting,
    Canceling,
    Running,
    Canceled,
    Success,
    Error,
    /// Any status string this client does not know about
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Waiting => "waiting",
            JobStatus::Canceling => "canceling",
            JobStatus::Running => "running",
            JobStatus::Canceled => "canceled",
            JobStatus::Success => "success",
            JobStatus::Error => "error",
            JobStatus::Unknown => "unknown",
        }
    }

    /// Whether the job queue will never move this status again
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Success | JobStatus::Error | JobStatus::Canceled
        )
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a job's `ops` list
///
/// Only the opcode symbol is used; the opcode's parameters are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpCode {
    #[serde(rename = "OP_ID")]
    pub op_id: String,
}

/// Job record as returned by the job-status endpoints
///
/// The per-operation lists are parallel arrays indexed by sub-operation.
/// Any of them may be missing or shorter than `ops`, so every accessor is
/// bounds-checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub status: JobStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ops: Vec<OpCode>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub opstatus: Vec<JobStatus>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub opresult: Vec<serde_json::Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub oplog: Vec<Vec<LogLine>>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Job {
    /// Creates a job with no sub-operations
    pub fn new(id: impl Into<JobId>, status: JobStatus) -> Self {
        Self {
            id: id.into(),
            status,
            ops: Vec::new(),
            opstatus: Vec::new(),
            opresult: Vec::new(),
            oplog: Vec::new(),
        }
    }

    /// Index of the sub-operation currently being worked on
    ///
    /// This is the first sub-operation that has not succeeded. When every
    /// sub-operation succeeded the last one is reported.
    pub fn active_op_index(&self) -> usize {
        self.opstatus
            .iter()
            .position(|status| *status != JobStatus::Success)
            .unwrap_or_else(|| self.opstatus.len().saturating_sub(1))
    }

    pub fn op_id(&self, index: usize) -> Option<&str> {
        self.ops.get(index).map(|op| op.op_id.as_str())
    }

    pub fn op_status(&self, index: usize) -> Option<JobStatus> {
        self.opstatus.get(index).copied()
    }

    /// Log lines recorded for a sub-operation, empty when none were reported
    pub fn log(&self, index: usize) -> &[LogLine] {
        self.oplog.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Human readable failure reason for a sub-operation
    ///
    /// Failed opcodes report `[error_class, [reason, ...]]`. Bare strings are
    /// accepted as the reason as well.
    pub fn failure_reason(&self, index: usize) -> Option<String> {
        let result = self.opresult.get(index)?;

        if let Some(details) = result.get(1) {
            if let Some(reason) = details.get(0) {
                return Some(value_to_text(reason));
            }
            if let Some(reason) = details.as_str() {
                return Some(reason.to_string());
            }
        }

        result.as_str().map(str::to_string)
    }
}

pub(crate) fn value_to_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_job_id_accepts_numbers_and_strings() {
        let numeric: Job = serde_json::from_value(json!({"id": 42, "status": "running"})).unwrap();
        let text: Job = serde_json::from_value(json!({"id": "42", "status": "running"})).unwrap();

        assert_eq!(numeric.id, text.id);
        assert_eq!(numeric.id.as_str(), "42");
    }

    #[test]
    fn test_unknown_status_is_tolerated() {
        let job: Job =
            serde_json::from_value(json!({"id": 1, "status": "frobnicating"})).unwrap();
        assert_eq!(job.status, JobStatus::Unknown);
    }

    #[test]
    fn test_missing_and_null_lists_default_to_empty() {
        let job: Job =
            serde_json::from_value(json!({"id": 1, "status": "queued", "oplog": null})).unwrap();

        assert!(job.ops.is_empty());
        assert!(job.oplog.is_empty());
        assert!(job.log(0).is_empty());
        assert_eq!(job.active_op_index(), 0);
        assert_eq!(job.failure_reason(0), None);
    }

    #[test]
    fn test_active_op_is_first_unfinished() {
        let job: Job = serde_json::from_value(json!({
            "id": 7,
            "status": "running",
            "ops": [{"OP_ID": "OP_A"}, {"OP_ID": "OP_B"}, {"OP_ID": "OP_C"}],
            "opstatus": ["success", "running", "queued"],
        }))
        .unwrap();

        assert_eq!(job.active_op_index(), 1);
        assert_eq!(job.op_id(1), Some("OP_B"));
        assert_eq!(job.op_status(1), Some(JobStatus::Running));
    }

    #[test]
    fn test_active_op_falls_back_to_last_when_all_succeeded() {
        let job: Job = serde_json::from_value(json!({
            "id": 7,
            "status": "success",
            "ops": [{"OP_ID": "OP_A"}, {"OP_ID": "OP_B"}],
            "opstatus": ["success", "success"],
        }))
        .unwrap();

        assert_eq!(job.active_op_index(), 1);
    }

    #[test]
    fn test_failure_reason_from_result_tuple() {
        let job: Job = serde_json::from_value(json!({
            "id": 3,
            "status": "error",
            "ops": [{"OP_ID": "OP_INSTANCE_CREATE"}],
            "opstatus": ["error"],
            "opresult": [["OpPrereqError", ["Instance already exists", "wrong_input"]]],
        }))
        .unwrap();

        assert_eq!(
            job.failure_reason(0).as_deref(),
            Some("Instance already exists")
        );
    }

    #[test]
    fn test_failure_reason_from_bare_string() {
        let mut job = Job::new(3u64, JobStatus::Error);
        job.opresult = vec![json!("disk full")];

        assert_eq!(job.failure_reason(0).as_deref(), Some("disk full"));
        assert_eq!(job.failure_reason(1), None);
    }

    #[test]
    fn test_status_helpers() {
        assert!(JobStatus::Success.is_terminal());
        assert!(JobStatus::Error.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert_eq!(JobStatus::Waiting.to_string(), "waiting");
    }
}
