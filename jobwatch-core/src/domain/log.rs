//! Log domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::job::value_to_text;

/// One log entry of a sub-operation
///
/// The job queue encodes entries as `[serial, [seconds, microseconds], kind, message]`.
/// Entries are kept as raw JSON so a malformed one degrades to an empty
/// message instead of failing the whole job listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogLine(serde_json::Value);

impl LogLine {
    pub fn new(value: serde_json::Value) -> Self {
        LogLine(value)
    }

    /// Displayable message (4th element)
    pub fn message(&self) -> String {
        self.0.get(3).map(value_to_text).unwrap_or_default()
    }

    /// Message kind, e.g. "message" or "remote-import"
    pub fn kind(&self) -> Option<&str> {
        self.0.get(2).and_then(serde_json::Value::as_str)
    }

    pub fn serial(&self) -> Option<u64> {
        self.0.get(0).and_then(serde_json::Value::as_u64)
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        let stamp = self.0.get(1)?;
        let seconds = stamp.get(0)?.as_i64()?;
        let micros = stamp.get(1).and_then(serde_json::Value::as_u64).unwrap_or(0);
        let nanos = u32::try_from(micros.checked_mul(1_000)?).ok()?;
        DateTime::<Utc>::from_timestamp(seconds, nanos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_log_line_fields() {
        let line = LogLine::new(json!([5, [1300000000, 250000], "message", "step1 done"]));

        assert_eq!(line.serial(), Some(5));
        assert_eq!(line.kind(), Some("message"));
        assert_eq!(line.message(), "step1 done");

        let ts = line.timestamp().unwrap();
        assert_eq!(ts.timestamp(), 1300000000);
        assert_eq!(ts.timestamp_subsec_micros(), 250000);
    }

    #[test]
    fn test_malformed_log_line_does_not_panic() {
        let line = LogLine::new(json!("garbage"));

        assert_eq!(line.message(), "");
        assert_eq!(line.kind(), None);
        assert_eq!(line.timestamp(), None);
    }

    #[test]
    fn test_non_string_message_is_stringified() {
        let line = LogLine::new(json!([1, [0, 0], "message", {"progress": 50}]));
        assert_eq!(line.message(), r#"{"progress":50}"#);
    }
}
