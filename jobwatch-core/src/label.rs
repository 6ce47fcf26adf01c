//! Operation label formatting
//!
//! Opcode symbols look like `OP_INSTANCE_CREATE`; they are shown to users as
//! `Instance Create: Running`.

use crate::domain::job::JobStatus;

const OPCODE_PREFIX: &str = "OP_";

/// Capitalizes the first letter of every word
///
/// Runs of spaces collapse, so an opcode with doubled separators still
/// produces a clean label.
pub fn title_case(text: &str) -> String {
    text.split(' ')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Formats an opcode symbol and status as a header label
pub fn format_op(op_id: &str, status: JobStatus) -> String {
    let name = op_id
        .strip_prefix(OPCODE_PREFIX)
        .unwrap_or(op_id)
        .to_lowercase()
        .replace('_', " ");

    format!("{}: {}", title_case(&name), title_case(status.as_str()))
}
