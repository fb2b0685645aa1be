//! Trace-cause document forwarded with failure reports.
//!
//! A frame line such as `at handler (/var/task/index.js:3:12)` becomes
//! `{"path": "/var/task/index.js", "line": 3, "label": "handler"}`.

use crate::function::FunctionError;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct StackEntry {
    path: String,
    line: Option<u32>,
    label: String,
}

#[derive(Debug, Serialize)]
struct Exception {
    #[serde(rename = "type")]
    kind: String,
    message: String,
    stack: Vec<StackEntry>,
}

#[derive(Debug, Serialize)]
struct TraceCause {
    working_directory: String,
    exceptions: Vec<Exception>,
    paths: Vec<String>,
}

/// Format `error` as a trace-cause document rooted at `working_directory`.
///
/// Returns an empty string if the document cannot be produced; an empty trace
/// context is not forwarded.
pub fn trace_cause(error: &FunctionError, working_directory: &str) -> String {
    let stack: Vec<StackEntry> = error.trace.iter().map(|line| parse_frame(line)).collect();
    // Distinct paths, in order of first appearance.
    let mut paths: Vec<String> = Vec::new();
    for entry in &stack {
        if !paths.contains(&entry.path) {
            paths.push(entry.path.clone());
        }
    }

    let cause = TraceCause {
        working_directory: working_directory.to_string(),
        paths,
        exceptions: vec![Exception {
            kind: error.error_type.clone(),
            message: error.error_message.clone(),
            stack,
        }],
    };

    serde_json::to_string(&cause).unwrap_or_default()
}

fn parse_frame(frame: &str) -> StackEntry {
    let cleaned: String = frame.trim().chars().filter(|c| *c != '(' && *c != ')').collect();
    // Drop the leading `at`.
    let line = match cleaned.find(' ') {
        Some(idx) => &cleaned[idx + 1..],
        None => cleaned.as_str(),
    };

    let (label, location) = match line.rfind(' ') {
        Some(idx) if idx > 0 => (&line[..idx], &line[idx + 1..]),
        _ => ("", line),
    };

    let mut parts = location.split(':');
    let path = parts.next().unwrap_or_default().to_string();
    let line_number = parts.next().and_then(|n| n.parse().ok());

    StackEntry {
        path,
        line: line_number,
        label: if label.is_empty() {
            "anonymous".to_string()
        } else {
            label.to_string()
        },
    }
}
