// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::io::BufRead;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle phase of one tool invocation.
///
/// Phases only move forward; `Complete` is terminal and is the only phase
/// that carries a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolStatus {
    Pending,
    #[serde(alias = "inProgress", alias = "executing")]
    InProgress,
    #[serde(alias = "completed")]
    Complete,
}

impl ToolStatus {
    pub fn is_terminal(self) -> bool {
        self == ToolStatus::Complete
    }
}

impl std::fmt::Display for ToolStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolStatus::Pending => write!(f, "pending"),
            ToolStatus::InProgress => write!(f, "in_progress"),
            ToolStatus::Complete => write!(f, "complete"),
        }
    }
}

fn empty_args() -> Value {
    Value::Object(Default::default())
}

/// One observation of a tool invocation's lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolEvent {
    pub name: String,
    pub status: ToolStatus,
    /// Invocation parameters; shape varies per tool and is never validated.
    #[serde(default = "empty_args")]
    pub args: Value,
    /// Present only on completion, and even then optional.  A JSON `null`
    /// deserializes as absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

impl ToolEvent {
    pub fn new(name: impl Into<String>, status: ToolStatus, args: Value) -> Self {
        Self { name: name.into(), status, args, result: None }
    }

    pub fn pending(name: impl Into<String>, args: Value) -> Self {
        Self::new(name, ToolStatus::Pending, args)
    }

    pub fn complete(name: impl Into<String>, args: Value, result: Option<Value>) -> Self {
        Self { name: name.into(), status: ToolStatus::Complete, args, result }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

// ── Todos ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TodoStatus {
    /// Lenient parse of an agent-supplied status.  Anything unrecognised is
    /// treated as `Pending`.
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "in_progress" | "inProgress" | "in-progress" => TodoStatus::InProgress,
            "completed" | "complete" | "done" => TodoStatus::Completed,
            _ => TodoStatus::Pending,
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            TodoStatus::Completed => "✓",
            TodoStatus::InProgress => "→",
            TodoStatus::Pending => "○",
        }
    }
}

/// A todo item held in the workspace plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub id: String,
    pub content: String,
    pub status: TodoStatus,
}

/// A todo as the agent sent it in `write_todos` args; the id may be missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedTodo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub content: String,
    pub status: TodoStatus,
}

impl PlannedTodo {
    /// Parse a todo list array.  Returns `None` when `value` is not an array;
    /// entries that are not objects with a string `content` are dropped.
    pub fn parse_list(value: &Value) -> Option<Vec<PlannedTodo>> {
        let items = value.as_array()?;
        Some(items.iter().filter_map(PlannedTodo::parse).collect())
    }

    fn parse(item: &Value) -> Option<PlannedTodo> {
        let content = item.get("content")?.as_str()?.to_string();
        let id = item
            .get("id")
            .and_then(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter(|s| !s.trim().is_empty());
        let status = item
            .get("status")
            .and_then(Value::as_str)
            .map(TodoStatus::parse)
            .unwrap_or_default();
        Some(PlannedTodo { id, content, status })
    }
}

// ── JSONL intake ──────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum EventParseError {
    #[error("reading event stream: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: invalid tool event: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Read newline-delimited JSON tool events.  Blank lines are skipped; each
/// malformed line yields its own error so callers can skip it and carry on.
pub fn read_events<R: BufRead>(
    reader: R,
) -> impl Iterator<Item = Result<ToolEvent, EventParseError>> {
    reader.lines().enumerate().filter_map(|(idx, line)| {
        let line = match line {
            Ok(l) => l,
            Err(e) => return Some(Err(EventParseError::Io(e))),
        };
        if line.trim().is_empty() {
            return None;
        }
        Some(
            serde_json::from_str::<ToolEvent>(&line)
                .map_err(|source| EventParseError::Json { line: idx + 1, source }),
        )
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn status_accepts_upstream_spellings() {
        let ev: ToolEvent = serde_json::from_value(json!({
            "name": "research", "status": "inProgress", "args": {"query": "q"}
        }))
        .unwrap();
        assert_eq!(ev.status, ToolStatus::InProgress);
        let ev: ToolEvent = serde_json::from_value(json!({
            "name": "research", "status": "executing"
        }))
        .unwrap();
        assert_eq!(ev.status, ToolStatus::InProgress);
        assert_eq!(ev.args, json!({}));
    }

    #[test]
    fn null_result_is_absent() {
        let ev: ToolEvent = serde_json::from_value(json!({
            "name": "write_file", "status": "complete", "args": {}, "result": null
        }))
        .unwrap();
        assert!(ev.is_terminal());
        assert!(ev.result.is_none());
    }

    #[test]
    fn planned_todos_skip_malformed_entries() {
        let list = PlannedTodo::parse_list(&json!([
            {"id": "1", "content": "A", "status": "in_progress"},
            {"content": "B"},
            {"status": "pending"},
            "not an object",
            {"id": 7, "content": "C", "status": "done"}
        ]))
        .unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list[0].id.as_deref(), Some("1"));
        assert_eq!(list[0].status, TodoStatus::InProgress);
        assert_eq!(list[1].id, None);
        assert_eq!(list[1].status, TodoStatus::Pending);
        assert_eq!(list[2].id.as_deref(), Some("7"));
        assert_eq!(list[2].status, TodoStatus::Completed);
    }

    #[test]
    fn planned_todos_require_an_array() {
        assert!(PlannedTodo::parse_list(&json!({"todos": []})).is_none());
        assert_eq!(PlannedTodo::parse_list(&json!([])), Some(vec![]));
    }

    #[test]
    fn read_events_reports_bad_lines_and_continues() {
        let input = concat!(
            r#"{"name":"read_todos","status":"pending"}"#, "\n",
            "\n",
            "{not json}\n",
            r#"{"name":"read_todos","status":"complete","result":{"todos":[]}}"#, "\n",
        );
        let results: Vec<_> = read_events(input.as_bytes()).collect();
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        match &results[1] {
            Err(EventParseError::Json { line, .. }) => assert_eq!(*line, 3),
            other => panic!("expected a JSON error, got {other:?}"),
        }
        assert!(results[2].as_ref().unwrap().is_terminal());
    }
}
