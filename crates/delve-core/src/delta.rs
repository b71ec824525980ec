// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use chrono::{DateTime, Utc};
use delve_tools::{path_arg, PlannedTodo, TodoItem, ToolEvent, ToolExtractor};
use serde_json::Value;
use tracing::debug;

use crate::workspace::{ResearchFile, Source};

/// Stamp given to a novel terminal event when it is accepted.
///
/// Generated ids and timestamps come from here rather than from the clock at
/// merge time, which keeps [`crate::apply`] a pure function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Receipt {
    /// Session-wide counter, never reused.
    pub seq: u64,
    pub at: DateTime<Utc>,
}

impl Receipt {
    fn todo_id(&self, index: usize) -> String {
        format!("todo-{}-{}-{}", self.at.timestamp_millis(), self.seq, index)
    }
}

/// How one accepted event changes the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceDelta {
    ReplaceTodos(Vec<TodoItem>),
    AppendSources(Vec<Source>),
    AppendFile(ResearchFile),
    /// Apply a string replacement to the latest revision of `path` and
    /// append the result as a new revision.
    EditFile {
        path: String,
        old: String,
        new: String,
        replace_all: bool,
        at: DateTime<Utc>,
    },
}

impl WorkspaceDelta {
    /// Interpret a completed call.  Returns `None` for tools that never touch
    /// the workspace, for non-terminal events and for payloads too malformed
    /// to act on.
    pub fn derive(extractor: ToolExtractor, event: &ToolEvent, receipt: &Receipt) -> Option<Self> {
        if !event.is_terminal() {
            return None;
        }
        let delta = match extractor {
            ToolExtractor::WriteTodos => replace_todos(&event.args, receipt),
            ToolExtractor::Research => append_sources(event.result.as_ref()),
            ToolExtractor::WriteFile | ToolExtractor::EditFile if reports_error(event.result.as_ref()) => {
                debug!(tool = %event.name, "tool reported an error; workspace left as is");
                return None;
            }
            ToolExtractor::WriteFile => append_file(&event.args, receipt),
            ToolExtractor::EditFile => edit_file(&event.args, receipt),
            ToolExtractor::ReadTodos | ToolExtractor::ReadFile | ToolExtractor::Default => return None,
        };
        if delta.is_none() {
            debug!(tool = %event.name, "payload does not yield a workspace change");
        }
        delta
    }

    pub fn kind(&self) -> &'static str {
        match self {
            WorkspaceDelta::ReplaceTodos(_) => "replace_todos",
            WorkspaceDelta::AppendSources(_) => "append_sources",
            WorkspaceDelta::AppendFile(_) => "append_file",
            WorkspaceDelta::EditFile { .. } => "edit_file",
        }
    }
}

/// File tools answer with a plain string; failures start with `Error`.
fn reports_error(result: Option<&Value>) -> bool {
    result
        .and_then(Value::as_str)
        .is_some_and(|text| text.trim_start().starts_with("Error"))
}

fn replace_todos(args: &Value, receipt: &Receipt) -> Option<WorkspaceDelta> {
    let planned = PlannedTodo::parse_list(args.get("todos")?)?;
    let todos = planned
        .into_iter()
        .enumerate()
        .map(|(i, t)| TodoItem {
            id: t.id.unwrap_or_else(|| receipt.todo_id(i)),
            content: t.content,
            status: t.status,
        })
        .collect();
    Some(WorkspaceDelta::ReplaceTodos(todos))
}

fn append_sources(result: Option<&Value>) -> Option<WorkspaceDelta> {
    let sources: Vec<Source> = result?
        .get("sources")?
        .as_array()?
        .iter()
        .filter_map(Source::from_value)
        .collect();
    if sources.is_empty() {
        return None;
    }
    Some(WorkspaceDelta::AppendSources(sources))
}

fn append_file(args: &Value, receipt: &Receipt) -> Option<WorkspaceDelta> {
    let path = path_arg(args)?.to_string();
    let content = args.get("content")?.as_str()?.to_string();
    Some(WorkspaceDelta::AppendFile(ResearchFile { path, content, created_at: receipt.at }))
}

fn edit_file(args: &Value, receipt: &Receipt) -> Option<WorkspaceDelta> {
    let path = path_arg(args)?.to_string();
    let old = args.get("old_string")?.as_str()?.to_string();
    let new = args.get("new_string")?.as_str()?.to_string();
    if old.is_empty() {
        return None;
    }
    let replace_all = args.get("replace_all").and_then(Value::as_bool).unwrap_or(false);
    Some(WorkspaceDelta::EditFile { path, old, new, replace_all, at: receipt.at })
}
