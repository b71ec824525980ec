// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Per-tool interpretation of raw `args` / `result` payloads.
//!
//! Every function here is total: a missing field or an unexpected type yields
//! `None` rather than an error, so a malformed payload can only ever cost a
//! card its summary or detail.

use delve_config::DisplayConfig;
use serde_json::Value;

use crate::card::ExpandedDetail;
use crate::events::PlannedTodo;
use crate::text::{basename, first_line, path_arg, truncate};

const PLANNING_MESSAGE: &str = "Updating research plan";
const READ_PLAN_MESSAGE: &str = "Reading research plan";

/// The extractor for one tool name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolExtractor {
    WriteTodos,
    ReadTodos,
    Research,
    WriteFile,
    ReadFile,
    EditFile,
    /// Any tool without a dedicated extractor.
    Default,
}

impl ToolExtractor {
    /// Built-in extractor registered under `name`, if any.
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "write_todos" => Some(ToolExtractor::WriteTodos),
            "read_todos" => Some(ToolExtractor::ReadTodos),
            "research" => Some(ToolExtractor::Research),
            "write_file" => Some(ToolExtractor::WriteFile),
            "read_file" => Some(ToolExtractor::ReadFile),
            "edit_file" => Some(ToolExtractor::EditFile),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ToolExtractor::WriteTodos => "write_todos",
            ToolExtractor::ReadTodos => "read_todos",
            ToolExtractor::Research => "research",
            ToolExtractor::WriteFile => "write_file",
            ToolExtractor::ReadFile => "read_file",
            ToolExtractor::EditFile => "edit_file",
            ToolExtractor::Default => "default",
        }
    }

    pub fn is_known(self) -> bool {
        self != ToolExtractor::Default
    }

    /// Whether a completed call of this tool can change the workspace.
    pub fn changes_workspace(self) -> bool {
        matches!(
            self,
            ToolExtractor::WriteTodos
                | ToolExtractor::Research
                | ToolExtractor::WriteFile
                | ToolExtractor::EditFile
        )
    }

    pub fn display_text(self, tool: &str, args: &Value, limits: &DisplayConfig) -> String {
        match self {
            ToolExtractor::WriteTodos => PLANNING_MESSAGE.to_string(),
            ToolExtractor::ReadTodos => READ_PLAN_MESSAGE.to_string(),
            ToolExtractor::Research => match args.get("query").and_then(Value::as_str) {
                Some(q) => format!("Researching: {}", truncate(q, limits.query_chars)),
                None => "Researching".to_string(),
            },
            ToolExtractor::WriteFile => file_label("Writing", args),
            ToolExtractor::ReadFile => file_label("Reading", args),
            ToolExtractor::EditFile => file_label("Editing", args),
            ToolExtractor::Default => tool.to_string(),
        }
    }

    pub fn result_summary(
        self,
        result: Option<&Value>,
        args: &Value,
        limits: &DisplayConfig,
    ) -> Option<String> {
        match self {
            // The plan arrives as an argument; the result is only an ack.
            // Count what the plan will actually hold, not the raw array.
            ToolExtractor::WriteTodos => {
                let n = PlannedTodo::parse_list(args.get("todos")?)?.len();
                Some(format!("{n} todo(s) updated"))
            }
            ToolExtractor::ReadTodos => {
                let n = result?.get("todos")?.as_array()?.len();
                Some(format!("{n} todo(s) found"))
            }
            ToolExtractor::Research => {
                let result = result?;
                match result.get("sources").and_then(Value::as_array) {
                    Some(sources) => Some(format!("Found {} source(s)", sources.len())),
                    None => Some("Research complete".to_string()),
                }
            }
            // The result is a bare confirmation; preview what was written.
            ToolExtractor::WriteFile => {
                let content = args.get("content")?.as_str()?;
                preview(first_line(content), limits.preview_chars)
            }
            ToolExtractor::ReadFile => {
                let content = result?.get("content")?.as_str()?;
                preview(content, limits.preview_chars)
            }
            ToolExtractor::EditFile => {
                let new = args.get("new_string")?.as_str()?;
                preview(first_line(new), limits.preview_chars)
            }
            ToolExtractor::Default => None,
        }
    }

    pub fn detail(self, args: &Value, result: Option<&Value>) -> Option<ExpandedDetail> {
        match self {
            ToolExtractor::WriteTodos => {
                let todos = PlannedTodo::parse_list(args.get("todos")?)?;
                Some(ExpandedDetail::Todos { todos })
            }
            ToolExtractor::ReadTodos => None,
            ToolExtractor::Research => {
                let query = args.get("query").and_then(Value::as_str).map(str::to_string);
                let summary = result.and_then(research_summary);
                if query.is_none() && summary.is_none() {
                    return None;
                }
                Some(ExpandedDetail::Research { query, summary })
            }
            ToolExtractor::WriteFile => {
                let content = args.get("content")?.as_str()?.to_string();
                Some(ExpandedDetail::File { path: path_arg(args).map(str::to_string), content })
            }
            ToolExtractor::ReadFile => {
                let content = result?.get("content")?.as_str()?.to_string();
                Some(ExpandedDetail::File { path: path_arg(args).map(str::to_string), content })
            }
            ToolExtractor::EditFile => {
                let old = args.get("old_string")?.as_str()?.to_string();
                let new = args.get("new_string")?.as_str()?.to_string();
                Some(ExpandedDetail::Edit { path: path_arg(args).map(str::to_string), old, new })
            }
            ToolExtractor::Default => Some(ExpandedDetail::Raw {
                args: pretty(args),
                result: result.map(pretty),
            }),
        }
    }
}

fn file_label(verb: &str, args: &Value) -> String {
    match path_arg(args) {
        Some(path) => format!("{verb} {}", basename(path)),
        None => format!("{verb} file"),
    }
}

fn preview(text: &str, max: usize) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Some(truncate(text, max))
}

/// `result.summary`, or the result itself when the tool returned plain prose.
fn research_summary(result: &Value) -> Option<String> {
    match result {
        Value::Object(map) => map.get("summary").and_then(Value::as_str).map(str::to_string),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
