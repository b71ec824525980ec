// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Render descriptors handed to the presentation layer, one per event.

use serde::Serialize;

use crate::events::{PlannedTodo, ToolStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IconClass {
    Known,
    Unknown,
}

/// Content shown when a tool card is expanded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExpandedDetail {
    Todos { todos: Vec<PlannedTodo> },
    Research { query: Option<String>, summary: Option<String> },
    File { path: Option<String>, content: String },
    Edit { path: Option<String>, old: String, new: String },
    /// Verbatim args / result of a tool without a dedicated extractor.
    Raw { args: String, result: Option<String> },
}

impl ExpandedDetail {
    pub fn to_markdown(&self) -> String {
        match self {
            ExpandedDetail::Todos { todos } => {
                if todos.is_empty() {
                    return "_No todos._\n".to_string();
                }
                let mut out = String::new();
                for todo in todos {
                    out.push_str(&format!("- {} {}\n", todo.status.icon(), todo.content));
                }
                out
            }
            ExpandedDetail::Research { query, summary } => {
                let mut out = String::new();
                if let Some(q) = query {
                    out.push_str(&format!("**Query:** {q}\n\n"));
                }
                if let Some(s) = summary {
                    out.push_str(s);
                    out.push('\n');
                }
                out
            }
            ExpandedDetail::File { path, content } => {
                let mut out = String::new();
                if let Some(p) = path {
                    out.push_str(&format!("**{p}**\n\n"));
                }
                out.push_str(&format!("```\n{content}\n```\n"));
                out
            }
            ExpandedDetail::Edit { path, old, new } => {
                let mut out = String::new();
                if let Some(p) = path {
                    out.push_str(&format!("**{p}**\n\n"));
                }
                out.push_str(&format!("```diff\n{}\n{}\n```\n", prefix_lines(old, "- "), prefix_lines(new, "+ ")));
                out
            }
            ExpandedDetail::Raw { args, result } => {
                let mut out = format!("**Args**\n```json\n{args}\n```\n");
                if let Some(r) = result {
                    out.push_str(&format!("\n**Result**\n```json\n{r}\n```\n"));
                }
                out
            }
        }
    }
}

fn prefix_lines(text: &str, prefix: &str) -> String {
    text.lines().map(|l| format!("{prefix}{l}")).collect::<Vec<_>>().join("\n")
}

/// Everything needed to draw one tool-call card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolCard {
    pub tool: String,
    pub status: ToolStatus,
    pub icon: IconClass,
    pub display_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_summary: Option<String>,
    pub expandable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<ExpandedDetail>,
}

impl ToolCard {
    /// One-line rendering used by the text printer.
    pub fn headline(&self) -> String {
        let marker = match (self.icon, self.status) {
            (_, ToolStatus::Pending | ToolStatus::InProgress) => "…",
            (IconClass::Known, ToolStatus::Complete) => "✓",
            (IconClass::Unknown, ToolStatus::Complete) => "•",
        };
        match &self.result_summary {
            Some(summary) => format!("{marker} {}: {summary}", self.display_text),
            None => format!("{marker} {}", self.display_text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::TodoStatus;

    #[test]
    fn todo_detail_renders_status_icons() {
        let detail = ExpandedDetail::Todos {
            todos: vec![
                PlannedTodo { id: None, content: "Plan".into(), status: TodoStatus::Completed },
                PlannedTodo { id: None, content: "Search".into(), status: TodoStatus::InProgress },
            ],
        };
        let md = detail.to_markdown();
        assert!(md.contains("- ✓ Plan"));
        assert!(md.contains("- → Search"));
    }

    #[test]
    fn raw_detail_omits_missing_result() {
        let md = ExpandedDetail::Raw { args: "{}".into(), result: None }.to_markdown();
        assert!(md.contains("**Args**"));
        assert!(!md.contains("**Result**"));
    }

    #[test]
    fn headline_includes_summary_when_present() {
        let card = ToolCard {
            tool: "read_todos".into(),
            status: ToolStatus::Complete,
            icon: IconClass::Known,
            display_text: "Reading research plan".into(),
            result_summary: Some("2 todo(s) found".into()),
            expandable: false,
            detail: None,
        };
        assert_eq!(card.headline(), "✓ Reading research plan: 2 todo(s) found");
    }
}
