// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use chrono::{DateTime, Utc};
use delve_tools::TodoItem;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// A file the agent wrote.  The same `path` may appear several times, one
/// entry per revision, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchFile {
    pub path: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceStatus {
    #[default]
    Found,
    Scraped,
    Failed,
}

impl SourceStatus {
    fn parse(s: &str) -> Self {
        match s {
            "found" => SourceStatus::Found,
            "scraped" => SourceStatus::Scraped,
            "failed" => SourceStatus::Failed,
            other => {
                debug!(status = other, "unknown source status; treating as found");
                SourceStatus::Found
            }
        }
    }
}

/// A web source discovered by the research tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub url: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub status: SourceStatus,
}

impl Source {
    /// Lenient parse of one entry of `result.sources`.  Only `url` is
    /// required; a missing title becomes empty and a missing or unknown
    /// status becomes `found`.
    pub fn from_value(value: &Value) -> Option<Source> {
        let Some(url) = value.get("url").and_then(Value::as_str) else {
            debug!(entry = %value, "dropping source without a url");
            return None;
        };
        let url = url.to_string();
        let title = value.get("title").and_then(Value::as_str).unwrap_or_default().to_string();
        let content = value.get("content").and_then(Value::as_str).map(str::to_string);
        let status = value
            .get("status")
            .and_then(Value::as_str)
            .map(SourceStatus::parse)
            .unwrap_or_default();
        Some(Source { url, title, content, status })
    }
}

/// The agent's visible planning and memory artifacts.
///
/// Values are never edited in place; every update builds a new state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceState {
    pub todos: Vec<TodoItem>,
    pub files: Vec<ResearchFile>,
    pub sources: Vec<Source>,
}

impl WorkspaceState {
    pub fn is_empty(&self) -> bool {
        self.todos.is_empty() && self.files.is_empty() && self.sources.is_empty()
    }

    /// Most recent revision of `path`, if any.
    pub fn latest_file(&self, path: &str) -> Option<&ResearchFile> {
        self.files.iter().rev().find(|f| f.path == path)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn source_requires_url() {
        assert!(Source::from_value(&json!({"title": "no url"})).is_none());
        assert!(Source::from_value(&json!("https://x.com")).is_none());
    }

    #[test]
    fn source_status_spellings() {
        let status = |s: &str| Source::from_value(&json!({"url": "u", "status": s})).unwrap().status;
        assert_eq!(status("found"), SourceStatus::Found);
        assert_eq!(status("scraped"), SourceStatus::Scraped);
        assert_eq!(status("failed"), SourceStatus::Failed);
        assert_eq!(status("Scraped"), SourceStatus::Found);
    }

    #[test]
    fn source_defaults() {
        let s = Source::from_value(&json!({"url": "https://x.com", "status": "bogus"})).unwrap();
        assert_eq!(s.title, "");
        assert_eq!(s.content, None);
        assert_eq!(s.status, SourceStatus::Found);
    }

    #[test]
    fn file_serializes_created_at_in_camel_case() {
        let f = ResearchFile {
            path: "a.md".into(),
            content: "x".into(),
            created_at: DateTime::from_timestamp(0, 0).unwrap(),
        };
        let v = serde_json::to_value(&f).unwrap();
        assert!(v.get("createdAt").is_some());
    }

    #[test]
    fn latest_file_picks_last_revision() {
        let at = DateTime::from_timestamp(0, 0).unwrap();
        let state = WorkspaceState {
            files: vec![
                ResearchFile { path: "a.md".into(), content: "v1".into(), created_at: at },
                ResearchFile { path: "b.md".into(), content: "b".into(), created_at: at },
                ResearchFile { path: "a.md".into(), content: "v2".into(), created_at: at },
            ],
            ..Default::default()
        };
        assert_eq!(state.latest_file("a.md").unwrap().content, "v2");
        assert!(state.latest_file("c.md").is_none());
    }
}
