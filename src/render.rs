// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Text and JSON printers for `delve replay`.

use std::fmt::Write as _;

use delve_core::{SessionStats, SessionUpdate, Verdict, WorkspaceState};
use delve_tools::{truncate, ToolCard};
use serde::Serialize;

/// Characters of each source's content shown in the text workspace listing.
const SOURCE_PREVIEW_CHARS: usize = 80;

/// One card line, with the expanded detail indented underneath when asked.
pub fn card_text(update: &SessionUpdate, expand: bool) -> String {
    let mut out = update.card.headline();
    if update.verdict == Verdict::Duplicate {
        out.push_str("  (duplicate)");
    }
    if expand {
        if let Some(detail) = &update.card.detail {
            for line in detail.to_markdown().lines() {
                let _ = write!(out, "\n    {line}");
            }
        }
    }
    out
}

pub fn workspace_text(state: &WorkspaceState, stats: &SessionStats) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "## Plan");
    if state.todos.is_empty() {
        let _ = writeln!(out, "(no todos)");
    }
    for todo in &state.todos {
        let _ = writeln!(out, "- {} {}", todo.status.icon(), todo.content);
    }

    let _ = writeln!(out, "\n## Files");
    if state.files.is_empty() {
        let _ = writeln!(out, "(no files)");
    }
    for file in &state.files {
        let _ = writeln!(
            out,
            "- {} ({} bytes, {})",
            file.path,
            file.content.len(),
            file.created_at.format("%Y-%m-%d %H:%M:%S")
        );
    }

    let _ = writeln!(out, "\n## Sources");
    if state.sources.is_empty() {
        let _ = writeln!(out, "(no sources)");
    }
    for source in &state.sources {
        let title = if source.title.is_empty() { &source.url } else { &source.title };
        let _ = writeln!(out, "- [{title}]({}) [{:?}]", source.url, source.status);
        if let Some(content) = source.content.as_deref().filter(|c| !c.is_empty()) {
            let _ = writeln!(out, "  {}", truncate(content.trim(), SOURCE_PREVIEW_CHARS));
        }
    }

    let _ = write!(
        out,
        "\n{} event(s): {} novel, {} duplicate, {} in flight; {} workspace update(s)",
        stats.events, stats.novel, stats.duplicates, stats.passthrough, stats.applied
    );
    out
}

// ── JSON ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CardRecord {
    pub verdict: Verdict,
    pub changed: bool,
    #[serde(flatten)]
    pub card: ToolCard,
}

impl From<SessionUpdate> for CardRecord {
    fn from(update: SessionUpdate) -> Self {
        Self { verdict: update.verdict, changed: update.changed, card: update.card }
    }
}

#[derive(Debug, Serialize)]
pub struct ReplayReport<'a> {
    pub session: &'a str,
    pub stats: SessionStats,
    pub cards: Vec<CardRecord>,
    pub workspace: &'a WorkspaceState,
}
