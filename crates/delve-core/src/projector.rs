// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use crate::delta::WorkspaceDelta;
use crate::workspace::{ResearchFile, WorkspaceState};

/// Merge `delta` into `previous`, returning the next state.
///
/// Pure: the same inputs always produce the same output.  Re-applying a
/// `ReplaceTodos` delta is idempotent; the append deltas are not, which is
/// why only novel events reach this function.
pub fn apply(delta: &WorkspaceDelta, previous: &WorkspaceState) -> WorkspaceState {
    match delta {
        WorkspaceDelta::ReplaceTodos(todos) => WorkspaceState {
            todos: todos.clone(),
            files: previous.files.clone(),
            sources: previous.sources.clone(),
        },
        WorkspaceDelta::AppendSources(sources) => {
            let mut next = previous.clone();
            next.sources.extend(sources.iter().cloned());
            next
        }
        WorkspaceDelta::AppendFile(file) => {
            let mut next = previous.clone();
            next.files.push(file.clone());
            next
        }
        WorkspaceDelta::EditFile { path, old, new, replace_all, at } => {
            let Some(base) = previous.latest_file(path) else {
                return previous.clone();
            };
            // A single replacement needs a unique match, as the edit tool
            // itself refuses ambiguous edits.
            let occurrences = base.content.matches(old.as_str()).count();
            if occurrences == 0 || (occurrences > 1 && !*replace_all) {
                return previous.clone();
            }
            let content = base.content.replace(old.as_str(), new);
            let mut next = previous.clone();
            next.files.push(ResearchFile { path: path.clone(), content, created_at: *at });
            next
        }
    }
}
