// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::collections::VecDeque;

use crate::delta::WorkspaceDelta;

/// Workspace deltas waiting to be merged.  Preserves FIFO ordering.
#[derive(Debug, Default)]
pub struct DeltaQueue(VecDeque<WorkspaceDelta>);

impl DeltaQueue {
    pub fn new() -> Self { Self(VecDeque::new()) }

    pub fn push(&mut self, delta: WorkspaceDelta) { self.0.push_back(delta); }

    pub fn pop(&mut self) -> Option<WorkspaceDelta> { self.0.pop_front() }

    pub fn peek(&self) -> Option<&WorkspaceDelta> { self.0.front() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn clear(&mut self) { self.0.clear(); }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use super::*;
    use crate::workspace::ResearchFile;

    fn append(content: &str) -> WorkspaceDelta {
        WorkspaceDelta::AppendFile(ResearchFile {
            path: "a.md".into(),
            content: content.into(),
            created_at: DateTime::from_timestamp(0, 0).unwrap(),
        })
    }

    fn content_of(delta: WorkspaceDelta) -> String {
        match delta {
            WorkspaceDelta::AppendFile(f) => f.content,
            other => panic!("unexpected delta {other:?}"),
        }
    }

    #[test]
    fn new_queue_is_empty() {
        let q = DeltaQueue::new();
        assert!(q.is_empty());
        assert_eq!(q.len(), 0);
    }

    #[test]
    fn pop_returns_fifo_order() {
        let mut q = DeltaQueue::new();
        q.push(append("first"));
        q.push(append("second"));
        q.push(append("third"));

        assert_eq!(content_of(q.pop().unwrap()), "first");
        assert_eq!(content_of(q.pop().unwrap()), "second");
        assert_eq!(content_of(q.pop().unwrap()), "third");
        assert!(q.pop().is_none());
    }

    #[test]
    fn peek_does_not_consume() {
        let mut q = DeltaQueue::new();
        q.push(append("peek-me"));
        assert_eq!(q.peek().map(WorkspaceDelta::kind), Some("append_file"));
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn clear_drops_pending_deltas() {
        let mut q = DeltaQueue::new();
        q.push(append("x"));
        q.clear();
        assert!(q.pop().is_none());
    }
}
