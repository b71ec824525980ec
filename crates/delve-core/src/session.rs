// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::sync::Arc;

use chrono::{DateTime, Utc};
use delve_config::Config;
use delve_tools::{ExtractorRegistry, ToolCard, ToolEvent};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::dedup::{Deduplicator, Verdict};
use crate::delta::{Receipt, WorkspaceDelta};
use crate::projector::apply;
use crate::queue::DeltaQueue;
use crate::workspace::WorkspaceState;

/// What the presentation layer receives for each ingested event.
#[derive(Debug, Clone)]
pub struct SessionUpdate {
    pub card: ToolCard,
    pub verdict: Verdict,
    pub snapshot: Arc<WorkspaceState>,
    /// True when this event produced a new workspace state.
    pub changed: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub events: u64,
    pub novel: u64,
    pub duplicates: u64,
    pub passthrough: u64,
    /// Deltas that actually changed the workspace.
    pub applied: u64,
}

/// One browsing session: the dedup gate, the pending-delta queue and the
/// current workspace snapshot.
///
/// There is exactly one writer.  Each snapshot is an immutable `Arc`, so a
/// reader holding an older snapshot never observes a partial update and can
/// detect change with [`Arc::ptr_eq`].
#[derive(Debug)]
pub struct Session {
    pub id: String,
    registry: ExtractorRegistry,
    dedup: Deduplicator,
    queue: DeltaQueue,
    state: Arc<WorkspaceState>,
    next_seq: u64,
    stats: SessionStats,
}

impl Session {
    pub fn new(config: &Config) -> Self {
        Self::with_parts(
            ExtractorRegistry::from_config(config),
            Deduplicator::from_config(&config.session),
        )
    }

    pub fn with_parts(registry: ExtractorRegistry, dedup: Deduplicator) -> Self {
        let id = Uuid::new_v4().to_string();
        debug!(session = %id, "session started");
        Self {
            id,
            registry,
            dedup,
            queue: DeltaQueue::new(),
            state: Arc::new(WorkspaceState::default()),
            next_seq: 0,
            stats: SessionStats::default(),
        }
    }

    pub fn snapshot(&self) -> Arc<WorkspaceState> {
        Arc::clone(&self.state)
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Gate and interpret one event, queueing its delta (if any) without
    /// merging it.  Call [`Session::tick`] to merge.
    pub fn handle(&mut self, event: &ToolEvent) -> (ToolCard, Verdict) {
        self.handle_at(event, Utc::now())
    }

    /// Like [`Session::handle`] with an explicit receipt time.
    pub fn handle_at(&mut self, event: &ToolEvent, at: DateTime<Utc>) -> (ToolCard, Verdict) {
        self.stats.events += 1;
        let extractor = self.registry.resolve(&event.name);
        let card = self.registry.card(event);
        let verdict = self.dedup.check(event);
        trace!(tool = %event.name, status = %event.status, ?verdict, "tool event");

        match verdict {
            Verdict::Novel => {
                self.stats.novel += 1;
                let receipt = Receipt { seq: self.next_seq, at };
                self.next_seq += 1;
                if extractor.changes_workspace() {
                    if let Some(delta) = WorkspaceDelta::derive(extractor, event, &receipt) {
                        trace!(kind = delta.kind(), seq = receipt.seq, "queued workspace delta");
                        self.queue.push(delta);
                    }
                }
            }
            Verdict::Duplicate => self.stats.duplicates += 1,
            Verdict::Passthrough => self.stats.passthrough += 1,
        }
        (card, verdict)
    }

    /// Merge every queued delta in arrival order.  Returns how many of them
    /// changed the workspace.
    pub fn tick(&mut self) -> usize {
        let mut applied = 0;
        while let Some(delta) = self.queue.pop() {
            let next = apply(&delta, &self.state);
            if next == *self.state {
                debug!(kind = delta.kind(), "delta left the workspace unchanged");
                continue;
            }
            self.state = Arc::new(next);
            applied += 1;
        }
        self.stats.applied += applied as u64;
        applied
    }

    /// Handle one event and merge its effect within the same tick.
    pub fn ingest(&mut self, event: &ToolEvent) -> SessionUpdate {
        self.ingest_at(event, Utc::now())
    }

    pub fn ingest_at(&mut self, event: &ToolEvent, at: DateTime<Utc>) -> SessionUpdate {
        let (card, verdict) = self.handle_at(event, at);
        let changed = self.tick() > 0;
        SessionUpdate { card, verdict, snapshot: self.snapshot(), changed }
    }

    /// Drive the session from a channel of tool events, publishing one update
    /// per event.  Stops when either side of the channel closes and hands the
    /// session back so its final state can be inspected.
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<ToolEvent>,
        updates: mpsc::Sender<SessionUpdate>,
    ) -> Self {
        while let Some(event) = events.recv().await {
            let update = self.ingest(&event);
            if updates.send(update).await.is_err() {
                debug!(session = %self.id, "update receiver dropped; stopping");
                break;
            }
        }
        self
    }

    /// End the current session and start a fresh one: empty workspace, empty
    /// dedup set.  Receipt sequence numbers keep counting so generated ids
    /// are never reused.
    pub fn reset(&mut self) {
        debug!(session = %self.id, stats = ?self.stats, "session ended");
        self.dedup.reset();
        self.queue.clear();
        self.state = Arc::new(WorkspaceState::default());
        self.stats = SessionStats::default();
        self.id = Uuid::new_v4().to_string();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}
