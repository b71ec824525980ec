// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Exactly-once projection of tool events into the research workspace.
//!
//! Events flow through [`Deduplicator`] (gate), the extractor registry
//! (interpret), a FIFO [`DeltaQueue`] and finally [`apply`] (merge).
//! [`Session`] wires the stages together and owns their lifetime.

mod dedup;
mod delta;
mod projector;
mod queue;
mod session;
mod workspace;

pub use dedup::{Deduplicator, Fingerprint, Verdict};
pub use delta::{Receipt, WorkspaceDelta};
pub use projector::apply;
pub use queue::DeltaQueue;
pub use session::{Session, SessionStats, SessionUpdate};
pub use workspace::{ResearchFile, Source, SourceStatus, WorkspaceState};

pub use delve_tools::{TodoItem, TodoStatus, ToolCard, ToolEvent, ToolStatus};
