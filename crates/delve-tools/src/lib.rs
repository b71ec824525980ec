// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Tool-call events as delivered by the remote research agent, and the
//! per-tool extractors that turn their raw `args` / `result` payloads into
//! display cards.

mod events;
mod card;
mod extract;
mod registry;
mod text;

pub use card::{ExpandedDetail, IconClass, ToolCard};
pub use events::{read_events, EventParseError, PlannedTodo, TodoItem, TodoStatus, ToolEvent, ToolStatus};
pub use extract::ToolExtractor;
pub use registry::ExtractorRegistry;
pub use text::{basename, first_line, path_arg, truncate};
