// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::collections::HashMap;

use delve_config::{Config, DisplayConfig};
use tracing::warn;

use crate::card::{IconClass, ToolCard};
use crate::events::ToolEvent;
use crate::extract::ToolExtractor;

/// Resolves tool names to extractors and builds render cards.
#[derive(Debug, Clone, Default)]
pub struct ExtractorRegistry {
    aliases: HashMap<String, ToolExtractor>,
    display: DisplayConfig,
}

impl ExtractorRegistry {
    pub fn new(display: DisplayConfig) -> Self {
        Self { aliases: HashMap::new(), display }
    }

    /// Build from config.  Aliases pointing at a name with no built-in
    /// extractor are ignored with a warning.
    pub fn from_config(config: &Config) -> Self {
        let mut reg = Self::new(config.display.clone());
        for (alias, target) in &config.tools.aliases {
            match ToolExtractor::builtin(target) {
                Some(extractor) => reg.alias(alias.clone(), extractor),
                None => warn!(alias = %alias, target = %target, "ignoring alias to unknown tool"),
            }
        }
        reg
    }

    pub fn alias(&mut self, name: impl Into<String>, extractor: ToolExtractor) {
        self.aliases.insert(name.into(), extractor);
    }

    pub fn display(&self) -> &DisplayConfig {
        &self.display
    }

    /// Extractor for `name`; built-in names take precedence over aliases and
    /// anything unmatched falls back to [`ToolExtractor::Default`].
    pub fn resolve(&self, name: &str) -> ToolExtractor {
        ToolExtractor::builtin(name)
            .or_else(|| self.aliases.get(name).copied())
            .unwrap_or(ToolExtractor::Default)
    }

    /// Render descriptor for one event.  Summaries are only produced once the
    /// call is complete; display text and detail are available throughout.
    pub fn card(&self, event: &ToolEvent) -> ToolCard {
        let extractor = self.resolve(&event.name);
        let result = event.result.as_ref();
        let result_summary = if event.is_terminal() {
            extractor.result_summary(result, &event.args, &self.display)
        } else {
            None
        };
        let detail = extractor.detail(&event.args, result);
        ToolCard {
            tool: event.name.clone(),
            status: event.status,
            icon: if extractor.is_known() { IconClass::Known } else { IconClass::Unknown },
            display_text: extractor.display_text(&event.name, &event.args, &self.display),
            result_summary,
            expandable: detail.is_some(),
            detail,
        }
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::card::ExpandedDetail;
    use crate::events::ToolStatus;

    #[test]
    fn builtin_names_resolve() {
        let reg = ExtractorRegistry::default();
        assert_eq!(reg.resolve("write_todos"), ToolExtractor::WriteTodos);
        assert_eq!(reg.resolve("read_file"), ToolExtractor::ReadFile);
        assert_eq!(reg.resolve("nope"), ToolExtractor::Default);
    }

    #[test]
    fn config_aliases_map_to_builtins() {
        let reg = ExtractorRegistry::from_config(&Config::default());
        assert_eq!(reg.resolve("deep_search"), ToolExtractor::Research);
    }

    #[test]
    fn alias_to_unknown_target_is_dropped() {
        let mut cfg = Config::default();
        cfg.tools.aliases.insert("weird".into(), "not_a_tool".into());
        let reg = ExtractorRegistry::from_config(&cfg);
        assert_eq!(reg.resolve("weird"), ToolExtractor::Default);
    }

    #[test]
    fn pending_card_has_no_summary() {
        let reg = ExtractorRegistry::default();
        let ev = ToolEvent::pending("write_file", json!({"path": "a.md", "content": "hello"}));
        let card = reg.card(&ev);
        assert_eq!(card.status, ToolStatus::Pending);
        assert_eq!(card.display_text, "Writing a.md");
        assert!(card.result_summary.is_none());
    }

    #[test]
    fn unknown_tool_card_is_raw_and_expandable() {
        let reg = ExtractorRegistry::default();
        let ev = ToolEvent::complete("unregistered_tool", json!({"x": 1}), Some(json!([1])));
        let card = reg.card(&ev);
        assert_eq!(card.icon, IconClass::Unknown);
        assert_eq!(card.display_text, "unregistered_tool");
        assert!(card.expandable);
        assert!(matches!(card.detail, Some(ExpandedDetail::Raw { .. })));
    }

    #[test]
    fn read_file_with_empty_result_has_no_summary() {
        let reg = ExtractorRegistry::default();
        let ev = ToolEvent::complete("read_file", json!({"path": "a.md"}), Some(json!({})));
        let card = reg.card(&ev);
        assert_eq!(card.icon, IconClass::Known);
        assert!(card.result_summary.is_none());
        assert!(!card.expandable);
    }
}
