// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

// ── Session / dedup ───────────────────────────────────────────────────────────

fn default_dedup_capacity() -> usize {
    4096
}

fn default_fingerprint_prefix_chars() -> usize {
    128
}

/// How the result payload contributes to a terminal event's fingerprint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FingerprintMode {
    /// SHA-256 over the full serialized result.
    #[default]
    Sha256,
    /// Serialized length plus the first `fingerprint_prefix_chars` characters.
    /// Two completions of the same tool and args whose results agree on both
    /// are treated as the same event.
    Prefix,
}

impl std::fmt::Display for FingerprintMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FingerprintMode::Sha256 => write!(f, "sha256"),
            FingerprintMode::Prefix => write!(f, "prefix"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum number of terminal-event fingerprints remembered per session.
    /// The least recently seen fingerprint is evicted once the cap is hit.
    #[serde(default = "default_dedup_capacity")]
    pub dedup_capacity: usize,
    #[serde(default)]
    pub fingerprint: FingerprintMode,
    /// Only used when `fingerprint = "prefix"`.
    #[serde(default = "default_fingerprint_prefix_chars")]
    pub fingerprint_prefix_chars: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            dedup_capacity: default_dedup_capacity(),
            fingerprint: FingerprintMode::default(),
            fingerprint_prefix_chars: default_fingerprint_prefix_chars(),
        }
    }
}

// ── Display ───────────────────────────────────────────────────────────────────

fn default_preview_chars() -> usize {
    50
}

fn default_query_chars() -> usize {
    50
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Characters kept from file content in a card summary.
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
    /// Characters kept from a research query in a card title.
    #[serde(default = "default_query_chars")]
    pub query_chars: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            preview_chars: default_preview_chars(),
            query_chars: default_query_chars(),
        }
    }
}

// ── Tools ─────────────────────────────────────────────────────────────────────

fn default_aliases() -> BTreeMap<String, String> {
    BTreeMap::from([("deep_search".to_string(), "research".to_string())])
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Alternate tool names mapped onto a built-in tool, e.g.
    ///
    /// ```toml
    /// [tools.aliases]
    /// deep_search = "research"
    /// write_plan  = "write_todos"
    /// ```
    #[serde(default = "default_aliases")]
    pub aliases: BTreeMap<String, String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self { aliases: default_aliases() }
    }
}

// ── Export ────────────────────────────────────────────────────────────────────

fn default_export_dir() -> PathBuf {
    PathBuf::from("research-export")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_export_dir")]
    pub dir: PathBuf,
    /// Replace files that already exist in the export directory.
    #[serde(default)]
    pub overwrite: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { dir: default_export_dir(), overwrite: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_card_limits() {
        let cfg = Config::default();
        assert_eq!(cfg.display.preview_chars, 50);
        assert_eq!(cfg.display.query_chars, 50);
        assert_eq!(cfg.session.fingerprint, FingerprintMode::Sha256);
        assert!(cfg.session.dedup_capacity > 0);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let cfg: Config = toml::from_str(
            r#"[session]
fingerprint = "prefix""#,
        )
        .unwrap();
        assert_eq!(cfg.session.fingerprint, FingerprintMode::Prefix);
        assert_eq!(cfg.session.dedup_capacity, 4096);
        assert_eq!(cfg.session.fingerprint_prefix_chars, 128);
        assert_eq!(cfg.tools.aliases.get("deep_search").map(String::as_str), Some("research"));
    }

    #[test]
    fn explicit_aliases_replace_defaults() {
        let cfg: Config = toml::from_str(
            r#"[tools.aliases]
web_research = "research""#,
        )
        .unwrap();
        assert_eq!(cfg.tools.aliases.len(), 1);
        assert!(cfg.tools.aliases.contains_key("web_research"));
    }
}
