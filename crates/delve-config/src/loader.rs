// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use crate::Config;

/// Ordered list of config file locations searched from lowest to highest priority.
/// Later files override earlier ones.
fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("/etc/delve/config.toml"));

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".config/delve/config.toml"));
    }
    if let Some(cfg) = dirs::config_dir() {
        paths.push(cfg.join("delve/config.toml"));
    }

    paths.push(PathBuf::from(".delve/config.toml"));
    paths.push(PathBuf::from("delve.toml"));

    paths
}

/// Load configuration by merging all discovered TOML files.
/// The `extra` argument may provide an explicit path (the `--config` flag).
pub fn load(extra: Option<&Path>) -> anyhow::Result<Config> {
    let mut merged = toml::Value::Table(toml::map::Map::new());

    for path in config_search_paths() {
        if path.is_file() {
            debug!(path = %path.display(), "loading config layer");
            merge_toml(&mut merged, read_layer(&path)?);
        }
    }

    if let Some(p) = extra {
        debug!(path = %p.display(), "loading explicit config");
        merge_toml(&mut merged, read_layer(p)?);
    }

    let config: Config = merged.try_into().context("invalid configuration")?;
    Ok(config)
}

fn read_layer(path: &Path) -> anyhow::Result<toml::Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Deep-merge `src` into `dst`; src wins on scalar conflicts.
fn merge_toml(dst: &mut toml::Value, src: toml::Value) {
    match (dst, src) {
        (toml::Value::Table(d), toml::Value::Table(s)) => {
            for (k, v) in s {
                let entry = d.entry(k).or_insert(toml::Value::Table(toml::map::Map::new()));
                merge_toml(entry, v);
            }
        }
        (dst, src) => *dst = src,
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::FingerprintMode;

    fn val(s: &str) -> toml::Value {
        toml::from_str(s).unwrap()
    }

    #[test]
    fn merge_scalar_src_wins() {
        let mut dst = val(r#"x = 1"#);
        merge_toml(&mut dst, val(r#"x = 2"#));
        assert_eq!(dst["x"].as_integer(), Some(2));
    }

    #[test]
    fn merge_nested_tables() {
        let mut dst = val(r#"[session]
dedup_capacity = 10
fingerprint = "prefix""#);
        let src = val(r#"[session]
dedup_capacity = 20"#);
        merge_toml(&mut dst, src);
        assert_eq!(dst["session"]["fingerprint"].as_str(), Some("prefix"));
        assert_eq!(dst["session"]["dedup_capacity"].as_integer(), Some(20));
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        let result = load(Some(Path::new("/tmp/delve_nonexistent_config_xyz.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn explicit_file_overrides_defaults() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, r#"[session]
fingerprint = "prefix"
fingerprint_prefix_chars = 16

[display]
preview_chars = 20"#).unwrap();
        let cfg = load(Some(f.path())).unwrap();
        assert_eq!(cfg.session.fingerprint, FingerprintMode::Prefix);
        assert_eq!(cfg.session.fingerprint_prefix_chars, 16);
        assert_eq!(cfg.display.preview_chars, 20);
        assert_eq!(cfg.display.query_chars, 50);
    }

    #[test]
    fn malformed_value_is_reported() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, r#"[session]
fingerprint = "md5""#).unwrap();
        assert!(load(Some(f.path())).is_err());
    }
}
