// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use serde_json::Value;

/// Keep at most `max` characters of `s`, appending `...` when anything was cut.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max).collect();
    out.push_str("...");
    out
}

pub fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or("")
}

/// Final path component; both `/` and `\` count as separators.
pub fn basename(path: &str) -> &str {
    let trimmed = path.trim_end_matches(['/', '\\']);
    trimmed.rsplit(['/', '\\']).next().unwrap_or(trimmed)
}

/// The file path argument of a file tool.  Upstream tools name it `path`,
/// `file_path` or `filename`; the first non-empty string wins.
pub fn path_arg(args: &Value) -> Option<&str> {
    ["path", "file_path", "filename"]
        .iter()
        .filter_map(|key| args.get(*key).and_then(Value::as_str))
        .find(|s| !s.trim().is_empty())
}
