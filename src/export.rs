// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Materialize workspace files on disk, one file per basename.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use delve_core::ResearchFile;
use delve_tools::basename;
use tracing::{debug, warn};

/// Write the latest revision of each file into `dir`, named by the basename
/// of its workspace path.  Returns the paths written, sorted by name.
pub fn export_files(files: &[ResearchFile], dir: &Path, overwrite: bool) -> anyhow::Result<Vec<PathBuf>> {
    // Later revisions replace earlier ones with the same name.
    let mut latest: BTreeMap<&str, &ResearchFile> = BTreeMap::new();
    for file in files {
        let name = basename(&file.path);
        if name.is_empty() || name == "." || name == ".." {
            warn!(path = %file.path, "skipping file without a usable name");
            continue;
        }
        latest.insert(name, file);
    }

    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating export directory {}", dir.display()))?;

    let targets: Vec<(PathBuf, &ResearchFile)> =
        latest.into_iter().map(|(name, file)| (dir.join(name), file)).collect();
    // All conflicts are reported before anything is written.
    if !overwrite {
        if let Some((target, _)) = targets.iter().find(|(target, _)| target.exists()) {
            bail!("{} already exists (use --overwrite to replace it)", target.display());
        }
    }

    let mut written = Vec::with_capacity(targets.len());
    for (target, file) in targets {
        std::fs::write(&target, &file.content)
            .with_context(|| format!("writing {}", target.display()))?;
        debug!(from = %file.path, to = %target.display(), "exported file");
        written.push(target);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use super::*;

    fn file(path: &str, content: &str) -> ResearchFile {
        ResearchFile {
            path: path.into(),
            content: content.into(),
            created_at: DateTime::from_timestamp(0, 0).unwrap(),
        }
    }

    #[test]
    fn latest_revision_wins() {
        let dir = tempfile::tempdir().unwrap();
        let files = [
            file("/reports/final_report.md", "draft"),
            file("notes/a.md", "a"),
            file("/reports/final_report.md", "final"),
        ];
        let written = export_files(&files, dir.path(), false).unwrap();
        assert_eq!(written.len(), 2);
        let report = std::fs::read_to_string(dir.path().join("final_report.md")).unwrap();
        assert_eq!(report, "final");
    }

    #[test]
    fn existing_file_requires_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.md"), "old").unwrap();
        let files = [file("a.md", "new")];
        assert!(export_files(&files, dir.path(), false).is_err());
        export_files(&files, dir.path(), true).unwrap();
        assert_eq!(std::fs::read_to_string(dir.path().join("a.md")).unwrap(), "new");
    }

    #[test]
    fn conflict_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.md"), "old").unwrap();
        let files = [file("a.md", "new a"), file("b.md", "new b")];
        assert!(export_files(&files, dir.path(), false).is_err());
        assert!(!dir.path().join("a.md").exists());
        assert_eq!(std::fs::read_to_string(dir.path().join("b.md")).unwrap(), "old");
    }

    #[test]
    fn parent_components_are_stripped() {
        let dir = tempfile::tempdir().unwrap();
        let written = export_files(&[file("../../etc/passwd.md", "x"), file("..", "y")], dir.path(), false).unwrap();
        assert_eq!(written, vec![dir.path().join("passwd.md")]);
    }
}
