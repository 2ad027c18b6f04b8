//! Workspace scanning and classification
//!
//! [`Classifier::scan`] walks a workspace root, prunes excluded directories,
//! and emits one [`Asset`] per file claimed by the rule catalog. The scan is
//! read-only and never aborts: per-file failures are logged and skipped.

use crate::asset::Asset;
use crate::rules::RuleSet;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directory-name substrings pruned from every scan
///
/// Matching is case-insensitive substring containment on directory names,
/// so `cache` also prunes `.pytest_cache` and the like.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "__pycache__",
    "node_modules",
    ".venv",
    "venv",
    "target",
    "temp",
    "tmp",
    "cache",
];

/// Errors raised for individual entries during a scan
///
/// These never escape [`Classifier::scan`]; they are logged at WARN and the
/// entry is skipped.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The walker failed to descend into or read an entry
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// File metadata could not be read (permissions, races)
    #[error("metadata unavailable for {path}: {source}")]
    Metadata {
        /// The file that could not be inspected
        path: PathBuf,
        /// Underlying walker error
        #[source]
        source: walkdir::Error,
    },
}

/// Rule-driven workspace scanner
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: RuleSet,
    excludes: Vec<String>,
}

impl Classifier {
    /// Create a classifier with the default exclusion list
    #[must_use]
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules,
            excludes: DEFAULT_EXCLUDES.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Extend the exclusion list with additional directory-name substrings
    #[must_use]
    pub fn with_excludes<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in extra {
            let name = name.into().to_lowercase();
            if !name.is_empty() && !self.excludes.contains(&name) {
                self.excludes.push(name);
            }
        }
        self
    }

    /// The rule catalog driving this classifier
    #[inline]
    #[must_use]
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Scan a workspace root and classify every matching file
    ///
    /// Deterministic for an unchanged tree: entries are visited in file-name
    /// order and the result is sorted by path. A file matching several rules
    /// is classified by the first matching rule only. Files the rules do not
    /// claim are ignored. Per-file errors are logged and skipped; the scan
    /// itself cannot fail.
    #[must_use]
    pub fn scan(&self, root: &Path) -> Vec<Asset> {
        let mut found: BTreeMap<PathBuf, Asset> = BTreeMap::new();

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !entry.file_type().is_dir()
                    || !self.is_excluded(&entry.file_name().to_string_lossy())
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(source) => {
                    let err = ScanError::Walk(source);
                    tracing::warn!(error = %err, "skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            let Some(rule) = self.rules.first_match(&name) else {
                continue;
            };

            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(source) => {
                    let err = ScanError::Metadata {
                        path: entry.path().to_path_buf(),
                        source,
                    };
                    tracing::warn!(error = %err, "skipping file without metadata");
                    continue;
                }
            };
            let modified: DateTime<Utc> = metadata
                .modified()
                .map(DateTime::from)
                .unwrap_or_else(|_| Utc::now());

            let path = entry.path().to_path_buf();
            let relative = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
            found.entry(path.clone()).or_insert_with(|| {
                Asset::new(
                    &relative,
                    path,
                    rule.asset_type,
                    rule.priority,
                    metadata.len(),
                    modified,
                )
            });
        }

        tracing::debug!(root = %root.display(), assets = found.len(), "scan complete");
        found.into_values().collect()
    }

    fn is_excluded(&self, dir_name: &str) -> bool {
        let lowered = dir_name.to_lowercase();
        self.excludes.iter().any(|ex| lowered.contains(ex))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{AssetType, Priority};
    use std::fs;
    use tempfile::TempDir;

    fn workspace(files: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for rel in files {
            let path = dir.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, b"content").unwrap();
        }
        dir
    }

    #[test]
    fn scan_classifies_matching_files() {
        let ws = workspace(&["data/state.db", "scripts/run.py", "README.md"]);
        let assets = Classifier::new(RuleSet::standard()).scan(ws.path());

        assert_eq!(assets.len(), 3);
        let db = assets
            .iter()
            .find(|a| a.file_name() == "state.db")
            .unwrap();
        assert_eq!(db.asset_type, AssetType::Database);
        assert_eq!(db.priority, Priority::High);
    }

    #[test]
    fn scan_skips_excluded_directories() {
        let ws = workspace(&[
            "src/main.rs",
            ".git/config.toml",
            "__pycache__/mod.py",
            "node_modules/pkg/index.json",
            "build_cache/state.db",
        ]);
        let assets = Classifier::new(RuleSet::standard()).scan(ws.path());

        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].file_name(), "main.rs");
    }

    #[test]
    fn scan_ignores_unmatched_files() {
        let ws = workspace(&["blob.bin", "core.so"]);
        let assets = Classifier::new(RuleSet::standard()).scan(ws.path());
        assert!(assets.is_empty());
    }

    #[test]
    fn scan_is_deterministic_and_sorted() {
        let ws = workspace(&["b.py", "a.py", "sub/c.py"]);
        let classifier = Classifier::new(RuleSet::standard());
        let first = classifier.scan(ws.path());
        let second = classifier.scan(ws.path());

        assert_eq!(first, second);
        let paths: Vec<_> = first.iter().map(|a| a.path.clone()).collect();
        let mut sorted = paths.clone();
        sorted.sort();
        assert_eq!(paths, sorted);
    }

    #[test]
    fn scan_priorities_are_always_known() {
        let ws = workspace(&["a.db", "b.py", "c.md", "d.toml", "unified_x.sh"]);
        let assets = Classifier::new(RuleSet::standard()).scan(ws.path());

        assert_eq!(assets.len(), 5);
        for asset in &assets {
            assert!(Priority::ALL.contains(&asset.priority));
            assert!(asset.path.is_file());
        }
    }

    #[test]
    fn extra_excludes_prune_artifact_roots() {
        let ws = workspace(&["app.py", "disaster_recovery/backups/HIGH_app.py"]);
        let classifier =
            Classifier::new(RuleSet::standard()).with_excludes(["disaster_recovery"]);
        let assets = classifier.scan(ws.path());

        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].file_name(), "app.py");
    }
}
