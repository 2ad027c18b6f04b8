//! Backup execution
//!
//! [`BackupExecutor`] copies classified assets into the backup root one at a
//! time, verifies each copy's sha256 against the source, and publishes the
//! session manifest once all copies have finished. Copies are strictly
//! sequential so manifest ordering stays deterministic and the publish is
//! race-free within a run.

use crate::integrity::IntegrityHash;
use crate::manifest::{BackupRecord, Manifest, ManifestError};
use bulwark_asset::Asset;
use chrono::Utc;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Naming strategy for backup copies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BackupKey {
    /// `{PRIORITY}_{filename}`: the historical key. Two sources sharing a
    /// file name and priority silently overwrite each other.
    PriorityFilename,
    /// `{PRIORITY}_{8-hex-path-hash}_{filename}`: collision-free default.
    /// Keeps the priority prefix that restoration checks rely on while
    /// making the key unique per source path.
    #[default]
    PathHash,
}

impl BackupKey {
    /// Backup file name for an asset under this strategy
    #[must_use]
    pub fn backup_file_name(&self, asset: &Asset) -> String {
        let file_name = asset.file_name();
        match self {
            BackupKey::PriorityFilename => format!("{}_{}", asset.priority.label(), file_name),
            BackupKey::PathHash => {
                let digest = IntegrityHash::compute(asset.path.to_string_lossy().as_bytes());
                let tag = &digest.to_string()[..8];
                format!("{}_{}_{}", asset.priority.label(), tag, file_name)
            }
        }
    }
}

/// Per-asset copy failures
///
/// Always caught at the asset boundary: a copy error is counted and logged,
/// never aborts the batch.
#[derive(Debug, thiserror::Error)]
pub enum CopyError {
    /// Source could not be read
    #[error("failed to read source {path}: {source}")]
    Source {
        /// Offending source file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// Copy could not be written or read back
    #[error("failed to write backup {path}: {source}")]
    Destination {
        /// Offending backup file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// Written copy does not hash to the source digest
    #[error("integrity mismatch for {path}: source {expected}, backup {actual}")]
    Verification {
        /// Offending backup file
        path: PathBuf,
        /// Digest of the source
        expected: IntegrityHash,
        /// Digest of the written copy
        actual: IntegrityHash,
    },
}

/// Batch-level failures
#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    /// Backup root could not be created
    #[error("failed to create backup root {path}: {source}")]
    CreateRoot {
        /// The backup root
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// Manifest publication failed; no manifest was made visible
    #[error("manifest publication failed: {0}")]
    Manifest(#[from] ManifestError),
}

/// Outcome of one backup batch
#[derive(Debug, Clone)]
pub struct BackupReport {
    /// Verified records, in processing order
    pub records: Vec<BackupRecord>,
    /// Number of assets whose copy failed
    pub failed: usize,
    /// Path of the published manifest
    pub manifest_path: PathBuf,
}

/// Sequential, integrity-verified backup runner
#[derive(Debug, Clone)]
pub struct BackupExecutor {
    backup_root: PathBuf,
    key: BackupKey,
}

impl BackupExecutor {
    /// Create an executor writing into `backup_root`
    #[inline]
    #[must_use]
    pub fn new(backup_root: impl Into<PathBuf>) -> Self {
        Self {
            backup_root: backup_root.into(),
            key: BackupKey::default(),
        }
    }

    /// Override the naming strategy
    #[inline]
    #[must_use]
    pub fn with_key(mut self, key: BackupKey) -> Self {
        self.key = key;
        self
    }

    /// The backup root
    #[inline]
    #[must_use]
    pub fn backup_root(&self) -> &Path {
        &self.backup_root
    }

    /// Where an asset's copy lives under the current strategy
    #[must_use]
    pub fn backup_path_for(&self, asset: &Asset) -> PathBuf {
        self.backup_root.join(self.key.backup_file_name(asset))
    }

    /// Copy, verify and record every asset, then publish the manifest
    ///
    /// Fail-soft per asset: a failed copy is counted and logged. The call
    /// itself only fails when the backup root cannot be created or the
    /// manifest cannot be published.
    ///
    /// # Errors
    /// Returns [`BackupError`] for batch-level failures only.
    pub fn execute(
        &self,
        session_id: &str,
        assets: &[Asset],
    ) -> Result<BackupReport, BackupError> {
        fs::create_dir_all(&self.backup_root).map_err(|source| BackupError::CreateRoot {
            path: self.backup_root.clone(),
            source,
        })?;

        let mut manifest = Manifest::new(session_id);
        let mut failed = 0usize;
        for asset in assets {
            match self.copy_one(asset) {
                Ok(record) => {
                    tracing::debug!(
                        asset = %asset.path.display(),
                        backup = %record.backup_path.display(),
                        hash = %record.integrity_hash.short(),
                        "backup verified"
                    );
                    manifest.push(record);
                }
                Err(err) => {
                    failed += 1;
                    tracing::warn!(
                        asset = %asset.path.display(),
                        error = %err,
                        "backup failed; continuing batch"
                    );
                }
            }
        }

        let manifest_path = manifest.publish(&self.backup_root)?;
        tracing::info!(
            session_id,
            created = manifest.len(),
            failed,
            manifest = %manifest_path.display(),
            "backup session published"
        );
        Ok(BackupReport {
            records: manifest.records,
            failed,
            manifest_path,
        })
    }

    fn copy_one(&self, asset: &Asset) -> Result<BackupRecord, CopyError> {
        let source_hash =
            IntegrityHash::of_file(&asset.path).map_err(|source| CopyError::Source {
                path: asset.path.clone(),
                source,
            })?;

        let backup_path = self.backup_path_for(asset);
        let size_bytes =
            fs::copy(&asset.path, &backup_path).map_err(|source| CopyError::Destination {
                path: backup_path.clone(),
                source,
            })?;
        let backup_hash =
            IntegrityHash::of_file(&backup_path).map_err(|source| CopyError::Destination {
                path: backup_path.clone(),
                source,
            })?;

        if backup_hash != source_hash {
            return Err(CopyError::Verification {
                path: backup_path,
                expected: source_hash,
                actual: backup_hash,
            });
        }

        Ok(BackupRecord {
            asset_id: asset.id.clone(),
            source_path: asset.path.clone(),
            backup_path,
            created_at: Utc::now(),
            integrity_hash: backup_hash,
            size_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bulwark_asset::{Classifier, RuleSet};
    use std::fs;
    use tempfile::TempDir;

    fn scan_workspace(files: &[(&str, &str)]) -> (TempDir, Vec<Asset>) {
        let dir = TempDir::new().unwrap();
        for (rel, contents) in files {
            let path = dir.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, contents).unwrap();
        }
        let assets = Classifier::new(RuleSet::standard()).scan(dir.path());
        (dir, assets)
    }

    #[test]
    fn execute_copies_and_verifies_every_asset() {
        let (_ws, assets) = scan_workspace(&[("a.db", "alpha"), ("b.py", "beta")]);
        let store = TempDir::new().unwrap();
        let executor = BackupExecutor::new(store.path());

        let report = executor.execute("01RUN", &assets).unwrap();
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.failed, 0);

        for record in &report.records {
            let on_disk = IntegrityHash::of_file(&record.backup_path).unwrap();
            assert_eq!(on_disk, record.integrity_hash);
        }
    }

    #[test]
    fn execute_is_idempotent_on_unchanged_sources() {
        let (_ws, assets) = scan_workspace(&[("state.db", "stable contents")]);
        let store = TempDir::new().unwrap();
        let executor = BackupExecutor::new(store.path());

        let first = executor.execute("01A", &assets).unwrap();
        let second = executor.execute("01B", &assets).unwrap();
        assert_eq!(
            first.records[0].integrity_hash,
            second.records[0].integrity_hash
        );
        assert_eq!(first.records[0].backup_path, second.records[0].backup_path);
    }

    #[test]
    fn execute_fails_soft_on_unreadable_source() {
        let (ws, mut assets) = scan_workspace(&[("good.db", "fine"), ("gone.db", "doomed")]);
        fs::remove_file(ws.path().join("gone.db")).unwrap();
        // keep deterministic order: good first
        assets.sort_by_key(|a| a.path.clone());

        let store = TempDir::new().unwrap();
        let report = BackupExecutor::new(store.path())
            .execute("01SOFT", &assets)
            .unwrap();
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.failed, 1);

        let manifest = Manifest::load(&report.manifest_path).unwrap();
        assert_eq!(manifest.len(), 1);
    }

    #[test]
    fn path_hash_key_keeps_same_named_files_distinct() {
        let (_ws, assets) =
            scan_workspace(&[("one/settings.toml", "a = 1"), ("two/settings.toml", "a = 2")]);
        assert_eq!(assets.len(), 2);

        let store = TempDir::new().unwrap();
        let report = BackupExecutor::new(store.path())
            .execute("01HASH", &assets)
            .unwrap();
        assert_eq!(report.records.len(), 2);
        assert_ne!(report.records[0].backup_path, report.records[1].backup_path);
    }

    #[test]
    fn priority_filename_key_reproduces_the_historical_collision() {
        let (_ws, assets) =
            scan_workspace(&[("one/settings.toml", "a = 1"), ("two/settings.toml", "a = 2")]);

        let store = TempDir::new().unwrap();
        let report = BackupExecutor::new(store.path())
            .with_key(BackupKey::PriorityFilename)
            .execute("01COLLIDE", &assets)
            .unwrap();

        // Both copies "succeed" but share one destination: the second wins.
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.records[0].backup_path, report.records[1].backup_path);
    }

    #[test]
    fn backup_names_carry_the_priority_prefix() {
        let (_ws, assets) = scan_workspace(&[("data.db", "x"), ("notes.md", "y")]);
        let executor = BackupExecutor::new("/unused");

        for asset in &assets {
            let name = BackupKey::default().backup_file_name(asset);
            assert!(name.starts_with(&format!("{}_", asset.priority.label())));
            let _ = executor.backup_path_for(asset);
        }
    }
}
