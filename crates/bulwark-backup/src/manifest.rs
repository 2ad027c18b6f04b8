//! Session manifests
//!
//! The manifest is the append-once record of all backups taken within one
//! session. It is written exactly once, after every copy has finished, via
//! a temp-file-plus-rename publish so no reader ever observes a partial
//! manifest.

use crate::integrity::IntegrityHash;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// One verified backup copy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupRecord {
    /// Id of the classified asset
    pub asset_id: String,
    /// Original file
    pub source_path: PathBuf,
    /// Copy inside the backup root
    pub backup_path: PathBuf,
    /// Time the copy was verified
    pub created_at: DateTime<Utc>,
    /// sha256 of the backup bytes; `sha256(read(backup_path))` holds
    /// immediately after the record is written
    pub integrity_hash: IntegrityHash,
    /// Size of the copy
    pub size_bytes: u64,
}

/// Full record of one backup session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Session the records belong to
    pub session_id: String,
    /// Manifest creation time
    pub created_at: DateTime<Utc>,
    /// All verified copies, in processing order
    pub records: Vec<BackupRecord>,
}

impl Manifest {
    /// Start an empty manifest for a session
    #[inline]
    #[must_use]
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            created_at: Utc::now(),
            records: Vec::new(),
        }
    }

    /// Append a verified record
    pub fn push(&mut self, record: BackupRecord) {
        self.records.push(record);
    }

    /// Number of records
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the manifest holds no records
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Manifest file name for a session
    #[must_use]
    pub fn file_name(session_id: &str) -> String {
        format!("backup_manifest_{session_id}.json")
    }

    /// Publish the manifest atomically into the backup root
    ///
    /// Serializes to a dot-prefixed temp file in the same directory, then
    /// renames over the final path. Readers see either no manifest or the
    /// complete one.
    ///
    /// # Errors
    /// Returns [`ManifestError`] if serialization or either I/O step fails.
    pub fn publish(&self, backup_root: &Path) -> Result<PathBuf, ManifestError> {
        let file_name = Self::file_name(&self.session_id);
        let final_path = backup_root.join(&file_name);
        let temp_path = backup_root.join(format!(".{file_name}.tmp"));

        let json = serde_json::to_vec_pretty(self)?;
        fs::write(&temp_path, &json).map_err(|source| ManifestError::Io {
            path: temp_path.clone(),
            source,
        })?;
        fs::rename(&temp_path, &final_path).map_err(|source| ManifestError::Io {
            path: final_path.clone(),
            source,
        })?;
        Ok(final_path)
    }

    /// Load a published manifest
    ///
    /// # Errors
    /// Returns [`ManifestError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let bytes = fs::read(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Errors raised while publishing or loading a manifest
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// JSON encoding/decoding failed
    #[error("manifest serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem step failed
    #[error("manifest I/O failed at {path}: {source}")]
    Io {
        /// Path of the failed step
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(n: u32) -> BackupRecord {
        BackupRecord {
            asset_id: format!("asset{n}"),
            source_path: PathBuf::from(format!("/ws/file{n}.db")),
            backup_path: PathBuf::from(format!("/backups/HIGH_file{n}.db")),
            created_at: Utc::now(),
            integrity_hash: IntegrityHash::compute(format!("file{n}").as_bytes()),
            size_bytes: 64,
        }
    }

    #[test]
    fn publish_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut manifest = Manifest::new("01SESSION");
        manifest.push(record(1));
        manifest.push(record(2));

        let path = manifest.publish(dir.path()).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            "backup_manifest_01SESSION.json"
        );

        let loaded = Manifest::load(&path).unwrap();
        assert_eq!(loaded.session_id, "01SESSION");
        assert_eq!(loaded.records, manifest.records);
    }

    #[test]
    fn publish_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let manifest = Manifest::new("01TMP");
        manifest.publish(dir.path()).unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["backup_manifest_01TMP.json".to_string()]);
    }

    #[test]
    fn publish_overwrites_previous_session_manifest() {
        let dir = TempDir::new().unwrap();
        let mut first = Manifest::new("01SAME");
        first.push(record(1));
        first.publish(dir.path()).unwrap();

        let second = Manifest::new("01SAME");
        let path = second.publish(dir.path()).unwrap();
        let loaded = Manifest::load(&path).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn publish_into_missing_directory_errors() {
        let dir = TempDir::new().unwrap();
        let manifest = Manifest::new("01MISSING");
        let missing = dir.path().join("absent");
        assert!(matches!(
            manifest.publish(&missing),
            Err(ManifestError::Io { .. })
        ));
    }
}
