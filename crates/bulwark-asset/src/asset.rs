//! Typed asset records
//!
//! Provides [`Asset`], the classified description of a single workspace file,
//! together with its [`AssetType`] and [`Priority`]. Assets are computed
//! fresh on every scan and are never persisted as authoritative state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};

/// Functional category of a protected asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetType {
    /// Database files (the highest-value state)
    Database,
    /// Individual scripts and program sources
    CoreScript,
    /// Consolidated "unified" entry-point scripts
    UnifiedScript,
    /// Configuration files
    Config,
    /// Documentation
    Documentation,
    /// Dependency declarations and lockfiles
    Dependency,
}

impl AssetType {
    /// Stable label used in serialized artifacts
    #[inline]
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            AssetType::Database => "DATABASE",
            AssetType::CoreScript => "CORE_SCRIPT",
            AssetType::UnifiedScript => "UNIFIED_SCRIPT",
            AssetType::Config => "CONFIG",
            AssetType::Documentation => "DOCUMENTATION",
            AssetType::Dependency => "DEPENDENCY",
        }
    }
}

impl Display for AssetType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Protection priority of an asset
///
/// Every classified asset carries exactly one of these three levels; the
/// level becomes the prefix of the asset's backup file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    /// Must be restorable first
    High,
    /// Restorable after the high tier
    Medium,
    /// Nice to have back
    Low,
}

impl Priority {
    /// All priority levels, highest first
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    /// Stable label used in backup file names and serialized artifacts
    #[inline]
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A classified workspace file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Identifier derived from the workspace-relative path
    pub id: String,
    /// Functional category
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    /// Absolute path of the source file
    pub path: PathBuf,
    /// Protection priority
    pub priority: Priority,
    /// File size at scan time
    pub size_bytes: u64,
    /// Last modification time at scan time
    pub last_modified: DateTime<Utc>,
}

impl Asset {
    /// Create an asset record for a scanned file
    ///
    /// `relative` is the path within the scanned workspace; it determines the
    /// asset id so the id stays stable when the workspace root moves.
    #[must_use]
    pub fn new(
        relative: &Path,
        path: PathBuf,
        asset_type: AssetType,
        priority: Priority,
        size_bytes: u64,
        last_modified: DateTime<Utc>,
    ) -> Self {
        Self {
            id: asset_id(relative),
            asset_type,
            path,
            priority,
            size_bytes,
            last_modified,
        }
    }

    /// File name of the underlying source file
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unnamed".to_string())
    }
}

/// Derive an asset id from a workspace-relative path
///
/// First 12 hex characters of the sha256 of the path string. Deterministic
/// across scans of an unchanged tree.
#[must_use]
pub fn asset_id(relative: &Path) -> String {
    let mut hasher = Sha256::new();
    hasher.update(relative.to_string_lossy().as_bytes());
    hex::encode(&hasher.finalize()[..6])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_id_deterministic() {
        let a = asset_id(Path::new("data/alpha.db"));
        let b = asset_id(Path::new("data/alpha.db"));
        assert_eq!(a, b);
        assert_eq!(a.len(), 12);
    }

    #[test]
    fn asset_id_distinguishes_paths() {
        assert_ne!(
            asset_id(Path::new("data/alpha.db")),
            asset_id(Path::new("archive/alpha.db"))
        );
    }

    #[test]
    fn priority_labels() {
        assert_eq!(Priority::High.label(), "HIGH");
        assert_eq!(Priority::Medium.to_string(), "MEDIUM");
        assert_eq!(Priority::ALL.len(), 3);
    }

    #[test]
    fn asset_type_serializes_screaming_case() {
        let json = serde_json::to_string(&AssetType::CoreScript).unwrap();
        assert_eq!(json, "\"CORE_SCRIPT\"");
        let json = serde_json::to_string(&AssetType::Database).unwrap();
        assert_eq!(json, "\"DATABASE\"");
    }

    #[test]
    fn asset_file_name() {
        let asset = Asset::new(
            Path::new("scripts/run.sh"),
            PathBuf::from("/ws/scripts/run.sh"),
            AssetType::CoreScript,
            Priority::Medium,
            10,
            Utc::now(),
        );
        assert_eq!(asset.file_name(), "run.sh");
    }
}
