//! Testing utilities for the bulwark workspace
//!
//! Shared fixtures: a tempdir-backed workspace builder and canned
//! configurations.

#![allow(missing_docs)]

use bulwark_core::BulwarkConfig;
use bulwark_recovery::Scenario;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A disposable workspace on disk
///
/// The backing directory is removed when the fixture drops.
pub struct TempWorkspace {
    dir: TempDir,
}

impl TempWorkspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp workspace"),
        }
    }

    /// Workspace root
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file under the workspace, creating parent directories
    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent directories");
        }
        fs::write(&path, contents).expect("write fixture file");
        path
    }

    /// Default engine configuration rooted at this workspace
    pub fn config(&self) -> BulwarkConfig {
        BulwarkConfig::for_workspace(self.root())
    }
}

impl Default for TempWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// A small scenario for plan-related tests
pub fn sample_scenario() -> Scenario {
    Scenario::new("drive_failure", "Drive Failure", 4.0, 24.0)
        .with_description("The disk holding the workspace died.")
}

/// The five-file workspace used by end-to-end tests: three HIGH priority
/// files (two databases, one unified script) and two MEDIUM priority files.
pub fn seeded_workspace() -> TempWorkspace {
    let ws = TempWorkspace::new();
    ws.write("data/alpha.db", "alpha records");
    ws.write("data/beta.db", "beta records");
    ws.write("unified_backup.py", "print('backup')");
    ws.write("scripts/app.py", "print('app')");
    ws.write("settings.yaml", "mode: protected");
    ws
}
