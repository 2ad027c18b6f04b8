//! Procedure self-testing
//!
//! [`ProcedureTester::run_all`] runs a fixed battery of checks against the
//! current backup store. Every check is wrapped with duration measurement
//! and fails closed: an internal error is recorded as FAILED, never
//! silently dropped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime};

/// Outcome of one self-check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestStatus {
    /// The check passed
    Passed,
    /// The check failed, or raised internally
    Failed,
}

/// One recorded self-check result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    /// Name of the check
    pub test_name: String,
    /// Outcome
    pub result: TestStatus,
    /// Wall-clock duration of the check
    pub duration_seconds: f64,
    /// When the check finished
    pub timestamp: DateTime<Utc>,
}

impl TestResult {
    /// Whether the check passed
    #[inline]
    #[must_use]
    pub fn passed(&self) -> bool {
        self.result == TestStatus::Passed
    }
}

/// Tuning for the self-check battery
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TesterConfig {
    /// How many most-recent backup files the integrity check samples
    pub integrity_sample: usize,
    /// Assumed restore cost per backup file, in seconds
    pub per_file_restore_secs: u64,
    /// Ceiling the estimated restore duration must stay under, in hours
    pub restore_ceiling_hours: f64,
}

impl Default for TesterConfig {
    fn default() -> Self {
        Self {
            integrity_sample: 5,
            per_file_restore_secs: 30,
            restore_ceiling_hours: 4.0,
        }
    }
}

/// Internal errors raised by a check
///
/// Converted to a FAILED result at the check boundary.
#[derive(Debug, thiserror::Error)]
pub enum TestExecutionError {
    /// The backup store could not be listed
    #[error("failed to read backup store {path}: {source}")]
    Store {
        /// The backup root
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },
}

/// Errors raised while persisting a session's results
#[derive(Debug, thiserror::Error)]
pub enum ResultsWriteError {
    /// JSON encoding failed
    #[error("failed to serialize test results: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem step failed
    #[error("failed to write test results {path}: {source}")]
    Io {
        /// Offending path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },
}

struct BackupFile {
    path: PathBuf,
    len: u64,
    modified: SystemTime,
}

/// Fixed self-check battery over a backup store
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcedureTester {
    config: TesterConfig,
}

impl ProcedureTester {
    /// Create a tester
    #[inline]
    #[must_use]
    pub fn new(config: TesterConfig) -> Self {
        Self { config }
    }

    /// Run every check against the backup store
    ///
    /// Always returns one result per check, in a fixed order.
    #[must_use]
    pub fn run_all(&self, backup_root: &Path) -> Vec<TestResult> {
        vec![
            run_check("backup_integrity", || {
                self.check_backup_integrity(backup_root)
            }),
            run_check("recovery_time_estimate", || {
                self.check_recovery_time(backup_root)
            }),
            run_check("asset_restoration", || {
                check_asset_restoration(backup_root)
            }),
        ]
    }

    /// Sample the most recent backups; fail on an empty store or any
    /// missing/zero-length file
    fn check_backup_integrity(&self, backup_root: &Path) -> Result<bool, TestExecutionError> {
        let mut files = backup_files(backup_root)?;
        if files.is_empty() {
            return Ok(false);
        }
        files.sort_by(|a, b| b.modified.cmp(&a.modified));
        for file in files.iter().take(self.config.integrity_sample) {
            if !file.path.is_file() || file.len == 0 {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Estimated restore duration must stay under the configured ceiling
    fn check_recovery_time(&self, backup_root: &Path) -> Result<bool, TestExecutionError> {
        let count = backup_files(backup_root)?.len() as u64;
        let estimate_hours =
            (count * self.config.per_file_restore_secs) as f64 / 3600.0;
        tracing::debug!(count, estimate_hours, "restore time estimated");
        Ok(estimate_hours < self.config.restore_ceiling_hours)
    }
}

/// At least one HIGH priority backup must exist
fn check_asset_restoration(backup_root: &Path) -> Result<bool, TestExecutionError> {
    Ok(backup_files(backup_root)?
        .iter()
        .any(|f| f.path.file_name().is_some_and(|n| {
            n.to_string_lossy().starts_with("HIGH_")
        })))
}

fn run_check(
    name: &str,
    check: impl FnOnce() -> Result<bool, TestExecutionError>,
) -> TestResult {
    let start = Instant::now();
    let result = match check() {
        Ok(true) => TestStatus::Passed,
        Ok(false) => TestStatus::Failed,
        Err(err) => {
            tracing::error!(check = name, error = %err, "check raised; recording failure");
            TestStatus::Failed
        }
    };
    TestResult {
        test_name: name.to_string(),
        result,
        duration_seconds: start.elapsed().as_secs_f64(),
        timestamp: Utc::now(),
    }
}

/// List backup copies in the store, excluding manifests and temp files
fn backup_files(backup_root: &Path) -> Result<Vec<BackupFile>, TestExecutionError> {
    let entries = fs::read_dir(backup_root).map_err(|source| TestExecutionError::Store {
        path: backup_root.to_path_buf(),
        source,
    })?;

    let mut out = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| TestExecutionError::Store {
            path: backup_root.to_path_buf(),
            source,
        })?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with("backup_manifest_") || name.starts_with('.') {
            continue;
        }
        let metadata = entry.metadata().map_err(|source| TestExecutionError::Store {
            path: entry.path(),
            source,
        })?;
        if !metadata.is_file() {
            continue;
        }
        out.push(BackupFile {
            path: entry.path(),
            len: metadata.len(),
            modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
        });
    }
    Ok(out)
}

/// Results file name for a session
#[must_use]
pub fn results_file_name(session_id: &str) -> String {
    format!("recovery_test_{session_id}.json")
}

/// Persist a session's results under the logs root
///
/// # Errors
/// Returns [`ResultsWriteError`] if the directory or file cannot be written.
pub fn write_results(
    logs_root: &Path,
    session_id: &str,
    results: &[TestResult],
) -> Result<PathBuf, ResultsWriteError> {
    fs::create_dir_all(logs_root).map_err(|source| ResultsWriteError::Io {
        path: logs_root.to_path_buf(),
        source,
    })?;
    let path = logs_root.join(results_file_name(session_id));
    let json = serde_json::to_vec_pretty(results)?;
    fs::write(&path, &json).map_err(|source| ResultsWriteError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}
