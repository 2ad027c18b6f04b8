//! Session accounting
//!
//! One [`Session`] is created when the orchestrator starts, owned
//! exclusively by it for the run's duration, finalized at the end, and
//! persisted as the run's report artifact.

use crate::error::ReportError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use ulid::Ulid;

/// Unique session identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Ulid);

impl SessionId {
    /// Generate a new session ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-phase counters aggregated over one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCounts {
    /// Assets the classifier discovered
    pub assets_found: usize,
    /// Assets successfully backed up this run
    pub assets_protected: usize,
    /// Verified backup copies created
    pub backups_created: usize,
    /// Copies that failed
    pub backups_failed: usize,
    /// Recovery plans written
    pub plans_generated: usize,
    /// Plans that failed to write
    pub plans_failed: usize,
    /// Self-checks that passed
    pub tests_passed: usize,
    /// Self-checks that failed
    pub tests_failed: usize,
}

/// Accounting record of one orchestrated run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Identifier of this run
    pub session_id: SessionId,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the run finished; `None` while in flight
    pub finished_at: Option<DateTime<Utc>>,
    /// Aggregated counters
    pub counts: SessionCounts,
    /// Readiness composite before the run
    pub pre_run_score: f64,
    /// Readiness composite after the run
    pub composite_score: f64,
    /// Whether the post-run score met the compliance threshold
    pub compliant: bool,
}

impl Session {
    /// Start a new session
    #[must_use]
    pub fn begin() -> Self {
        Self {
            session_id: SessionId::new(),
            started_at: Utc::now(),
            finished_at: None,
            counts: SessionCounts::default(),
            pre_run_score: 0.0,
            composite_score: 0.0,
            compliant: false,
        }
    }

    /// Finalize the session with the post-run composite score
    pub fn finalize(&mut self, composite_score: f64, compliance_threshold: f64) {
        self.finished_at = Some(Utc::now());
        self.composite_score = composite_score;
        self.compliant = composite_score >= compliance_threshold;
    }

    /// Report file name for this session
    #[must_use]
    pub fn report_file_name(&self) -> String {
        format!("disaster_recovery_report_{}.json", self.session_id)
    }

    /// Persist the session report under the logs root
    ///
    /// # Errors
    /// Returns [`ReportError`] if the directory or file cannot be written.
    pub fn persist(&self, logs_root: &Path) -> Result<PathBuf, ReportError> {
        fs::create_dir_all(logs_root).map_err(|source| ReportError::Io {
            path: logs_root.to_path_buf(),
            source,
        })?;
        let path = logs_root.join(self.report_file_name());
        let json = serde_json::to_vec_pretty(self)?;
        fs::write(&path, &json).map_err(|source| ReportError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn session_id_generation() {
        let a = SessionId::new();
        let b = SessionId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn finalize_sets_compliance_against_threshold() {
        let mut session = Session::begin();
        session.finalize(85.0, 80.0);
        assert!(session.compliant);
        assert!(session.finished_at.is_some());

        let mut session = Session::begin();
        session.finalize(79.9, 80.0);
        assert!(!session.compliant);
    }

    #[test]
    fn persist_writes_the_report_artifact() {
        let dir = TempDir::new().unwrap();
        let mut session = Session::begin();
        session.counts.assets_found = 5;
        session.finalize(90.0, 80.0);

        let path = session.persist(dir.path()).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("disaster_recovery_report_"));
        assert!(name.ends_with(".json"));

        let loaded: Session =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(loaded.session_id, session.session_id);
        assert_eq!(loaded.counts.assets_found, 5);
        assert!(loaded.compliant);
    }
}
