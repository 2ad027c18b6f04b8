//! Recurring protection
//!
//! [`schedule`] spawns a background task that runs one classify+backup
//! cycle every interval, indefinitely.
//!
//! - Cancellation is explicit via [`ScheduleHandle`]; an in-flight cycle is
//!   allowed to finish and is never interrupted mid-copy.
//! - A per-backup-root mutex guarantees a new cycle never starts while a
//!   previous cycle or a manual run on the same backup root is still
//!   running; a contended fire is skipped with a warning.
//!
//! Locks are process-wide, keyed on the configured backup-root path.
//! Cross-process locking is out of scope.

use crate::config::BulwarkConfig;
use crate::session::SessionId;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::sleep;

static CYCLE_LOCKS: Lazy<DashMap<PathBuf, Arc<Mutex<()>>>> = Lazy::new(DashMap::new);

/// The serialization lock for a backup root
///
/// Everything that writes into a backup root must hold its lock for the
/// duration of the cycle; the same path always yields the same lock within
/// this process.
#[must_use]
pub fn cycle_lock(backup_root: &Path) -> Arc<Mutex<()>> {
    CYCLE_LOCKS
        .entry(backup_root.to_path_buf())
        .or_insert_with(|| Arc::new(Mutex::new(())))
        .clone()
}

/// Handle to a running recurring-protection task
#[derive(Debug)]
pub struct ScheduleHandle {
    cancel_tx: watch::Sender<bool>,
    cycles: Arc<AtomicU64>,
    task: JoinHandle<()>,
}

impl ScheduleHandle {
    /// Request cancellation
    ///
    /// Honored at the next idle point: a cycle already in flight finishes
    /// first.
    pub fn cancel(&self) {
        let _ = self.cancel_tx.send(true);
    }

    /// Number of cycles attempted so far (skipped fires excluded)
    #[must_use]
    pub fn cycles_completed(&self) -> u64 {
        self.cycles.load(Ordering::SeqCst)
    }

    /// Whether the background task has exited
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancel, wait for the task to exit, and return the cycle count
    pub async fn join(self) -> u64 {
        self.cancel();
        let _ = self.task.await;
        self.cycles.load(Ordering::SeqCst)
    }
}

/// Start recurring protection for a configured workspace
///
/// Each fire runs one classify+backup cycle with a fresh session id, then
/// waits `interval_hours` before the next. The task never blocks process
/// shutdown; use the returned handle to stop it cooperatively.
#[must_use]
pub fn schedule(config: &BulwarkConfig, interval_hours: f64) -> ScheduleHandle {
    let interval = Duration::from_secs_f64(interval_hours * 3600.0);
    let (cancel_tx, mut cancel_rx) = watch::channel(false);
    let cycles = Arc::new(AtomicU64::new(0));

    let lock = cycle_lock(&config.backup_root);
    let classifier = config.classifier();
    let executor = config.executor();
    let workspace_root = config.workspace_root.clone();
    let backup_root = config.backup_root.clone();
    let counter = Arc::clone(&cycles);

    let task = tokio::spawn(async move {
        loop {
            tokio::select! {
                () = sleep(interval) => {}
                _ = cancel_rx.changed() => break,
            }
            match lock.try_lock() {
                Ok(_guard) => {
                    let session_id = SessionId::new().to_string();
                    tracing::info!(session_id = %session_id, "scheduled backup cycle starting");
                    let assets = classifier.scan(&workspace_root);
                    match executor.execute(&session_id, &assets) {
                        Ok(report) => {
                            tracing::info!(
                                created = report.records.len(),
                                failed = report.failed,
                                "scheduled backup cycle complete"
                            );
                        }
                        Err(err) => {
                            tracing::error!(error = %err, "scheduled backup cycle failed to publish");
                        }
                    }
                    counter.fetch_add(1, Ordering::SeqCst);
                }
                Err(_) => {
                    tracing::warn!(
                        backup_root = %backup_root.display(),
                        "previous cycle still running; skipping this fire"
                    );
                }
            }
            if *cancel_rx.borrow() {
                break;
            }
        }
        tracing::debug!("recurring protection stopped");
    });

    ScheduleHandle {
        cancel_tx,
        cycles,
        task,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_lock_is_stable_per_path() {
        let a = cycle_lock(Path::new("/store/one"));
        let b = cycle_lock(Path::new("/store/one"));
        let c = cycle_lock(Path::new("/store/two"));
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
    }

    #[tokio::test]
    async fn handle_cancels_before_first_fire() {
        let dir = tempfile::tempdir().unwrap();
        let config = BulwarkConfig::for_workspace(dir.path());
        let handle = schedule(&config, 1.0);

        let cycles = handle.join().await;
        assert_eq!(cycles, 0);
    }
}
