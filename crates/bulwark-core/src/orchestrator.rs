//! Run orchestration
//!
//! [`Orchestrator::run`] sequences one full protection session: pre-run
//! readiness, asset discovery, optional scheduler registration, backup
//! execution, recovery-plan generation, procedure testing, post-run
//! readiness, and the persisted session report. Phases execute sequentially
//! on one logical thread of control; the whole run holds the backup root's
//! cycle lock so it can never interleave with a scheduled cycle.

use crate::config::BulwarkConfig;
use crate::error::BulwarkError;
use crate::scheduler::{cycle_lock, schedule, ScheduleHandle};
use crate::session::Session;
use bulwark_asset::Priority;
use bulwark_recovery::{
    count_procedure_documents, count_tested_scenarios, generate, write, write_results,
    ProcedureTester, ReadinessAssessor, TestResult, WorkspaceObservation,
};
use tokio::sync::Mutex;

/// Sequences all components into one session
#[derive(Debug)]
pub struct Orchestrator {
    config: BulwarkConfig,
    schedule_handle: Mutex<Option<ScheduleHandle>>,
}

impl Orchestrator {
    /// Create an orchestrator for a configuration
    #[inline]
    #[must_use]
    pub fn new(config: BulwarkConfig) -> Self {
        Self {
            config,
            schedule_handle: Mutex::new(None),
        }
    }

    /// The active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &BulwarkConfig {
        &self.config
    }

    /// Execute one full protection session
    ///
    /// Safe to re-run: every artifact is overwritten or appended per
    /// component rules. Partial success is observable through the session
    /// counters; only configuration problems abort.
    ///
    /// # Errors
    /// Returns [`BulwarkError`] for an unusable configuration or an
    /// unwritable session report.
    pub async fn run(&self) -> Result<Session, BulwarkError> {
        self.config.validate()?;

        // Serialize against scheduled cycles on the same backup root.
        let lock = cycle_lock(&self.config.backup_root);
        let _guard = lock.lock().await;

        let mut session = Session::begin();
        tracing::info!(
            session_id = %session.session_id,
            workspace = %self.config.workspace_root.display(),
            "protection session starting"
        );

        let assessor = ReadinessAssessor::new(self.config.weights, self.config.targets);

        // Pre-run readiness
        let pre = assessor.assess(&self.observe());
        session.pre_run_score = pre.composite_score;
        tracing::info!(
            score = pre.composite_score,
            coverage = pre.backup_coverage_pct,
            "pre-run readiness assessed"
        );

        // Asset discovery
        let assets = self.config.classifier().scan(&self.config.workspace_root);
        session.counts.assets_found = assets.len();
        tracing::info!(assets = assets.len(), "assets classified");

        // Scheduler registration (optional, for continued protection)
        if let Some(hours) = self.config.schedule_interval_hours {
            let mut slot = self.schedule_handle.lock().await;
            if slot.is_none() {
                *slot = Some(schedule(&self.config, hours));
                tracing::info!(interval_hours = hours, "recurring protection registered");
            }
        }

        // Backup execution
        match self
            .config
            .executor()
            .execute(&session.session_id.to_string(), &assets)
        {
            Ok(report) => {
                session.counts.backups_created = report.records.len();
                session.counts.backups_failed = report.failed;
                session.counts.assets_protected = report.records.len();
            }
            Err(err) => {
                // Nothing was published; the whole batch counts as failed.
                tracing::error!(error = %err, "backup batch failed to publish");
                session.counts.backups_failed = assets.len();
            }
        }

        // Recovery-plan generation
        for scenario in &self.config.scenarios {
            let plan = generate(scenario);
            match write(&plan, &self.config.plans_root) {
                Ok(path) => {
                    session.counts.plans_generated += 1;
                    tracing::debug!(plan = %path.display(), "recovery plan written");
                }
                Err(err) => {
                    session.counts.plans_failed += 1;
                    tracing::warn!(
                        plan_id = %scenario.plan_id,
                        error = %err,
                        "recovery plan failed; continuing"
                    );
                }
            }
        }

        // Procedure testing
        let tester = ProcedureTester::new(self.config.tester);
        let results = tester.run_all(&self.config.backup_root);
        session.counts.tests_passed = results.iter().filter(|r| r.passed()).count();
        session.counts.tests_failed = results.len() - session.counts.tests_passed;
        self.persist_test_results(&session, &results);

        // Post-run readiness and report
        let post = assessor.assess(&self.observe());
        session.finalize(post.composite_score, self.config.compliance_threshold);
        let report_path = session.persist(&self.config.logs_root)?;
        tracing::info!(
            report = %report_path.display(),
            score = session.composite_score,
            compliant = session.compliant,
            "protection session complete"
        );
        Ok(session)
    }

    /// Observe the current on-disk protection state
    ///
    /// Side-effect-free: scans the workspace, checks which critical assets
    /// already have a backup copy, and counts completed artifacts.
    #[must_use]
    pub fn observe(&self) -> WorkspaceObservation {
        let assets = self.config.classifier().scan(&self.config.workspace_root);
        let executor = self.config.executor();
        let critical: Vec<_> = assets
            .iter()
            .filter(|a| a.priority == Priority::High)
            .collect();
        let protected = critical
            .iter()
            .filter(|a| executor.backup_path_for(a).is_file())
            .count();

        WorkspaceObservation {
            critical_assets: critical.len(),
            protected_assets: protected,
            procedure_documents: count_procedure_documents(&self.config.plans_root),
            tested_scenarios: count_tested_scenarios(&self.config.logs_root),
        }
    }

    /// Whether this orchestrator has registered recurring protection
    pub async fn schedule_registered(&self) -> bool {
        self.schedule_handle.lock().await.is_some()
    }

    /// Cancel recurring protection, if registered, and return its cycle
    /// count
    pub async fn stop_schedule(&self) -> Option<u64> {
        let handle = self.schedule_handle.lock().await.take()?;
        Some(handle.join().await)
    }

    fn persist_test_results(&self, session: &Session, results: &[TestResult]) {
        match write_results(
            &self.config.logs_root,
            &session.session_id.to_string(),
            results,
        ) {
            Ok(path) => tracing::debug!(results = %path.display(), "test results written"),
            Err(err) => tracing::error!(error = %err, "failed to persist test results"),
        }
    }
}
