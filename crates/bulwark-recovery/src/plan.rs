//! Recovery plan synthesis
//!
//! [`generate`] turns a disaster [`Scenario`] and its time objectives into a
//! phased [`RecoveryPlan`]; [`write`] renders the plan as markdown and
//! overwrites it idempotently under the plans root.
//!
//! Phase durations derive deterministically from the RTO: restoration takes
//! 0.6 of it, validation 0.3, completion 0.1. The assessment phase is a
//! fixed 15 minutes that sits outside the RTO split, so the total plan
//! always exceeds the RTO by exactly that much.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Fixed duration of the assessment phase, in hours
pub const ASSESSMENT_PHASE_HOURS: f64 = 0.25;
/// Share of the RTO spent restoring assets
pub const RESTORATION_SHARE: f64 = 0.6;
/// Share of the RTO spent validating the restore
pub const VALIDATION_SHARE: f64 = 0.3;
/// Share of the RTO spent on completion and handover
pub const COMPLETION_SHARE: f64 = 0.1;

/// A disaster scenario and its time objectives
///
/// Scenario catalogs are caller-supplied configuration;
/// [`standard_scenarios`] is the default catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Stable identifier; becomes the plan file name
    pub plan_id: String,
    /// Human-readable name
    pub name: String,
    /// What happened
    #[serde(default)]
    pub description: String,
    /// Recovery time objective: maximum acceptable time to restore service
    pub rto_hours: f64,
    /// Recovery point objective: maximum acceptable data-loss window
    pub rpo_hours: f64,
}

impl Scenario {
    /// Create a scenario
    #[inline]
    #[must_use]
    pub fn new(
        plan_id: impl Into<String>,
        name: impl Into<String>,
        rto_hours: f64,
        rpo_hours: f64,
    ) -> Self {
        Self {
            plan_id: plan_id.into(),
            name: name.into(),
            description: String::new(),
            rto_hours,
            rpo_hours,
        }
    }

    /// With a description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// One phase of a recovery plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanPhase {
    /// Phase name
    pub name: String,
    /// Allotted duration
    pub duration_hours: f64,
    /// Ordered actions
    pub actions: Vec<String>,
}

impl PlanPhase {
    fn new(name: &str, duration_hours: f64, actions: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            duration_hours,
            actions: actions.iter().map(|a| (*a).to_string()).collect(),
        }
    }
}

/// A synthesized, phased recovery document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryPlan {
    /// Identifier, shared with the scenario
    pub plan_id: String,
    /// Scenario name
    pub name: String,
    /// Scenario description
    pub description: String,
    /// Recovery time objective
    pub rto_hours: f64,
    /// Recovery point objective
    pub rpo_hours: f64,
    /// Phase breakdown, in execution order
    pub phases: Vec<PlanPhase>,
    /// Post-restore validation checklist
    pub checklist: Vec<String>,
}

impl RecoveryPlan {
    /// Rendered file name for a plan id
    #[must_use]
    pub fn file_name(plan_id: &str) -> String {
        format!("{plan_id}_recovery_plan.md")
    }

    /// Where the rendered document lives under a plans root
    #[must_use]
    pub fn file_path(&self, plans_root: &Path) -> PathBuf {
        plans_root.join(Self::file_name(&self.plan_id))
    }

    /// Total planned duration including the fixed assessment phase
    #[must_use]
    pub fn total_hours(&self) -> f64 {
        self.phases.iter().map(|p| p.duration_hours).sum()
    }

    /// Render the plan as a markdown document
    #[must_use]
    pub fn render_markdown(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# Recovery Plan: {}", self.name);
        let _ = writeln!(out);
        if !self.description.is_empty() {
            let _ = writeln!(out, "{}", self.description);
            let _ = writeln!(out);
        }
        let _ = writeln!(out, "- Plan id: `{}`", self.plan_id);
        let _ = writeln!(out, "- RTO: {} h", self.rto_hours);
        let _ = writeln!(out, "- RPO: {} h", self.rpo_hours);
        let _ = writeln!(out, "- Planned duration: {:.2} h", self.total_hours());
        let _ = writeln!(out);
        let _ = writeln!(out, "## Phases");
        for (idx, phase) in self.phases.iter().enumerate() {
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "### {}. {} ({:.2} h)",
                idx + 1,
                phase.name,
                phase.duration_hours
            );
            for action in &phase.actions {
                let _ = writeln!(out, "- {action}");
            }
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "## Validation Checklist");
        for item in &self.checklist {
            let _ = writeln!(out, "- [ ] {item}");
        }
        out
    }
}

/// Synthesize the phased plan for a scenario
///
/// Pure: the same scenario always yields the same plan.
#[must_use]
pub fn generate(scenario: &Scenario) -> RecoveryPlan {
    let rto = scenario.rto_hours;
    let phases = vec![
        PlanPhase::new(
            "Assessment",
            ASSESSMENT_PHASE_HOURS,
            &[
                "Identify the failure scope and affected assets",
                "Locate the most recent published backup manifest",
                "Notify stakeholders and open the recovery log",
            ],
        ),
        PlanPhase::new(
            "Restoration",
            RESTORATION_SHARE * rto,
            &[
                "Restore HIGH priority assets from the backup store",
                "Restore MEDIUM priority assets",
                "Restore LOW priority assets as time allows",
            ],
        ),
        PlanPhase::new(
            "Validation",
            VALIDATION_SHARE * rto,
            &[
                "Verify restored files against manifest integrity hashes",
                "Run the procedure self-test battery",
                "Smoke-test critical scripts and configurations",
            ],
        ),
        PlanPhase::new(
            "Completion",
            COMPLETION_SHARE * rto,
            &[
                "Record the recovery outcome and timings",
                "Schedule a fresh protective backup cycle",
                "Close the recovery log",
            ],
        ),
    ];

    RecoveryPlan {
        plan_id: scenario.plan_id.clone(),
        name: scenario.name.clone(),
        description: scenario.description.clone(),
        rto_hours: scenario.rto_hours,
        rpo_hours: scenario.rpo_hours,
        phases,
        checklist: vec![
            "Every restored file hashes to its manifest entry".to_string(),
            "All HIGH priority assets present and readable".to_string(),
            "Core scripts execute without import or path errors".to_string(),
            "Configuration files parse and load".to_string(),
            "Recovery duration recorded against the RTO".to_string(),
        ],
    }
}

/// Errors raised while writing a rendered plan
#[derive(Debug, thiserror::Error)]
pub enum PlanWriteError {
    /// Plans root could not be created
    #[error("failed to create plans root {path}: {source}")]
    CreateRoot {
        /// The plans root
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// The rendered document could not be written
    #[error("failed to write plan {path}: {source}")]
    Io {
        /// The plan file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },
}

/// Render and write a plan under the plans root, overwriting any previous
/// version with the same plan id
///
/// # Errors
/// Returns [`PlanWriteError`] if the root or document cannot be written.
pub fn write(plan: &RecoveryPlan, plans_root: &Path) -> Result<PathBuf, PlanWriteError> {
    fs::create_dir_all(plans_root).map_err(|source| PlanWriteError::CreateRoot {
        path: plans_root.to_path_buf(),
        source,
    })?;
    let path = plan.file_path(plans_root);
    fs::write(&path, plan.render_markdown()).map_err(|source| PlanWriteError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Default scenario catalog
#[must_use]
pub fn standard_scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new("workspace_loss", "Complete Workspace Loss", 4.0, 24.0)
            .with_description("The entire workspace directory is gone or unreadable."),
        Scenario::new("database_corruption", "Database Corruption", 2.0, 12.0)
            .with_description("One or more database files fail integrity checks."),
        Scenario::new("accidental_deletion", "Accidental File Deletion", 1.0, 24.0)
            .with_description("Critical files were removed or overwritten by mistake."),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_durations_derive_from_rto() {
        let scenario = Scenario::new("ws", "Workspace Loss", 4.0, 24.0);
        let plan = generate(&scenario);

        assert_eq!(plan.phases.len(), 4);
        assert!((plan.phases[0].duration_hours - 0.25).abs() < 1e-9);
        assert!((plan.phases[1].duration_hours - 2.4).abs() < 1e-9);
        assert!((plan.phases[2].duration_hours - 1.2).abs() < 1e-9);
        assert!((plan.phases[3].duration_hours - 0.4).abs() < 1e-9);
    }

    #[test]
    fn assessment_phase_sits_outside_the_rto_split() {
        let scenario = Scenario::new("db", "Database Corruption", 2.0, 12.0);
        let plan = generate(&scenario);
        assert!((plan.total_hours() - (2.0 + ASSESSMENT_PHASE_HOURS)).abs() < 1e-9);
    }

    #[test]
    fn generate_is_deterministic() {
        let scenario = Scenario::new("del", "Deletion", 1.0, 24.0);
        assert_eq!(generate(&scenario), generate(&scenario));
    }

    #[test]
    fn write_overwrites_by_plan_id() {
        let dir = tempfile::tempdir().unwrap();
        let scenario = Scenario::new("ws", "Workspace Loss", 4.0, 24.0);
        let plan = generate(&scenario);

        let first = write(&plan, dir.path()).unwrap();
        let second = write(&plan, dir.path()).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first.file_name().unwrap().to_string_lossy(),
            "ws_recovery_plan.md"
        );

        let count = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(count, 1);
    }

    #[test]
    fn rendered_plan_names_every_phase() {
        let plan = generate(&Scenario::new("ws", "Workspace Loss", 4.0, 24.0));
        let text = plan.render_markdown();
        for phase in ["Assessment", "Restoration", "Validation", "Completion"] {
            assert!(text.contains(phase), "missing phase {phase}");
        }
        assert!(text.contains("- [ ]"));
    }

    #[test]
    fn standard_catalog_has_unique_plan_ids() {
        let scenarios = standard_scenarios();
        assert_eq!(scenarios.len(), 3);
        let mut ids: Vec<_> = scenarios.iter().map(|s| s.plan_id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), scenarios.len());
    }
}
