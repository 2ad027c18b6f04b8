//! Readiness assessment
//!
//! A weighted composite score estimating how prepared the workspace is to
//! recover from disaster. [`ReadinessAssessor::assess`] is a pure function
//! of a [`WorkspaceObservation`]; the observation helpers in this module
//! read completed on-disk artifacts and never write anything.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Weights of the composite score
///
/// Must sum to 1.0. The defaults split 0.5 backup coverage, 0.25 documented
/// procedures, 0.25 tested scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessWeights {
    /// Weight of backup coverage
    pub coverage: f64,
    /// Weight of documented procedures
    pub procedures: f64,
    /// Weight of tested scenarios
    pub tested: f64,
}

impl Default for ReadinessWeights {
    fn default() -> Self {
        Self {
            coverage: 0.5,
            procedures: 0.25,
            tested: 0.25,
        }
    }
}

impl ReadinessWeights {
    /// Validate that the weights are non-negative and sum to 1.0
    ///
    /// # Errors
    /// Returns [`WeightError`] on a bad weight set.
    pub fn validate(&self) -> Result<(), WeightError> {
        if self.coverage < 0.0 || self.procedures < 0.0 || self.tested < 0.0 {
            return Err(WeightError::Negative);
        }
        let sum = self.coverage + self.procedures + self.tested;
        if (sum - 1.0).abs() > 1e-6 {
            return Err(WeightError::BadSum(sum));
        }
        Ok(())
    }
}

/// Invalid readiness weight configurations
#[derive(Debug, thiserror::Error)]
pub enum WeightError {
    /// Weights do not sum to 1.0
    #[error("readiness weights must sum to 1.0, got {0:.4}")]
    BadSum(f64),

    /// A weight is negative
    #[error("readiness weights must be non-negative")]
    Negative,
}

/// Counts at which the procedure and tested-scenario metrics saturate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaturationTargets {
    /// Procedure documents needed for a full procedures score
    pub procedures: usize,
    /// Test-result artifacts needed for a full tested score
    pub tested_scenarios: usize,
}

impl Default for SaturationTargets {
    fn default() -> Self {
        Self {
            procedures: 3,
            tested_scenarios: 3,
        }
    }
}

/// What the assessor saw on disk at call time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkspaceObservation {
    /// HIGH priority assets discovered in the workspace
    pub critical_assets: usize,
    /// Critical assets with an existing backup copy
    pub protected_assets: usize,
    /// On-disk procedure documents
    pub procedure_documents: usize,
    /// On-disk test-result artifacts
    pub tested_scenarios: usize,
}

/// Computed readiness metrics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReadinessMetrics {
    /// Protected share of critical assets, 0..=100
    pub backup_coverage_pct: f64,
    /// Procedure documents counted
    pub recovery_procedures_count: usize,
    /// Test-result artifacts counted
    pub tested_scenarios_count: usize,
    /// Weighted composite, always within 0..=100
    pub composite_score: f64,
}

/// Pure, side-effect-free readiness scoring
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadinessAssessor {
    weights: ReadinessWeights,
    targets: SaturationTargets,
}

impl ReadinessAssessor {
    /// Create an assessor; weights are assumed validated by the caller
    #[inline]
    #[must_use]
    pub fn new(weights: ReadinessWeights, targets: SaturationTargets) -> Self {
        Self { weights, targets }
    }

    /// Compute the metrics for one observation
    ///
    /// Coverage is 0 when no critical assets exist. The procedures and
    /// tested metrics saturate at their targets. The composite is clamped
    /// into 0..=100.
    #[must_use]
    pub fn assess(&self, obs: &WorkspaceObservation) -> ReadinessMetrics {
        let backup_coverage_pct = if obs.critical_assets == 0 {
            0.0
        } else {
            let protected = obs.protected_assets.min(obs.critical_assets);
            protected as f64 / obs.critical_assets as f64 * 100.0
        };
        let procedures_pct = saturate(obs.procedure_documents, self.targets.procedures);
        let tested_pct = saturate(obs.tested_scenarios, self.targets.tested_scenarios);

        let composite = backup_coverage_pct * self.weights.coverage
            + procedures_pct * self.weights.procedures
            + tested_pct * self.weights.tested;

        ReadinessMetrics {
            backup_coverage_pct,
            recovery_procedures_count: obs.procedure_documents,
            tested_scenarios_count: obs.tested_scenarios,
            composite_score: composite.clamp(0.0, 100.0),
        }
    }
}

fn saturate(count: usize, target: usize) -> f64 {
    if target == 0 {
        100.0
    } else {
        (count as f64 / target as f64).min(1.0) * 100.0
    }
}

/// Count on-disk procedure documents (`*_recovery_plan.md`)
///
/// Returns 0 for a missing or unreadable directory.
#[must_use]
pub fn count_procedure_documents(plans_root: &Path) -> usize {
    count_matching(plans_root, |name| name.ends_with("_recovery_plan.md"))
}

/// Count on-disk test-result artifacts (`recovery_test_*.json`)
///
/// Returns 0 for a missing or unreadable directory.
#[must_use]
pub fn count_tested_scenarios(logs_root: &Path) -> usize {
    count_matching(logs_root, |name| {
        name.starts_with("recovery_test_") && name.ends_with(".json")
    })
}

fn count_matching(dir: &Path, matches: impl Fn(&str) -> bool) -> usize {
    let Ok(entries) = fs::read_dir(dir) else {
        return 0;
    };
    entries
        .filter_map(Result::ok)
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter(|e| matches(&e.file_name().to_string_lossy()))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_weights_validate() {
        assert!(ReadinessWeights::default().validate().is_ok());
    }

    #[test]
    fn bad_weight_sets_are_rejected() {
        let lopsided = ReadinessWeights {
            coverage: 0.9,
            procedures: 0.9,
            tested: 0.9,
        };
        assert!(matches!(
            lopsided.validate(),
            Err(WeightError::BadSum(_))
        ));

        let negative = ReadinessWeights {
            coverage: 1.5,
            procedures: -0.25,
            tested: -0.25,
        };
        assert!(matches!(negative.validate(), Err(WeightError::Negative)));
    }

    #[test]
    fn full_coverage_and_saturated_counts_score_100() {
        let assessor = ReadinessAssessor::default();
        let metrics = assessor.assess(&WorkspaceObservation {
            critical_assets: 4,
            protected_assets: 4,
            procedure_documents: 3,
            tested_scenarios: 5,
        });
        assert!((metrics.composite_score - 100.0).abs() < 1e-9);
        assert!((metrics.backup_coverage_pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn no_critical_assets_means_zero_coverage() {
        let assessor = ReadinessAssessor::default();
        let metrics = assessor.assess(&WorkspaceObservation {
            critical_assets: 0,
            protected_assets: 0,
            procedure_documents: 3,
            tested_scenarios: 3,
        });
        assert!((metrics.backup_coverage_pct - 0.0).abs() < 1e-9);
        assert!((metrics.composite_score - 50.0).abs() < 1e-9);
    }

    #[test]
    fn counts_saturate_at_their_targets() {
        let assessor = ReadinessAssessor::default();
        let at_target = assessor.assess(&WorkspaceObservation {
            critical_assets: 1,
            protected_assets: 1,
            procedure_documents: 3,
            tested_scenarios: 3,
        });
        let over_target = assessor.assess(&WorkspaceObservation {
            critical_assets: 1,
            protected_assets: 1,
            procedure_documents: 30,
            tested_scenarios: 30,
        });
        assert!((at_target.composite_score - over_target.composite_score).abs() < 1e-9);
    }

    #[test]
    fn counting_helpers_match_naming_conventions() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ws_recovery_plan.md"), "plan").unwrap();
        std::fs::write(dir.path().join("db_recovery_plan.md"), "plan").unwrap();
        std::fs::write(dir.path().join("notes.md"), "not a plan").unwrap();
        std::fs::write(dir.path().join("recovery_test_01A.json"), "[]").unwrap();
        std::fs::write(dir.path().join("recovery_test_01A.md"), "wrong ext").unwrap();

        assert_eq!(count_procedure_documents(dir.path()), 2);
        assert_eq!(count_tested_scenarios(dir.path()), 1);
        assert_eq!(count_procedure_documents(&dir.path().join("absent")), 0);
    }

    proptest! {
        #[test]
        fn composite_always_within_bounds(
            critical in 0usize..500,
            protected in 0usize..500,
            procedures in 0usize..100,
            tested in 0usize..100,
        ) {
            let assessor = ReadinessAssessor::default();
            let metrics = assessor.assess(&WorkspaceObservation {
                critical_assets: critical,
                protected_assets: protected,
                procedure_documents: procedures,
                tested_scenarios: tested,
            });
            prop_assert!(metrics.composite_score >= 0.0);
            prop_assert!(metrics.composite_score <= 100.0);
        }
    }
}
