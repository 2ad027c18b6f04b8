//! Bulwark Recovery System
//!
//! Everything that reasons about recovering from disaster:
//!
//! - [`plan`]: phased recovery plan synthesis from scenario time objectives
//! - [`readiness`]: weighted composite readiness scoring
//! - [`tester`]: the procedure self-check battery
//!
//! All three are read-only consumers of completed backup artifacts; none of
//! them ever observes a partially written manifest.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod plan;
pub mod readiness;
pub mod tester;

// Re-exports for convenience
pub use plan::{
    generate, standard_scenarios, write, PlanPhase, PlanWriteError, RecoveryPlan, Scenario,
    ASSESSMENT_PHASE_HOURS, COMPLETION_SHARE, RESTORATION_SHARE, VALIDATION_SHARE,
};
pub use readiness::{
    count_procedure_documents, count_tested_scenarios, ReadinessAssessor, ReadinessMetrics,
    ReadinessWeights, SaturationTargets, WeightError, WorkspaceObservation,
};
pub use tester::{
    results_file_name, write_results, ProcedureTester, ResultsWriteError, TestExecutionError,
    TestResult, TestStatus, TesterConfig,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
