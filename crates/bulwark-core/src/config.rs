//! Engine configuration
//!
//! [`BulwarkConfig`] carries everything one protection run needs: the
//! workspace root, the artifact roots, the classification rule catalog, the
//! scenario catalog, readiness weighting and tester tuning. The CLI can
//! overlay a TOML [`ConfigFile`] on top of the defaults.

use crate::error::ConfigError;
use bulwark_asset::{compile_rules, Classifier, RuleSet, RuleSpec};
use bulwark_backup::{BackupExecutor, BackupKey};
use bulwark_recovery::{
    standard_scenarios, ReadinessWeights, SaturationTargets, Scenario, TesterConfig,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default compliance threshold for the session score
pub const DEFAULT_COMPLIANCE_THRESHOLD: f64 = 80.0;

/// Full configuration of one protection engine instance
#[derive(Debug, Clone)]
pub struct BulwarkConfig {
    /// Root of the protected workspace
    pub workspace_root: PathBuf,
    /// Where backup copies and manifests live
    pub backup_root: PathBuf,
    /// Where rendered recovery plans live
    pub plans_root: PathBuf,
    /// Where test results and session reports live
    pub logs_root: PathBuf,
    /// Ordered classification rule catalog
    pub rules: RuleSet,
    /// Disaster scenario catalog
    pub scenarios: Vec<Scenario>,
    /// Readiness composite weights
    pub weights: ReadinessWeights,
    /// Readiness saturation targets
    pub targets: SaturationTargets,
    /// Procedure tester tuning
    pub tester: TesterConfig,
    /// Backup copy naming strategy
    pub backup_key: BackupKey,
    /// Sessions scoring at or above this are compliant
    pub compliance_threshold: f64,
    /// When set, the orchestrator registers recurring protection
    pub schedule_interval_hours: Option<f64>,
}

impl BulwarkConfig {
    /// Default configuration for a workspace
    ///
    /// Artifact roots default to `disaster_recovery/{backups,plans,logs}`
    /// under the workspace root.
    #[must_use]
    pub fn for_workspace(root: impl Into<PathBuf>) -> Self {
        let workspace_root = root.into();
        let dr_root = workspace_root.join("disaster_recovery");
        Self {
            workspace_root,
            backup_root: dr_root.join("backups"),
            plans_root: dr_root.join("plans"),
            logs_root: dr_root.join("logs"),
            rules: RuleSet::standard(),
            scenarios: standard_scenarios(),
            weights: ReadinessWeights::default(),
            targets: SaturationTargets::default(),
            tester: TesterConfig::default(),
            backup_key: BackupKey::default(),
            compliance_threshold: DEFAULT_COMPLIANCE_THRESHOLD,
            schedule_interval_hours: None,
        }
    }

    /// With a rule catalog
    #[inline]
    #[must_use]
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    /// With a scenario catalog
    #[inline]
    #[must_use]
    pub fn with_scenarios(mut self, scenarios: Vec<Scenario>) -> Self {
        self.scenarios = scenarios;
        self
    }

    /// With a backup root
    #[inline]
    #[must_use]
    pub fn with_backup_root(mut self, backup_root: impl Into<PathBuf>) -> Self {
        self.backup_root = backup_root.into();
        self
    }

    /// With a compliance threshold
    #[inline]
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.compliance_threshold = threshold;
        self
    }

    /// With a backup naming strategy
    #[inline]
    #[must_use]
    pub fn with_backup_key(mut self, key: BackupKey) -> Self {
        self.backup_key = key;
        self
    }

    /// With a recurring schedule interval
    #[inline]
    #[must_use]
    pub fn with_schedule_interval(mut self, hours: f64) -> Self {
        self.schedule_interval_hours = Some(hours);
        self
    }

    /// Validate the configuration
    ///
    /// # Errors
    /// Returns [`ConfigError`] when the workspace root is missing or not a
    /// directory, the weights are invalid, the threshold is out of range,
    /// or the schedule interval is not positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.workspace_root.is_dir() {
            return Err(ConfigError::WorkspaceMissing {
                path: self.workspace_root.clone(),
            });
        }
        self.weights.validate()?;
        if !(0.0..=100.0).contains(&self.compliance_threshold) {
            return Err(ConfigError::Threshold(self.compliance_threshold));
        }
        if let Some(hours) = self.schedule_interval_hours {
            if hours <= 0.0 {
                return Err(ConfigError::Interval(hours));
            }
        }
        Ok(())
    }

    /// Build the classifier for this configuration
    ///
    /// Extends the default exclusion list with the artifact roots that nest
    /// inside the workspace, so the engine never classifies its own output.
    #[must_use]
    pub fn classifier(&self) -> Classifier {
        Classifier::new(self.rules.clone()).with_excludes(self.artifact_excludes())
    }

    /// Build the backup executor for this configuration
    #[must_use]
    pub fn executor(&self) -> BackupExecutor {
        BackupExecutor::new(&self.backup_root).with_key(self.backup_key)
    }

    fn artifact_excludes(&self) -> Vec<String> {
        let mut out = Vec::new();
        for root in [&self.backup_root, &self.plans_root, &self.logs_root] {
            if let Ok(relative) = root.strip_prefix(&self.workspace_root) {
                if let Some(first) = relative.components().next() {
                    let name = first.as_os_str().to_string_lossy().into_owned();
                    if !name.is_empty() && !out.contains(&name) {
                        out.push(name);
                    }
                }
            }
        }
        out
    }
}

/// TOML overlay loaded by the CLI
///
/// Every section is optional; missing sections keep the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Replacement rule catalog (whole-catalog replacement, in order)
    pub rules: Vec<RuleSpec>,
    /// Replacement scenario catalog
    pub scenarios: Vec<Scenario>,
    /// Readiness weights
    pub weights: Option<ReadinessWeights>,
    /// Readiness saturation targets
    pub targets: Option<SaturationTargets>,
    /// Tester tuning
    pub tester: Option<TesterConfig>,
    /// Backup naming strategy
    pub backup_key: Option<BackupKey>,
    /// Compliance threshold
    pub compliance_threshold: Option<f64>,
    /// Recurring schedule interval
    pub schedule_interval_hours: Option<f64>,
}

impl ConfigFile {
    /// Parse a TOML document
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] on malformed TOML.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Overlay this file on top of a base configuration
    ///
    /// # Errors
    /// Returns [`ConfigError::Rule`] when a rule pattern does not compile.
    pub fn apply(self, mut config: BulwarkConfig) -> Result<BulwarkConfig, ConfigError> {
        if !self.rules.is_empty() {
            config.rules = compile_rules(&self.rules)
                .map_err(|(pattern, source)| ConfigError::Rule { pattern, source })?;
        }
        if !self.scenarios.is_empty() {
            config.scenarios = self.scenarios;
        }
        if let Some(weights) = self.weights {
            config.weights = weights;
        }
        if let Some(targets) = self.targets {
            config.targets = targets;
        }
        if let Some(tester) = self.tester {
            config.tester = tester;
        }
        if let Some(key) = self.backup_key {
            config.backup_key = key;
        }
        if let Some(threshold) = self.compliance_threshold {
            config.compliance_threshold = threshold;
        }
        if let Some(hours) = self.schedule_interval_hours {
            config.schedule_interval_hours = Some(hours);
        }
        Ok(config)
    }
}

/// Load a configuration for a workspace, overlaying an optional TOML file
///
/// # Errors
/// Returns [`ConfigError`] on parse or rule-compilation failure.
pub fn load(workspace_root: &Path, file_text: Option<&str>) -> Result<BulwarkConfig, ConfigError> {
    let config = BulwarkConfig::for_workspace(workspace_root);
    match file_text {
        Some(text) => ConfigFile::parse(text)?.apply(config),
        None => Ok(config),
    }
}
