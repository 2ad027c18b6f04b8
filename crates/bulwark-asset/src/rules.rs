//! Classification rules
//!
//! An ordered list of (pattern, type, priority) rules. Rules are evaluated
//! in insertion order and the first match wins; catalogs are caller
//! configuration, with [`RuleSet::standard`] as the default.

use crate::asset::{AssetType, Priority};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// A single ordered classification rule
///
/// The pattern is matched against the file name, never the full path.
#[derive(Debug, Clone)]
pub struct ClassificationRule {
    /// Compiled file-name pattern
    pub pattern: Regex,
    /// Type assigned on match
    pub asset_type: AssetType,
    /// Priority assigned on match
    pub priority: Priority,
}

impl ClassificationRule {
    /// Compile a rule from a pattern string
    ///
    /// # Errors
    /// Returns the regex error if the pattern does not compile.
    pub fn new(
        pattern: &str,
        asset_type: AssetType,
        priority: Priority,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            asset_type,
            priority,
        })
    }

    /// Check whether the rule matches a file name
    #[inline]
    #[must_use]
    pub fn matches(&self, file_name: &str) -> bool {
        self.pattern.is_match(file_name)
    }
}

/// Serde-friendly rule form used by configuration files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSpec {
    /// Regex pattern matched against file names
    pub pattern: String,
    /// Type assigned on match
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    /// Priority assigned on match
    pub priority: Priority,
}

impl RuleSpec {
    /// Compile into a [`ClassificationRule`]
    ///
    /// # Errors
    /// Returns the regex error if the pattern does not compile.
    pub fn compile(&self) -> Result<ClassificationRule, regex::Error> {
        ClassificationRule::new(&self.pattern, self.asset_type, self.priority)
    }
}

/// Ordered rule catalog with first-match-wins semantics
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<ClassificationRule>,
}

impl RuleSet {
    /// Create a rule set from an ordered list
    #[inline]
    #[must_use]
    pub fn new(rules: Vec<ClassificationRule>) -> Self {
        Self { rules }
    }

    /// The default catalog covering all six asset types
    ///
    /// Order matters: dependency lockfiles are claimed before the broader
    /// script and config rules, unified scripts before plain scripts.
    #[must_use]
    pub fn standard() -> Self {
        let table: [(&str, AssetType, Priority); 6] = [
            (r"\.(db|sqlite3?)$", AssetType::Database, Priority::High),
            (
                r"^unified_.*\.(py|rs|sh)$",
                AssetType::UnifiedScript,
                Priority::High,
            ),
            (
                r"^(Cargo\.(toml|lock)|requirements\.txt|package(-lock)?\.json|pyproject\.toml)$",
                AssetType::Dependency,
                Priority::Medium,
            ),
            (r"\.(rs|py|sh)$", AssetType::CoreScript, Priority::Medium),
            (
                r"\.(toml|ya?ml|json|ini|cfg)$",
                AssetType::Config,
                Priority::Medium,
            ),
            (r"\.(md|rst|txt)$", AssetType::Documentation, Priority::Low),
        ];
        let rules = table
            .into_iter()
            .map(|(pattern, asset_type, priority)| {
                ClassificationRule::new(pattern, asset_type, priority)
                    .expect("built-in patterns are valid")
            })
            .collect();
        Self { rules }
    }

    /// Find the first rule matching a file name
    #[must_use]
    pub fn first_match(&self, file_name: &str) -> Option<&ClassificationRule> {
        self.rules.iter().find(|r| r.matches(file_name))
    }

    /// Append a rule at the end of the evaluation order
    pub fn push(&mut self, rule: ClassificationRule) {
        self.rules.push(rule);
    }

    /// Number of rules
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the catalog is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterate rules in evaluation order
    pub fn iter(&self) -> impl Iterator<Item = &ClassificationRule> {
        self.rules.iter()
    }
}

/// Compile a list of [`RuleSpec`]s into a [`RuleSet`], preserving order
///
/// # Errors
/// Returns the offending pattern and regex error on the first failure.
pub fn compile_rules(specs: &[RuleSpec]) -> Result<RuleSet, (String, regex::Error)> {
    let mut rules = Vec::with_capacity(specs.len());
    for spec in specs {
        rules.push(
            spec.compile()
                .map_err(|e| (spec.pattern.clone(), e))?,
        );
    }
    Ok(RuleSet::new(rules))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_covers_all_types() {
        let rules = RuleSet::standard();
        assert_eq!(rules.len(), 6);

        assert_eq!(
            rules.first_match("state.db").map(|r| r.asset_type),
            Some(AssetType::Database)
        );
        assert_eq!(
            rules.first_match("unified_deploy.py").map(|r| r.asset_type),
            Some(AssetType::UnifiedScript)
        );
        assert_eq!(
            rules.first_match("Cargo.toml").map(|r| r.asset_type),
            Some(AssetType::Dependency)
        );
        assert_eq!(
            rules.first_match("runner.py").map(|r| r.asset_type),
            Some(AssetType::CoreScript)
        );
        assert_eq!(
            rules.first_match("settings.yaml").map(|r| r.asset_type),
            Some(AssetType::Config)
        );
        assert_eq!(
            rules.first_match("README.md").map(|r| r.asset_type),
            Some(AssetType::Documentation)
        );
    }

    #[test]
    fn first_match_wins_over_later_rules() {
        // unified_*.py also matches the plain script rule further down
        let rules = RuleSet::standard();
        let rule = rules.first_match("unified_backup.py").unwrap();
        assert_eq!(rule.asset_type, AssetType::UnifiedScript);
        assert_eq!(rule.priority, Priority::High);

        // Cargo.toml also matches the config rule further down
        let rule = rules.first_match("Cargo.toml").unwrap();
        assert_eq!(rule.asset_type, AssetType::Dependency);
    }

    #[test]
    fn unmatched_names_yield_none() {
        let rules = RuleSet::standard();
        assert!(rules.first_match("core.bin").is_none());
        assert!(rules.first_match("noextension").is_none());
    }

    #[test]
    fn spec_compiles_and_rejects_bad_patterns() {
        let spec = RuleSpec {
            pattern: r"\.log$".to_string(),
            asset_type: AssetType::Documentation,
            priority: Priority::Low,
        };
        assert!(spec.compile().is_ok());

        let bad = RuleSpec {
            pattern: "[unclosed".to_string(),
            asset_type: AssetType::Config,
            priority: Priority::Low,
        };
        assert!(bad.compile().is_err());
        assert!(compile_rules(&[bad]).is_err());
    }
}
