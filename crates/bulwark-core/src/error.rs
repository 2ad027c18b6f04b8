//! Error types for Bulwark Core
//!
//! Only configuration-level problems abort a run. Every per-item failure
//! (scan, copy, plan write, test execution) is converted into a counter
//! increment plus a log entry at its item boundary and never reaches these
//! types.

use std::path::PathBuf;

/// Top-level engine error
#[derive(Debug, thiserror::Error)]
pub enum BulwarkError {
    /// Configuration is unusable; the run aborts before any phase
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The final session report could not be persisted
    #[error("report error: {0}")]
    Report(#[from] ReportError),
}

/// Configuration-level failures
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Workspace root missing or not a directory
    #[error("workspace root {path} is missing or not a directory")]
    WorkspaceMissing {
        /// The configured root
        path: PathBuf,
    },

    /// A classification rule pattern did not compile
    #[error("invalid classification rule `{pattern}`: {source}")]
    Rule {
        /// The offending pattern
        pattern: String,
        /// Underlying regex error
        #[source]
        source: regex::Error,
    },

    /// Readiness weights are invalid
    #[error(transparent)]
    Weights(#[from] bulwark_recovery::WeightError),

    /// Compliance threshold outside 0..=100
    #[error("compliance threshold must be within 0..=100, got {0}")]
    Threshold(f64),

    /// Schedule interval not positive
    #[error("schedule interval must be positive, got {0}")]
    Interval(f64),

    /// Config file is not valid TOML
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Failures while persisting the session report
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// JSON encoding failed
    #[error("failed to serialize session report: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem step failed
    #[error("failed to write session report {path}: {source}")]
    Io {
        /// Offending path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::WorkspaceMissing {
            path: PathBuf::from("/nope"),
        };
        assert!(err.to_string().contains("/nope"));

        let err = BulwarkError::from(ConfigError::Threshold(120.0));
        assert!(err.to_string().contains("configuration error"));
    }
}
