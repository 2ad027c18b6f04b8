//! Bulwark Asset System
//!
//! Rule-based classification of workspace files into typed, prioritized
//! assets.
//!
//! # Core Concepts
//!
//! - [`Asset`]: a classified workspace file with type, priority and metadata
//! - [`RuleSet`]: ordered (pattern, type, priority) catalog, first match wins
//! - [`Classifier`]: read-only workspace scanner with exclusion pruning
//!
//! # Example
//!
//! ```rust,ignore
//! use bulwark_asset::{Classifier, RuleSet};
//!
//! let classifier = Classifier::new(RuleSet::standard());
//! let assets = classifier.scan(workspace_root);
//! for asset in &assets {
//!     println!("{} {} {}", asset.priority, asset.asset_type, asset.path.display());
//! }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod asset;
pub mod classifier;
pub mod rules;

// Re-exports for convenience
pub use asset::{asset_id, Asset, AssetType, Priority};
pub use classifier::{Classifier, ScanError, DEFAULT_EXCLUDES};
pub use rules::{compile_rules, ClassificationRule, RuleSet, RuleSpec};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
