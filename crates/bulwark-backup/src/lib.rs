//! Bulwark Backup System
//!
//! Integrity-verified backup copies with an atomically published session
//! manifest.
//!
//! # Core Concepts
//!
//! - [`IntegrityHash`]: sha256 digest recorded per copy
//! - [`BackupExecutor`]: sequential copy + verify + record runner
//! - [`Manifest`]: append-once session record, published via temp + rename
//! - [`BackupKey`]: copy naming strategy (path-hash default, historical
//!   priority/filename kept for compatibility)

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod executor;
pub mod integrity;
pub mod manifest;

// Re-exports for convenience
pub use executor::{BackupError, BackupExecutor, BackupKey, BackupReport, CopyError};
pub use integrity::{IntegrityHash, ParseHashError};
pub use manifest::{BackupRecord, Manifest, ManifestError};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
