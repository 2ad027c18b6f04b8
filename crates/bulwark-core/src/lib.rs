//! Bulwark Core - protection orchestration
//!
//! The engine that ties asset classification, integrity-verified backups,
//! recovery planning and self-testing into one session:
//!
//! - [`BulwarkConfig`]: everything a run needs, with TOML overlay support
//! - [`Orchestrator`]: fixed-order phase sequencing and session accounting
//! - [`schedule`]: cancellable recurring protection with an overlap guard
//!
//! # Example
//!
//! ```rust,ignore
//! use bulwark_core::{BulwarkConfig, Orchestrator};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BulwarkConfig::for_workspace("/path/to/workspace");
//! let orchestrator = Orchestrator::new(config);
//!
//! let session = orchestrator.run().await?;
//! println!(
//!     "protected {} of {} assets, score {:.1}",
//!     session.counts.assets_protected,
//!     session.counts.assets_found,
//!     session.composite_score,
//! );
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod scheduler;
pub mod session;

// Re-exports for convenience
pub use config::{load, BulwarkConfig, ConfigFile, DEFAULT_COMPLIANCE_THRESHOLD};
pub use error::{BulwarkError, ConfigError, ReportError};
pub use orchestrator::Orchestrator;
pub use scheduler::{cycle_lock, schedule, ScheduleHandle};
pub use session::{Session, SessionCounts, SessionId};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving the protection engine
    pub use crate::{BulwarkConfig, BulwarkError, Orchestrator, ScheduleHandle, Session};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
