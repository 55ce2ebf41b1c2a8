//! AIDD Core
//!
//! Runs the two workflows on top of the corpus layer and the traceability
//! engine:
//!
//! - **check**: load, analyze, report ([`run_check`])
//! - **fix**: resolve pending upstream fields ([`FixSession`])
//!
//! # Example
//!
//! ```rust,no_run
//! use aidd_core::{run_check, TraceConfig};
//! use aidd_corpus::CorpusLayer;
//! use std::path::PathBuf;
//!
//! # fn main() -> aidd_core::TraceResult<()> {
//! let config = TraceConfig::load(".")?;
//! let layer = CorpusLayer::new(config.repo_root());
//! let report = run_check(&layer, &[PathBuf::from("docs")])?;
//! println!("pass: {}", report.overall_pass);
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod check;
pub mod config;
pub mod error;
pub mod fix;
pub mod report;

// Re-exports
pub use check::{analyze_corpus, run_check};
pub use config::{TraceConfig, CONFIG_FILE_NAME};
pub use error::{ExitStatus, TraceError, TraceResult};
pub use fix::{
    decide, rank_candidates, Decision, EntryOutcome, FixMode, FixObserver, FixSession,
    FixSummary, OperatorInput, SessionState, SilentObserver, SkipReason, WriteMode,
};
pub use report::{ReportSummary, TraceabilityReport};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for running checks and fixes
    pub use crate::{
        run_check, ExitStatus, FixMode, FixSession, OperatorInput, TraceConfig, TraceError,
        TraceabilityReport, WriteMode,
    };
}
