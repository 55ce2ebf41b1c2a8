//! Error types for AIDD core
//!
//! Findings (broken links, placeholders) are never errors; these cover the
//! environment and usage failures that stop a run.

use aidd_artifact::IdentifierError;
use aidd_corpus::{CorpusError, ParseError, SerializeError};
use aidd_trace::PatchError;
use std::path::PathBuf;

/// Main error type
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    /// No corpus file found under the given roots
    #[error("no YAML/JSON files found in {0}")]
    NoFiles(String),

    /// Supplied replacement is not an identifier
    #[error("invalid replacement: {0}")]
    InvalidReplacement(#[from] IdentifierError),

    /// Configuration file unreadable or malformed
    #[error("configuration error in {path}: {message}")]
    Config {
        /// Configuration file
        path: PathBuf,
        /// Reason
        message: String,
    },

    /// Reading a document failed
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Writing a document failed
    #[error("serialize error: {0}")]
    Serialize(#[from] SerializeError),

    /// Patch location not found
    #[error("patch failed: {0}")]
    Patch(#[from] PatchError),

    /// Writing the report failed
    #[error("cannot write report {path}: {source}")]
    Report {
        /// Report destination
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Report serialization failed
    #[error("report serialization failed: {0}")]
    ReportFormat(#[from] serde_json::Error),
}

impl TraceError {
    /// Create configuration error for path
    pub fn config_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create report IO error for path
    pub fn report_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Report {
            path: path.into(),
            source,
        }
    }

    /// Whether the invocation or its environment is at fault, as opposed
    /// to a single entry failing to patch
    #[inline]
    #[must_use]
    pub fn is_usage(&self) -> bool {
        !matches!(self, Self::Patch(_))
    }
}

impl From<CorpusError> for TraceError {
    fn from(err: CorpusError) -> Self {
        match err {
            CorpusError::Parse(e) => Self::Parse(e),
            CorpusError::Serialize(e) => Self::Serialize(e),
        }
    }
}

/// Result type alias
pub type TraceResult<T> = Result<T, TraceError>;

/// Process exit status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Check passed, or the fix session applied something (or had nothing to do)
    Pass,
    /// Check failed, or the fix session applied nothing
    Fail,
    /// Usage or environment error
    Usage,
}

impl ExitStatus {
    /// Numeric process exit code
    #[inline]
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::Pass => 0,
            Self::Fail => 1,
            Self::Usage => 2,
        }
    }
}

impl From<&TraceError> for ExitStatus {
    fn from(err: &TraceError) -> Self {
        if err.is_usage() {
            Self::Usage
        } else {
            Self::Fail
        }
    }
}
