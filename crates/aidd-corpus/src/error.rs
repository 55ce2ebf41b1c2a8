//! Error types for the corpus layer
//!
//! Covers both directions of the file boundary:
//! - Parse operations (file → document tree)
//! - Serialize operations (document tree → file)

use std::path::PathBuf;

/// Errors while reading a file into a document tree
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// No parser registered for file extension
    #[error("no parser registered for extension: '{0}'")]
    NoParserForExtension(String),

    /// Syntax error in source file
    #[error("syntax error in {path}: {message}")]
    SyntaxError {
        /// File that failed to parse
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// IO error during file read
    #[error("io error reading {path}: {source}")]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl ParseError {
    /// Create syntax error for path
    pub fn syntax_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::SyntaxError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors while writing a document tree back to its file
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    /// No serializer registered for the file extension
    #[error("no serializer registered for extension: '{0}'")]
    NoSerializerForExtension(String),

    /// Format-specific error
    #[error("format error: {0}")]
    FormatError(String),

    /// IO error during file write
    #[error("io error writing {path}: {source}")]
    Io {
        /// File being written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl SerializeError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Combined corpus layer error
#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    /// Reading failed
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Writing failed
    #[error("serialize error: {0}")]
    Serialize(#[from] SerializeError),
}

/// Result type alias for corpus operations
pub type CorpusResult<T> = Result<T, CorpusError>;
