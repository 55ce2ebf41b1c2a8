//! Corpus layer - the file boundary
//!
//! The only component that touches the filesystem:
//! - Root resolution and display paths relative to the repository root
//! - File → document tree (ingress)
//! - Document tree → file (egress)

use crate::discovery::{discover, Discovery};
use crate::error::{CorpusError, ParseError, SerializeError};
use crate::parsers::{default_parsers, ParserRegistry};
use aidd_artifact::{Document, DocumentValue};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A file that could not be read or parsed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseFailure {
    /// Display path of the file
    pub file: String,
    /// Reason
    pub message: String,
}

/// Every document loaded from a set of roots
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedCorpus {
    /// Parsed, non-empty documents in discovery order
    pub documents: Vec<Document>,
    /// Number of files discovered (parsed, empty or failed)
    pub files_scanned: usize,
    /// Files skipped because they failed to parse
    pub parse_failures: Vec<ParseFailure>,
    /// Roots that did not exist
    pub missing_roots: Vec<PathBuf>,
}

impl LoadedCorpus {
    /// True if no file was discovered at all
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files_scanned == 0
    }
}

/// Reads and writes corpus documents relative to a repository root
#[derive(Debug, Clone)]
pub struct CorpusLayer {
    parsers: ParserRegistry,
    repo_root: PathBuf,
}

impl Default for CorpusLayer {
    fn default() -> Self {
        Self::new(".")
    }
}

impl CorpusLayer {
    /// Create layer with default parsers
    ///
    /// The root is canonicalized when it exists.
    #[must_use]
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        let repo_root = repo_root.into();
        let repo_root = std::fs::canonicalize(&repo_root).unwrap_or(repo_root);
        Self {
            parsers: default_parsers(),
            repo_root,
        }
    }

    /// Replace the parser set
    #[must_use]
    pub fn with_parsers(mut self, parsers: ParserRegistry) -> Self {
        self.parsers = parsers;
        self
    }

    /// Repository root
    #[inline]
    #[must_use]
    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    /// Resolve a root argument; relative paths hang off the repository root
    #[must_use]
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.repo_root.join(path)
        }
    }

    /// Path relative to the repository root with `/` separators, or the
    /// path as given when it lies outside the root
    #[must_use]
    pub fn display_path(&self, path: &Path) -> String {
        let relative = std::fs::canonicalize(path)
            .ok()
            .and_then(|abs| abs.strip_prefix(&self.repo_root).ok().map(Path::to_path_buf));
        let shown = relative.as_deref().unwrap_or(path);
        shown.to_string_lossy().replace('\\', "/")
    }

    /// Enumerate the corpus files under `roots`
    #[must_use]
    pub fn discover(&self, roots: &[PathBuf]) -> Discovery {
        let resolved: Vec<PathBuf> = roots.iter().map(|r| self.resolve(r)).collect();
        discover(&resolved, &self.parsers)
    }

    /// Discover and parse every file under `roots`
    ///
    /// Parse failures are logged and collected, never fatal. Empty documents
    /// are skipped silently.
    #[must_use]
    pub fn load(&self, roots: &[PathBuf]) -> LoadedCorpus {
        let discovery = self.discover(roots);
        let mut corpus = LoadedCorpus {
            files_scanned: discovery.files.len(),
            missing_roots: discovery.missing,
            ..LoadedCorpus::default()
        };

        for path in &discovery.files {
            match self.read_document(path) {
                Ok(Some(doc)) => corpus.documents.push(doc),
                Ok(None) => tracing::debug!(file = %path.display(), "empty document skipped"),
                Err(err) => {
                    tracing::warn!(file = %path.display(), error = %err, "cannot parse");
                    corpus.parse_failures.push(ParseFailure {
                        file: self.display_path(path),
                        message: err.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            files = corpus.files_scanned,
            documents = corpus.documents.len(),
            failures = corpus.parse_failures.len(),
            "corpus loaded"
        );
        corpus
    }

    /// Parse one file (Ingress)
    ///
    /// Returns `Ok(None)` for an empty document.
    ///
    /// # Errors
    /// - `ParseError::NoParserForExtension` if no parser registered
    /// - `ParseError::SyntaxError` if file has invalid syntax
    /// - `ParseError::Io` if file read fails
    pub fn read_document(&self, path: &Path) -> Result<Option<Document>, ParseError> {
        let root = self.read_tree(path)?;
        if root.is_null() {
            return Ok(None);
        }
        Ok(Some(Document::new(self.display_path(path), path, root)))
    }

    /// Parse one file into a bare tree, null when empty
    ///
    /// # Errors
    /// Same as [`Self::read_document`].
    pub fn read_tree(&self, path: &Path) -> Result<DocumentValue, ParseError> {
        let parser = self
            .parsers
            .find_for_path(path)
            .ok_or_else(|| ParseError::NoParserForExtension(extension_of(path)))?;
        let content = std::fs::read_to_string(path).map_err(|e| ParseError::io_error(path, e))?;
        parser.parse(path, &content)
    }

    /// Serialize a tree over an existing file (Egress)
    ///
    /// The format follows the file extension.
    ///
    /// # Errors
    /// - `SerializeError::NoSerializerForExtension` if no parser registered
    /// - `SerializeError::FormatError` if the tree cannot be rendered
    /// - `SerializeError::Io` if file write fails
    pub fn write_tree(&self, path: &Path, root: &DocumentValue) -> Result<(), SerializeError> {
        let parser = self
            .parsers
            .find_for_path(path)
            .ok_or_else(|| SerializeError::NoSerializerForExtension(extension_of(path)))?;
        let content = parser.serialize(root)?;
        std::fs::write(path, content).map_err(|e| SerializeError::io_error(path, e))?;
        tracing::debug!(file = %path.display(), "document written");
        Ok(())
    }

    /// Read-modify-write of one file
    ///
    /// The file is re-parsed, handed to `edit`, and written back only when
    /// `edit` succeeds and `persist` is set. Each call works on a fresh tree.
    ///
    /// # Errors
    /// Whatever `edit` returns, or a [`CorpusError`] converted into `E` when
    /// reading or writing fails.
    pub fn update<T, E>(
        &self,
        path: &Path,
        persist: bool,
        edit: impl FnOnce(&mut DocumentValue) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<CorpusError>,
    {
        let mut tree = self.read_tree(path).map_err(CorpusError::from)?;
        let result = edit(&mut tree)?;
        if persist {
            self.write_tree(path, &tree).map_err(CorpusError::from)?;
        }
        Ok(result)
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_string()
}
