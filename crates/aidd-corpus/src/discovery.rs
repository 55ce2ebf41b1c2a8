//! Corpus file discovery
//!
//! Roots may be files or directories. Directories are walked recursively and
//! their matching files listed in sorted path order; explicit files are taken
//! as given. The first occurrence of a path wins.

use crate::parsers::ParserRegistry;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Result of walking a set of roots
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    /// Matching files, deduplicated, in discovery order
    pub files: Vec<PathBuf>,
    /// Roots that do not exist (or are files of an unsupported type)
    pub missing: Vec<PathBuf>,
}

impl Discovery {
    /// True if no file was found
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Collect every file under `roots` that some parser in `parsers` handles
#[must_use]
pub fn discover(roots: &[PathBuf], parsers: &ParserRegistry) -> Discovery {
    let mut found = Vec::new();
    let mut missing = Vec::new();

    for root in roots {
        if root.is_file() && parsers.supports(root) {
            found.push(root.clone());
        } else if root.is_dir() {
            found.extend(walk_dir(root, parsers));
        } else {
            tracing::warn!(root = %root.display(), "not found");
            missing.push(root.clone());
        }
    }

    let mut seen = HashSet::new();
    found.retain(|path| seen.insert(path.clone()));

    tracing::debug!(files = found.len(), missing = missing.len(), "discovery complete");
    Discovery {
        files: found,
        missing,
    }
}

fn walk_dir(dir: &Path, parsers: &ParserRegistry) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!(dir = %dir.display(), error = %err, "skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && parsers.supports(entry.path()))
        .map(walkdir::DirEntry::into_path)
        .collect();
    files.sort();
    files
}
