//! Testing utilities for the AIDD traceability workspace
//!
//! Temporary corpora and canned documents shared by the test suites.

#![allow(missing_docs)]
#![allow(clippy::missing_panics_doc, clippy::must_use_candidate)]

use aidd_corpus::CorpusLayer;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary repository holding a small corpus
#[derive(Debug)]
pub struct CorpusFixture {
    dir: TempDir,
}

impl Default for CorpusFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl CorpusFixture {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn with_file(self, rel: &str, content: &str) -> Self {
        self.write(rel, content);
        self
    }

    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create fixture dirs");
        }
        fs::write(&path, content).expect("write fixture file");
        path
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.path(rel)).expect("read fixture file")
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn layer(&self) -> CorpusLayer {
        CorpusLayer::new(self.root())
    }
}

/// `A.yaml` declaring the plan goal most scenarios point at
pub fn plan_goal_yaml() -> &'static str {
    "id: PLN-PLN-GOAL-001\ntitle: Ship login\n"
}

/// Requirement item whose upstream is still pending
pub fn pending_requirement_yaml() -> &'static str {
    "id: REQ-REQ-ITEM-001\ntitle: Login form\nderived_from: PENDING\n"
}
