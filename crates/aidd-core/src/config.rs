//! Run configuration
//!
//! Defaults, overlaid by an optional `aidd-trace.toml` in the repository
//! root, overlaid by command-line flags (applied by the caller through the
//! `with_*` methods).

use crate::error::{TraceError, TraceResult};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Name of the optional configuration file in the repository root
pub const CONFIG_FILE_NAME: &str = "aidd-trace.toml";

/// Configuration for check and fix runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceConfig {
    /// Repository root; relative roots and display paths hang off it
    pub repo_root: PathBuf,
    /// Candidates with this prefix are offered first in interactive fixes
    pub preferred_prefix: String,
    /// Offer every registered identifier, not only the preferred family
    pub show_all_ids: bool,
    /// Maximum number of orphans listed on the console
    pub orphan_limit: usize,
    /// Interactive answer that ends the session
    pub abort_token: String,
}

impl TraceConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults for `repo_root`, overlaid by its configuration file if any
    ///
    /// # Errors
    /// [`TraceError::Config`] if the file exists but cannot be read or parsed.
    pub fn load(repo_root: impl Into<PathBuf>) -> TraceResult<Self> {
        let config = Self::default().with_repo_root(repo_root);
        let path = config.repo_root.join(CONFIG_FILE_NAME);
        if !path.is_file() {
            return Ok(config);
        }

        let text = std::fs::read_to_string(&path)
            .map_err(|e| TraceError::config_error(&path, e.to_string()))?;
        let file: ConfigFile =
            toml::from_str(&text).map_err(|e| TraceError::config_error(&path, e.to_string()))?;
        tracing::debug!(path = %path.display(), "configuration file loaded");
        Ok(config.overlay(file))
    }

    fn overlay(mut self, file: ConfigFile) -> Self {
        if let Some(prefix) = file.preferred_prefix {
            self.preferred_prefix = prefix;
        }
        if let Some(show) = file.show_all_ids {
            self.show_all_ids = show;
        }
        if let Some(limit) = file.orphan_limit {
            self.orphan_limit = limit;
        }
        if let Some(token) = file.abort_token {
            self.abort_token = token;
        }
        self
    }

    /// With repository root
    #[inline]
    #[must_use]
    pub fn with_repo_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.repo_root = root.into();
        self
    }

    /// With preferred candidate prefix
    #[inline]
    #[must_use]
    pub fn with_preferred_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.preferred_prefix = prefix.into();
        self
    }

    /// With all identifiers offered as candidates
    #[inline]
    #[must_use]
    pub fn with_show_all_ids(mut self, show: bool) -> Self {
        self.show_all_ids = show;
        self
    }

    /// With orphan listing limit
    #[inline]
    #[must_use]
    pub fn with_orphan_limit(mut self, limit: usize) -> Self {
        self.orphan_limit = limit;
        self
    }

    /// With abort token
    #[inline]
    #[must_use]
    pub fn with_abort_token(mut self, token: impl Into<String>) -> Self {
        self.abort_token = token.into();
        self
    }

    /// Repository root
    #[inline]
    #[must_use]
    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            repo_root: PathBuf::from("."),
            preferred_prefix: "PLN-".to_string(),
            show_all_ids: false,
            orphan_limit: 30,
            abort_token: "q".to_string(),
        }
    }
}

/// On-disk form; every key optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    preferred_prefix: Option<String>,
    show_all_ids: Option<bool>,
    orphan_limit: Option<usize>,
    abort_token: Option<String>,
}
