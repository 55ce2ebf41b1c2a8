//! Traceability report
//!
//! The JSON document written by `check --report-out`. Field names are part
//! of the external interface.

use crate::error::{ExitStatus, TraceError, TraceResult};
use aidd_artifact::Identifier;
use aidd_corpus::{LoadedCorpus, ParseFailure};
use aidd_trace::{
    BrokenLink, ConsistencyReport, DuplicateDeclaration, IdentifierRegistry, PlaceholderEntry,
    Reference,
};
use chrono::{Local, SecondsFormat};
use indexmap::IndexMap;
use serde::Serialize;
use std::path::Path;

/// Counts at the top of the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    /// Files discovered
    pub files_scanned: usize,
    /// Identifiers registered
    pub ids_found: usize,
    /// References extracted
    pub references_found: usize,
    /// Broken links
    pub broken_links: usize,
    /// Unresolved upstream fields
    pub pending_derived_from: usize,
    /// Unreferenced identifiers
    pub orphan_ids: usize,
    /// Files skipped as unparseable
    pub parse_failures: usize,
    /// Ignored duplicate declarations
    pub duplicate_ids: usize,
}

/// Complete result of one check run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceabilityReport {
    /// Local time of generation, RFC 3339 with seconds precision
    pub generated_at: String,
    /// No broken links and no placeholders
    pub overall_pass: bool,
    /// Counts
    pub summary: ReportSummary,
    /// References to undeclared identifiers
    pub broken_links: Vec<BrokenLink>,
    /// Unresolved upstream fields
    pub pending_derived_from: Vec<PlaceholderEntry>,
    /// Unreferenced identifiers, sorted
    pub orphan_ids: Vec<Identifier>,
    /// Identifier → declaring file
    pub id_registry: IndexMap<Identifier, String>,
    /// Every extracted reference
    pub references: Vec<Reference>,
    /// Ignored duplicate declarations
    pub duplicate_ids: Vec<DuplicateDeclaration>,
    /// Files skipped as unparseable
    pub parse_failures: Vec<ParseFailure>,
}

impl TraceabilityReport {
    /// Assemble the report from one run's results
    #[must_use]
    pub fn build(
        corpus: &LoadedCorpus,
        registry: &IdentifierRegistry,
        references: Vec<Reference>,
        analysis: ConsistencyReport,
    ) -> Self {
        let summary = ReportSummary {
            files_scanned: corpus.files_scanned,
            ids_found: analysis.ids_found,
            references_found: analysis.references_found,
            broken_links: analysis.broken_links.len(),
            pending_derived_from: analysis.placeholders.len(),
            orphan_ids: analysis.orphan_ids.len(),
            parse_failures: corpus.parse_failures.len(),
            duplicate_ids: registry.duplicates().len(),
        };

        Self {
            generated_at: timestamp(),
            overall_pass: analysis.overall_pass,
            summary,
            broken_links: analysis.broken_links,
            pending_derived_from: analysis.placeholders,
            orphan_ids: analysis.orphan_ids,
            id_registry: registry.entries().clone(),
            references,
            duplicate_ids: registry.duplicates().to_vec(),
            parse_failures: corpus.parse_failures.clone(),
        }
    }

    /// Replace the generation timestamp
    #[inline]
    #[must_use]
    pub fn with_generated_at(mut self, generated_at: impl Into<String>) -> Self {
        self.generated_at = generated_at.into();
        self
    }

    /// Exit status of the check
    #[inline]
    #[must_use]
    pub fn status(&self) -> ExitStatus {
        if self.overall_pass {
            ExitStatus::Pass
        } else {
            ExitStatus::Fail
        }
    }

    /// Pretty-printed JSON
    ///
    /// # Errors
    /// [`TraceError::ReportFormat`] if serialization fails.
    pub fn to_json(&self) -> TraceResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the JSON report, creating parent directories
    ///
    /// # Errors
    /// [`TraceError::Report`] on IO failure.
    pub fn write_to(&self, path: &Path) -> TraceResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| TraceError::report_error(path, e))?;
        }
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|e| TraceError::report_error(path, e))?;
        tracing::info!(path = %path.display(), "report written");
        Ok(())
    }
}

/// Current local time, RFC 3339 with seconds precision
#[must_use]
pub fn timestamp() -> String {
    Local::now().to_rfc3339_opts(SecondsFormat::Secs, false)
}
