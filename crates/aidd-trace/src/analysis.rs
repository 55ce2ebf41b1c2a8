//! Consistency analysis
//!
//! Combines the registry with the extracted references and placeholders into
//! a pass/fail verdict. Pure: same inputs, same output.

use crate::placeholder::PlaceholderEntry;
use crate::reference::Reference;
use crate::registry::IdentifierRegistry;
use aidd_artifact::Identifier;
use serde::Serialize;
use std::collections::BTreeSet;

/// A reference whose target is not declared anywhere
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrokenLink {
    /// The dangling reference
    #[serde(flatten)]
    pub reference: Reference,
    /// Human-readable explanation
    pub note: String,
}

impl BrokenLink {
    fn new(reference: Reference) -> Self {
        let note = format!("'{}' is not a known identifier", reference.target);
        Self { reference, note }
    }
}

/// Outcome of one consistency analysis
#[derive(Debug, Clone, PartialEq)]
pub struct ConsistencyReport {
    /// Number of registered identifiers
    pub ids_found: usize,
    /// Number of extracted references
    pub references_found: usize,
    /// References pointing at undeclared identifiers
    pub broken_links: Vec<BrokenLink>,
    /// Unresolved upstream fields
    pub placeholders: Vec<PlaceholderEntry>,
    /// Registered identifiers nobody references, sorted (informational)
    pub orphan_ids: Vec<Identifier>,
    /// No broken links and no placeholders
    pub overall_pass: bool,
}

impl ConsistencyReport {
    /// True if at least one reference is broken
    #[inline]
    #[must_use]
    pub fn has_broken_links(&self) -> bool {
        !self.broken_links.is_empty()
    }

    /// True if at least one placeholder remains
    #[inline]
    #[must_use]
    pub fn has_placeholders(&self) -> bool {
        !self.placeholders.is_empty()
    }
}

/// Analyzer over a registry snapshot
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsistencyAnalyzer;

impl ConsistencyAnalyzer {
    /// Create new analyzer instance
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Run the full analysis
    #[must_use]
    pub fn analyze(
        &self,
        registry: &IdentifierRegistry,
        references: &[Reference],
        placeholders: &[PlaceholderEntry],
    ) -> ConsistencyReport {
        let broken_links = Self::broken_links(registry, references);
        let orphan_ids = Self::orphans(registry, references);
        let overall_pass = broken_links.is_empty() && placeholders.is_empty();

        ConsistencyReport {
            ids_found: registry.len(),
            references_found: references.len(),
            broken_links,
            placeholders: placeholders.to_vec(),
            orphan_ids,
            overall_pass,
        }
    }

    /// References whose target is missing from the registry, in input order
    #[must_use]
    pub fn broken_links(registry: &IdentifierRegistry, references: &[Reference]) -> Vec<BrokenLink> {
        references
            .iter()
            .filter(|r| !registry.contains(r.target.as_str()))
            .cloned()
            .map(BrokenLink::new)
            .collect()
    }

    /// Registered identifiers never targeted by any reference, sorted
    #[must_use]
    pub fn orphans(registry: &IdentifierRegistry, references: &[Reference]) -> Vec<Identifier> {
        let referenced: BTreeSet<&str> = references.iter().map(|r| r.target.as_str()).collect();
        let mut orphans: Vec<Identifier> = registry
            .identifiers()
            .filter(|id| !referenced.contains(id.as_str()))
            .cloned()
            .collect();
        orphans.sort();
        orphans
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placeholder::find_placeholders;
    use crate::reference::extract_references;
    use crate::test_support::doc;
    use aidd_artifact::Document;
    use pretty_assertions::assert_eq;

    fn run(corpus: &[Document]) -> ConsistencyReport {
        let registry = IdentifierRegistry::build(corpus);
        let refs = extract_references(corpus);
        let pending = find_placeholders(corpus);
        ConsistencyAnalyzer::new().analyze(&registry, &refs, &pending)
    }

    fn plan() -> Document {
        doc("A.yaml", "id: PLN-PLN-GOAL-001\n")
    }

    #[test]
    fn resolved_link_passes() {
        let report = run(&[
            plan(),
            doc("B.yaml", "id: REQ-REQ-ITEM-001\nderived_from: PLN-PLN-GOAL-001\n"),
        ]);
        assert!(report.overall_pass);
        assert_eq!(report.ids_found, 2);
        assert_eq!(report.references_found, 1);
        assert!(report.broken_links.is_empty());
        assert!(report.placeholders.is_empty());
        assert_eq!(report.orphan_ids, vec![Identifier::parse("REQ-REQ-ITEM-001").unwrap()]);
    }

    #[test]
    fn pending_fails() {
        let report = run(&[plan(), doc("B.yaml", "id: REQ-REQ-ITEM-001\nderived_from: PENDING\n")]);
        assert!(!report.overall_pass);
        assert!(report.has_placeholders());
        assert!(!report.has_broken_links());
    }

    #[test]
    fn unknown_target_is_broken() {
        let report = run(&[
            plan(),
            doc("B.yaml", "id: REQ-REQ-ITEM-001\nderived_from: PLN-PLN-GOAL-999\n"),
        ]);
        assert!(!report.overall_pass);
        assert_eq!(report.broken_links.len(), 1);
        let broken = &report.broken_links[0];
        assert_eq!(broken.reference.target.as_str(), "PLN-PLN-GOAL-999");
        assert_eq!(broken.note, "'PLN-PLN-GOAL-999' is not a known identifier");

        let json = serde_json::to_value(broken).unwrap();
        assert_eq!(json["ref_id"], "PLN-PLN-GOAL-999");
        assert_eq!(json["source_id"], "REQ-REQ-ITEM-001");
        assert!(json["note"].is_string());
    }

    #[test]
    fn orphans_never_fail_and_are_sorted() {
        let report = run(&[
            doc("z.yaml", "id: ZZ-ZZ-ITEM-001\n"),
            doc("a.yaml", "id: AA-AA-ITEM-001\n"),
        ]);
        assert!(report.overall_pass);
        let orphans: Vec<_> = report.orphan_ids.iter().map(Identifier::as_str).collect();
        assert_eq!(orphans, ["AA-AA-ITEM-001", "ZZ-ZZ-ITEM-001"]);
    }

    #[test]
    fn analysis_is_deterministic() {
        let corpus = [
            plan(),
            doc(
                "B.yaml",
                "id: REQ-REQ-ITEM-001\nderived_from: [PLN-PLN-GOAL-001, PLN-PLN-GOAL-404]\n",
            ),
        ];
        assert_eq!(run(&corpus), run(&corpus));
    }
}
