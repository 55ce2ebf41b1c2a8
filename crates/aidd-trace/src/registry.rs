//! Identifier registry
//!
//! Maps every declared identifier to the first file that declares it.

use aidd_artifact::fields::is_own_id_key;
use aidd_artifact::{Document, DocumentValue, Identifier};
use indexmap::IndexMap;
use serde::Serialize;

/// A declaration ignored because the identifier was already registered
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateDeclaration {
    /// The identifier declared twice
    pub id: Identifier,
    /// File holding the winning (first) declaration
    pub first_file: String,
    /// File holding the ignored declaration
    pub duplicate_file: String,
}

/// Identifier → first declaring file
///
/// Built fresh on every run. Insertion order follows the corpus enumeration
/// order, so iteration and serialization are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierRegistry {
    entries: IndexMap<Identifier, String>,
    duplicates: Vec<DuplicateDeclaration>,
}

impl IdentifierRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry over a whole corpus
    #[must_use]
    pub fn build(documents: &[Document]) -> Self {
        let mut registry = Self::new();
        for doc in documents {
            registry.scan(doc);
        }
        registry
    }

    /// Record every own-identifier declaration in one document
    pub fn scan(&mut self, doc: &Document) {
        self.collect(&doc.root, &doc.path);
    }

    fn collect(&mut self, node: &DocumentValue, file: &str) {
        match node {
            DocumentValue::Mapping(map) => {
                for (key, value) in map {
                    if is_own_id_key(key.as_str()) {
                        if let Some(id) = value.as_str().and_then(|raw| Identifier::parse(raw).ok()) {
                            self.insert(id, file);
                            continue;
                        }
                    }
                    self.collect(value, file);
                }
            }
            DocumentValue::Sequence(items) => {
                for item in items {
                    self.collect(item, file);
                }
            }
            DocumentValue::Tagged(tagged) => self.collect(&tagged.value, file),
            DocumentValue::Scalar(_) => {}
        }
    }

    /// Register `id` as declared in `file`
    ///
    /// Returns `false` (and records a duplicate) if the identifier is already
    /// known; the first declaration always wins.
    pub fn insert(&mut self, id: Identifier, file: &str) -> bool {
        if let Some(first_file) = self.entries.get(&id) {
            tracing::debug!(%id, first = %first_file, duplicate = %file, "duplicate identifier declaration ignored");
            self.duplicates.push(DuplicateDeclaration {
                id,
                first_file: first_file.clone(),
                duplicate_file: file.to_string(),
            });
            return false;
        }
        self.entries.insert(id, file.to_string());
        true
    }

    /// Whether `id` is declared anywhere
    #[inline]
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// File declaring `id`
    #[inline]
    #[must_use]
    pub fn file_of(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    /// Number of registered identifiers
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is registered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered identifiers in declaration order
    pub fn identifiers(&self) -> impl Iterator<Item = &Identifier> {
        self.entries.keys()
    }

    /// `(identifier, file)` pairs in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&Identifier, &str)> {
        self.entries.iter().map(|(id, file)| (id, file.as_str()))
    }

    /// Underlying map
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &IndexMap<Identifier, String> {
        &self.entries
    }

    /// Declarations ignored because the identifier was already registered
    #[inline]
    #[must_use]
    pub fn duplicates(&self) -> &[DuplicateDeclaration] {
        &self.duplicates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::doc;

    #[test]
    fn registers_root_and_nested_ids() {
        let corpus = vec![doc(
            "plan.yaml",
            r"
doc_id: PLN-PLN-DOC-001
goals:
  - id: PLN-PLN-GOAL-001
  - id: PLN-PLN-GOAL-002
    details:
      artifact_id: PLN-PLN-ART-001
",
        )];
        let registry = IdentifierRegistry::build(&corpus);

        assert_eq!(registry.len(), 4);
        for id in ["PLN-PLN-DOC-001", "PLN-PLN-GOAL-001", "PLN-PLN-GOAL-002", "PLN-PLN-ART-001"] {
            assert_eq!(registry.file_of(id), Some("plan.yaml"), "{id}");
        }
    }

    #[test]
    fn ignores_non_identifiers_and_reference_fields() {
        let corpus = vec![doc(
            "a.yaml",
            r"
id: draft
derived_from: PLN-PLN-GOAL-001
ID: PLN-PLN-GOAL-002
",
        )];
        let registry = IdentifierRegistry::build(&corpus);
        assert!(registry.is_empty());
    }

    #[test]
    fn first_declaration_wins() {
        let corpus = vec![
            doc("a.yaml", "id: REQ-REQ-ITEM-001\n"),
            doc("b.yaml", "id: REQ-REQ-ITEM-001\n"),
        ];
        let registry = IdentifierRegistry::build(&corpus);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.file_of("REQ-REQ-ITEM-001"), Some("a.yaml"));
        assert_eq!(registry.duplicates().len(), 1);
        assert_eq!(registry.duplicates()[0].duplicate_file, "b.yaml");

        let reversed: Vec<_> = corpus.into_iter().rev().collect();
        let registry = IdentifierRegistry::build(&reversed);
        assert_eq!(registry.file_of("REQ-REQ-ITEM-001"), Some("b.yaml"));
    }

    #[test]
    fn declaration_order_is_preserved() {
        let corpus = vec![
            doc("z.yaml", "id: ZZ-ZZ-LAST-001\n"),
            doc("a.yaml", "id: AA-AA-FIRST-001\n"),
        ];
        let registry = IdentifierRegistry::build(&corpus);
        let ids: Vec<_> = registry.identifiers().map(Identifier::as_str).collect();
        assert_eq!(ids, ["ZZ-ZZ-LAST-001", "AA-AA-FIRST-001"]);
    }

    #[test]
    fn values_are_trimmed() {
        let corpus = vec![doc("a.yaml", "id: ' PLN-PLN-GOAL-001 '\n")];
        let registry = IdentifierRegistry::build(&corpus);
        assert!(registry.contains("PLN-PLN-GOAL-001"));
    }
}
