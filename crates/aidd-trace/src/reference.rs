//! Reference extraction
//!
//! Walks each tree carrying the nearest enclosing declared identifier (the
//! owning context) and emits one [`Reference`] per identifier named under a
//! reference key.

use aidd_artifact::{own_identifier, Document, DocumentValue, Identifier, ReferenceDirection};
use serde::{Serialize, Serializer};

/// A directed link from one record to another identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
    /// File the reference appears in
    pub source_file: String,
    /// Owning context; `None` means the document root
    #[serde(rename = "source_id", serialize_with = "serialize_context")]
    pub source_id: Option<Identifier>,
    /// Key the reference was found under, as written
    pub field: String,
    /// Referenced identifier
    #[serde(rename = "ref_id")]
    pub target: Identifier,
    /// Upstream, downstream or provenance
    pub direction: ReferenceDirection,
}

impl Reference {
    /// Owning context as text (empty at the document root)
    #[inline]
    #[must_use]
    pub fn source_id_str(&self) -> &str {
        self.source_id.as_ref().map_or("", Identifier::as_str)
    }
}

/// Owning contexts serialize as the identifier, or `""` at the root
pub(crate) fn serialize_context<S: Serializer>(
    context: &Option<Identifier>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(context.as_ref().map_or("", Identifier::as_str))
}

/// Extract every reference from a corpus, in document then pre-order
#[must_use]
pub fn extract_references(documents: &[Document]) -> Vec<Reference> {
    let mut refs = Vec::new();
    for doc in documents {
        collect(&doc.root, &doc.path, None, &mut refs);
    }
    refs
}

/// Extract the references of a single document
#[must_use]
pub fn extract_document_references(doc: &Document) -> Vec<Reference> {
    let mut refs = Vec::new();
    collect(&doc.root, &doc.path, None, &mut refs);
    refs
}

fn collect(node: &DocumentValue, file: &str, context: Option<&Identifier>, out: &mut Vec<Reference>) {
    match node {
        DocumentValue::Mapping(map) => {
            let own = own_identifier(map);
            let context = own.as_ref().or(context);
            for (key, value) in map {
                match ReferenceDirection::for_key(key.as_str()) {
                    Some(direction) => {
                        for target in targets(value) {
                            out.push(Reference {
                                source_file: file.to_string(),
                                source_id: context.cloned(),
                                field: key.to_string(),
                                target,
                                direction,
                            });
                        }
                    }
                    None => collect(value, file, context, out),
                }
            }
        }
        DocumentValue::Sequence(items) => {
            for item in items {
                collect(item, file, context, out);
            }
        }
        DocumentValue::Tagged(tagged) => collect(&tagged.value, file, context, out),
        DocumentValue::Scalar(_) => {}
    }
}

/// Identifiers named by a reference value; anything else yields nothing
fn targets(value: &DocumentValue) -> Vec<Identifier> {
    let parse = |v: &DocumentValue| v.as_str().and_then(|raw| Identifier::parse(raw).ok());
    match value {
        DocumentValue::Sequence(items) => items.iter().filter_map(parse).collect(),
        DocumentValue::Scalar(_) => parse(value).into_iter().collect(),
        DocumentValue::Tagged(tagged) => targets(&tagged.value),
        DocumentValue::Mapping(_) => Vec::new(),
    }
}
