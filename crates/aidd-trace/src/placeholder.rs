//! Placeholder detection
//!
//! Finds upstream reference fields that are still pending (null, empty,
//! `PENDING`, or a list of nothing but those).

use crate::reference::serialize_context;
use aidd_artifact::{is_pending, own_identifier, Document, DocumentValue, Identifier, ReferenceDirection};
use serde::Serialize;
use std::path::PathBuf;

/// One unresolved upstream field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceholderEntry {
    /// Display path of the file
    pub file: String,
    /// On-disk path used when patching
    #[serde(skip)]
    pub source: PathBuf,
    /// Owning context; `None` means the document root
    #[serde(serialize_with = "serialize_context")]
    pub context_id: Option<Identifier>,
    /// Key holding the pending value, as written
    pub field: String,
    /// Current (pending) value, kept for audit
    pub current_value: DocumentValue,
}

impl PlaceholderEntry {
    /// Owning context as text (empty at the document root)
    #[inline]
    #[must_use]
    pub fn context_str(&self) -> &str {
        self.context_id.as_ref().map_or("", Identifier::as_str)
    }
}

/// Find every pending upstream field in a corpus
#[must_use]
pub fn find_placeholders(documents: &[Document]) -> Vec<PlaceholderEntry> {
    let mut found = Vec::new();
    for doc in documents {
        collect(&doc.root, doc, None, &mut found);
    }
    found
}

fn collect(
    node: &DocumentValue,
    doc: &Document,
    context: Option<&Identifier>,
    out: &mut Vec<PlaceholderEntry>,
) {
    match node {
        DocumentValue::Mapping(map) => {
            let own = own_identifier(map);
            let context = own.as_ref().or(context);
            for (key, value) in map {
                match ReferenceDirection::for_key(key.as_str()) {
                    Some(ReferenceDirection::Upstream) if is_pending(value) => {
                        out.push(PlaceholderEntry {
                            file: doc.path.clone(),
                            source: doc.source.clone(),
                            context_id: context.cloned(),
                            field: key.to_string(),
                            current_value: value.clone(),
                        });
                    }
                    // Reference values are leaves.
                    Some(_) => {}
                    None => collect(value, doc, context, out),
                }
            }
        }
        DocumentValue::Sequence(items) => {
            for item in items {
                collect(item, doc, context, out);
            }
        }
        DocumentValue::Tagged(tagged) => collect(&tagged.value, doc, context, out),
        DocumentValue::Scalar(_) => {}
    }
}
