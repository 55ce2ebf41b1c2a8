//! Field vocabulary shared by every traceability walker
//!
//! The documents are schema-less; only the handful of keys named here carry
//! meaning for traceability.

use crate::document::{DocumentValue, Scalar};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Keys whose value is the identifier of the enclosing node, in priority
/// order. Matching is case-sensitive.
pub const OWN_ID_KEYS: [&str; 4] = ["id", "req_id", "doc_id", "artifact_id"];

/// Upstream ("derived from") reference keys
pub const DERIVED_FROM_KEYS: [&str; 2] = ["derived_from", "derivedfrom"];

/// Downstream ("traces to") reference keys
pub const TRACES_TO_KEYS: [&str; 2] = ["traces_to", "tracesto"];

/// Provenance (prompt) reference keys
pub const PROMPT_REF_KEYS: [&str; 1] = ["prompt_id"];

/// Sub-mapping conventionally used to group relational fields
pub const RELATED_KEY: &str = "related";

/// Sentinel marking a reference that has not been resolved yet
pub const PENDING_SENTINEL: &str = "PENDING";

/// Direction of a reference field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceDirection {
    /// The node was derived from the target
    Upstream,
    /// The node traces to the target
    Downstream,
    /// The target is the prompt that produced the node
    Provenance,
}

impl ReferenceDirection {
    /// Classify a key, or `None` if it is not a reference key
    ///
    /// Lookup is ASCII case-insensitive (`derivedFrom` counts).
    #[must_use]
    pub fn for_key(key: &str) -> Option<Self> {
        let matches = |set: &[&str]| set.iter().any(|k| k.eq_ignore_ascii_case(key));
        if matches(&DERIVED_FROM_KEYS) {
            Some(Self::Upstream)
        } else if matches(&TRACES_TO_KEYS) {
            Some(Self::Downstream)
        } else if matches(&PROMPT_REF_KEYS) {
            Some(Self::Provenance)
        } else {
            None
        }
    }

    /// Lowercase label used in reports
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upstream => "upstream",
            Self::Downstream => "downstream",
            Self::Provenance => "provenance",
        }
    }
}

impl Display for ReferenceDirection {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True if `key` is an own-identifier key
#[inline]
#[must_use]
pub fn is_own_id_key(key: &str) -> bool {
    OWN_ID_KEYS.contains(&key)
}

fn is_pending_str(s: &str) -> bool {
    let s = s.trim();
    s.is_empty() || s.eq_ignore_ascii_case(PENDING_SENTINEL)
}

/// Whether a reference value is still unresolved
///
/// Pending means null, an empty string, the `PENDING` sentinel (any case),
/// or a sequence that is empty or holds only pending strings.
#[must_use]
pub fn is_pending(value: &DocumentValue) -> bool {
    match value {
        DocumentValue::Scalar(Scalar::Null) => true,
        DocumentValue::Scalar(Scalar::String(s)) => is_pending_str(s),
        DocumentValue::Scalar(_) | DocumentValue::Mapping(_) => false,
        DocumentValue::Sequence(items) => items
            .iter()
            .all(|item| item.as_str().is_some_and(is_pending_str)),
        DocumentValue::Tagged(tagged) => is_pending(&tagged.value),
    }
}
