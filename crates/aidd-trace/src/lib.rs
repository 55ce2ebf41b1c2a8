//! AIDD Traceability Engine
//!
//! Pure analysis over parsed documents: no I/O happens here.
//!
//! # Pipeline
//!
//! 1. [`IdentifierRegistry`]: every declared identifier and its file
//! 2. [`extract_references`]: every upstream, downstream and provenance link
//! 3. [`find_placeholders`]: every upstream field still pending
//! 4. [`ConsistencyAnalyzer`]: broken links, orphans and the verdict
//! 5. [`apply_patch`]: rewrite one field of one node in place
//!
//! # Example
//!
//! ```rust
//! use aidd_artifact::{Document, DocumentValue};
//! use aidd_trace::prelude::*;
//!
//! let plan = Document::in_memory(
//!     "A.yaml",
//!     DocumentValue::from(serde_json::json!({"id": "PLN-PLN-GOAL-001"})),
//! );
//! let req = Document::in_memory(
//!     "B.yaml",
//!     DocumentValue::from(serde_json::json!({
//!         "id": "REQ-REQ-ITEM-001",
//!         "derived_from": "PLN-PLN-GOAL-001",
//!     })),
//! );
//! let corpus = [plan, req];
//!
//! let registry = IdentifierRegistry::build(&corpus);
//! let refs = extract_references(&corpus);
//! let pending = find_placeholders(&corpus);
//! let report = ConsistencyAnalyzer::new().analyze(&registry, &refs, &pending);
//! assert!(report.overall_pass);
//! ```

#![warn(unreachable_pub)]

pub mod analysis;
pub mod patch;
pub mod placeholder;
pub mod reference;
pub mod registry;

// Re-exports
pub use analysis::{BrokenLink, ConsistencyAnalyzer, ConsistencyReport};
pub use patch::{apply_patch, Patch, PatchError, PatchLocation, PatchOutcome};
pub use placeholder::{find_placeholders, PlaceholderEntry};
pub use reference::{extract_document_references, extract_references, Reference};
pub use registry::{DuplicateDeclaration, IdentifierRegistry};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for traceability analysis
    pub use crate::{
        apply_patch, extract_references, find_placeholders, ConsistencyAnalyzer,
        ConsistencyReport, IdentifierRegistry, Patch, PlaceholderEntry, Reference,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
