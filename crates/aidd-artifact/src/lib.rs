//! AIDD Artifact Model
//!
//! The vocabulary every traceability component speaks.
//!
//! # Core Concepts
//!
//! - [`Identifier`]: validated `PREFIX-PHASE-PURPOSE-NNN` identifier
//! - [`DocumentValue`]: schema-less tree (mapping / sequence / scalar)
//! - [`Document`]: one parsed artifact plus its display path
//! - [`fields`]: own-identifier keys, reference keys and the pending rule
//!
//! # Example
//!
//! ```rust
//! use aidd_artifact::{is_identifier, DocumentValue};
//!
//! assert!(is_identifier("PLN-PLN-GOAL-001"));
//!
//! let node = DocumentValue::from(serde_json::json!({"id": "PLN-PLN-GOAL-001"}));
//! assert_eq!(node.own_identifier().unwrap().as_str(), "PLN-PLN-GOAL-001");
//! ```

#![warn(unreachable_pub)]

pub mod document;
pub mod fields;
pub mod identifier;

// Re-exports
pub use document::{own_identifier, Document, DocumentValue, Key, Mapping, Scalar, TaggedValue};
pub use fields::{is_pending, ReferenceDirection};
pub use identifier::{is_identifier, Identifier, IdentifierError, IDENTIFIER_PATTERN};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with artifacts
    pub use crate::{
        is_identifier, is_pending, Document, DocumentValue, Identifier, Mapping,
        ReferenceDirection, Scalar,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
