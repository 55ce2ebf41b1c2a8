//! AIDD Corpus Layer
//!
//! The boundary between the filesystem and the document trees the
//! traceability engine works on.
//!
//! # Core Operations
//!
//! - **Discovery**: walk root paths for YAML/JSON files
//! - **Ingress**: parse each file into a [`aidd_artifact::Document`]
//! - **Egress**: serialize a patched tree back over its file
//!
//! ```text
//! roots → discover → parse → Document ... patched tree → serialize → file
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use aidd_corpus::CorpusLayer;
//! use std::path::PathBuf;
//!
//! let layer = CorpusLayer::new(".");
//! let corpus = layer.load(&[PathBuf::from("docs")]);
//! println!("{} documents", corpus.documents.len());
//! ```

#![warn(unreachable_pub)]

pub mod discovery;
pub mod error;
pub mod layer;
pub mod parsers;

// Re-exports for convenience
pub use discovery::{discover, Discovery};
pub use error::{CorpusError, CorpusResult, ParseError, SerializeError};
pub use layer::{CorpusLayer, LoadedCorpus, ParseFailure};
pub use parsers::{default_parsers, DocumentParser, JsonParser, ParserRegistry, YamlParser};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the corpus layer
    pub use crate::error::{CorpusError, ParseError, SerializeError};
    pub use crate::layer::{CorpusLayer, LoadedCorpus};
    pub use crate::parsers::{DocumentParser, JsonParser, YamlParser};
}
