//! Document parsers for the supported file formats
//!
//! Every format parses into the same schema-less [`DocumentValue`] and
//! serializes back from it:
//! - YAML (`.yaml`, `.yml`) via `serde_yaml`
//! - JSON (`.json`) via `serde_json`

use crate::error::{ParseError, SerializeError};
use aidd_artifact::DocumentValue;
use std::path::Path;

mod json;
mod yaml;

pub use json::JsonParser;
pub use yaml::YamlParser;

/// Format handler converting between file content and document trees
///
/// Implement this trait to add support for new file formats.
pub trait DocumentParser: Send + Sync + 'static {
    /// Parse file content; an empty document parses to a null root
    ///
    /// # Errors
    /// [`ParseError::SyntaxError`] naming `path` when the content is invalid.
    fn parse(&self, path: &Path, content: &str) -> Result<DocumentValue, ParseError>;

    /// Render a tree back into file content
    ///
    /// # Errors
    /// [`SerializeError::FormatError`] when the tree cannot be rendered.
    fn serialize(&self, value: &DocumentValue) -> Result<String, SerializeError>;

    /// Supported file extensions (without dot, lowercase)
    fn extensions(&self) -> &[&str];

    /// Check if this parser can handle the given path (extension is
    /// compared case-insensitively)
    fn can_parse(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions().iter().any(|known| known.eq_ignore_ascii_case(ext)))
    }
}

/// Parser lookup by file extension
pub struct ParserRegistry {
    parsers: Vec<Box<dyn DocumentParser>>,
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for ParserRegistry {
    fn clone(&self) -> Self {
        // Parsers are stateless
        default_parsers()
    }
}

impl std::fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParserRegistry")
            .field("parser_count", &self.parsers.len())
            .field("extensions", &self.all_extensions())
            .finish()
    }
}

impl ParserRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            parsers: Vec::new(),
        }
    }

    /// Register a parser
    pub fn register<P: DocumentParser>(&mut self, parser: P) {
        self.parsers.push(Box::new(parser));
    }

    /// Find parser for path
    #[must_use]
    pub fn find_for_path(&self, path: &Path) -> Option<&dyn DocumentParser> {
        self.parsers.iter().find(|p| p.can_parse(path)).map(|p| &**p)
    }

    /// Whether any parser handles `path`
    #[inline]
    #[must_use]
    pub fn supports(&self, path: &Path) -> bool {
        self.find_for_path(path).is_some()
    }

    /// Get all registered extensions
    #[must_use]
    pub fn all_extensions(&self) -> Vec<&str> {
        self.parsers
            .iter()
            .flat_map(|p| p.extensions())
            .copied()
            .collect()
    }
}

/// Create default parser registry with the YAML and JSON parsers
#[inline]
#[must_use]
pub fn default_parsers() -> ParserRegistry {
    let mut registry = ParserRegistry::new();
    registry.register(YamlParser);
    registry.register(JsonParser);
    registry
}
