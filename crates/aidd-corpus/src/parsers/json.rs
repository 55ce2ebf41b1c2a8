//! JSON document parser
//!
//! Key order is preserved in both directions; output is pretty-printed with
//! a trailing newline.

use super::DocumentParser;
use crate::error::{ParseError, SerializeError};
use aidd_artifact::DocumentValue;
use std::path::Path;

/// JSON parser
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonParser;

impl JsonParser {
    /// Create new JSON parser
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl DocumentParser for JsonParser {
    fn parse(&self, path: &Path, content: &str) -> Result<DocumentValue, ParseError> {
        if content.trim().is_empty() {
            return Ok(DocumentValue::null());
        }
        serde_json::from_str::<serde_json::Value>(content)
            .map(DocumentValue::from)
            .map_err(|e| ParseError::syntax_error(path, format!("JSON parse error: {e}")))
    }

    fn serialize(&self, value: &DocumentValue) -> Result<String, SerializeError> {
        let mut out = serde_json::to_string_pretty(value)
            .map_err(|e| SerializeError::FormatError(format!("JSON: {e}")))?;
        out.push('\n');
        Ok(out)
    }

    fn extensions(&self) -> &[&str] {
        &["json"]
    }
}
