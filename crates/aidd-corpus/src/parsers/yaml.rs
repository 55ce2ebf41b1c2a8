//! YAML document parser
//!
//! Uses serde_yaml; anchors, aliases and tags are resolved on the way in.
//! A file holds exactly one document. Written back in block style with the
//! original key order; comments do not survive a round-trip.

use super::DocumentParser;
use crate::error::{ParseError, SerializeError};
use aidd_artifact::DocumentValue;
use serde::Deserialize;
use serde_yaml::Value;
use std::path::Path;

/// YAML parser
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlParser;

impl YamlParser {
    /// Create new YAML parser
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl DocumentParser for YamlParser {
    fn parse(&self, path: &Path, content: &str) -> Result<DocumentValue, ParseError> {
        let mut documents = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(content) {
            let value = Value::deserialize(doc)
                .map_err(|e| ParseError::syntax_error(path, format!("YAML parse error: {e}")))?;
            documents.push(value);
        }

        match documents.len() {
            0 => Ok(DocumentValue::null()),
            1 => Ok(DocumentValue::from(documents.remove(0))),
            n => Err(ParseError::syntax_error(
                path,
                format!("expected a single YAML document, found {n}"),
            )),
        }
    }

    fn serialize(&self, value: &DocumentValue) -> Result<String, SerializeError> {
        serde_yaml::to_string(&value.to_yaml())
            .map_err(|e| SerializeError::FormatError(format!("YAML: {e}")))
    }

    fn extensions(&self) -> &[&str] {
        &["yaml", "yml"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(content: &str) -> Result<DocumentValue, ParseError> {
        YamlParser.parse(Path::new("input.yaml"), content)
    }

    #[test]
    fn yaml_parser_valid() {
        let doc = parse(
            r"
id: REQ-REQ-ITEM-001
nested:
  key: value
",
        )
        .unwrap();
        assert_eq!(doc.get("id").and_then(DocumentValue::as_str), Some("REQ-REQ-ITEM-001"));
        assert_eq!(
            doc.get("nested").and_then(|n| n.get("key")),
            Some(&DocumentValue::from("value"))
        );
    }

    #[test]
    fn yaml_parser_empty_is_null() {
        assert!(parse("").unwrap().is_null());
        assert!(parse("# only a comment\n").unwrap().is_null());
    }

    #[test]
    fn yaml_parser_rejects_multi_document() {
        let err = parse("a: 1\n---\nb: 2\n").unwrap_err();
        assert!(matches!(err, ParseError::SyntaxError { .. }));
        assert!(err.to_string().contains("found 2"));
    }

    #[test]
    fn yaml_parser_syntax_error_names_file() {
        let err = YamlParser
            .parse(Path::new("docs/bad.yaml"), "key: [unclosed\n")
            .unwrap_err();
        assert!(err.to_string().contains("docs/bad.yaml"));
    }

    #[test]
    fn yaml_serialize_block_style_in_order() {
        let doc = parse("id: REQ-REQ-ITEM-001\nderived_from: [PLN-PLN-GOAL-001]\ntitle: Login\n").unwrap();
        let out = YamlParser.serialize(&doc).unwrap();
        assert_eq!(
            out,
            "id: REQ-REQ-ITEM-001\nderived_from:\n- PLN-PLN-GOAL-001\ntitle: Login\n"
        );
        assert_eq!(parse(&out).unwrap(), doc);
    }

    #[test]
    fn yaml_parser_extensions() {
        assert!(YamlParser.extensions().contains(&"yaml"));
        assert!(YamlParser.extensions().contains(&"yml"));
    }
}
