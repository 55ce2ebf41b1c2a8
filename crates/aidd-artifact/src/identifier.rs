//! AIDD identifiers
//!
//! Provides [`Identifier`], a validated `PREFIX-PHASE-PURPOSE-NNN` string, and
//! the [`is_identifier`] predicate used by every tree walker.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Fixed identifier shape: prefix and phase of 2-5 capitals, purpose of
/// capitals/digits/underscore, three-digit sequence.
pub const IDENTIFIER_PATTERN: &str = r"^[A-Z]{2,5}-[A-Z]{2,5}-[A-Z0-9_]+-\d{3}$";

static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(IDENTIFIER_PATTERN).expect("identifier pattern compiles"));

/// Check whether `value` has the identifier shape
///
/// Surrounding whitespace is ignored, matching how values come out of
/// hand-edited YAML.
#[inline]
#[must_use]
pub fn is_identifier(value: &str) -> bool {
    IDENTIFIER_RE.is_match(value.trim())
}

/// A validated AIDD identifier
///
/// # Examples
/// ```
/// use aidd_artifact::Identifier;
///
/// let id: Identifier = "REQ-REQ-ITEM-001".parse().unwrap();
/// assert_eq!(id.prefix(), "REQ");
/// assert_eq!(id.sequence(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);

impl Identifier {
    /// Parse a raw value, trimming surrounding whitespace
    ///
    /// # Errors
    /// Returns [`IdentifierError::Malformed`] if the value does not match the
    /// grammar.
    pub fn parse(raw: &str) -> Result<Self, IdentifierError> {
        let trimmed = raw.trim();
        if IDENTIFIER_RE.is_match(trimmed) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(IdentifierError::Malformed(raw.to_string()))
        }
    }

    /// Identifier as a string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leading prefix segment (e.g. `PLN`)
    #[must_use]
    pub fn prefix(&self) -> &str {
        self.0.split('-').next().unwrap_or_default()
    }

    /// Phase segment (e.g. `REQ`)
    #[must_use]
    pub fn phase(&self) -> &str {
        self.0.split('-').nth(1).unwrap_or_default()
    }

    /// Purpose segment
    ///
    /// The purpose never contains `-`, so it is everything between the phase
    /// and the final sequence.
    #[must_use]
    pub fn purpose(&self) -> &str {
        let without_seq = self.0.rsplit_once('-').map_or("", |(head, _)| head);
        without_seq.splitn(3, '-').nth(2).unwrap_or_default()
    }

    /// Numeric sequence (the trailing `NNN`)
    #[must_use]
    pub fn sequence(&self) -> u16 {
        self.0
            .rsplit('-')
            .next()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// Consume into the inner string
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Identifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Identifier {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> Self {
        id.0
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Identifier {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Identifier {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Identifier {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Errors related to identifiers
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentifierError {
    /// Value does not have the `PREFIX-PHASE-PURPOSE-NNN` shape
    #[error("not an AIDD identifier (PREFIX-PHASE-PURPOSE-NNN): '{0}'")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn accepts_canonical_identifiers() {
        assert!(is_identifier("PLN-PLN-GOAL-001"));
        assert!(is_identifier("REQ-REQ-ITEM-001"));
        assert!(is_identifier("PRM-PLN-YAML_V2-042"));
        assert!(is_identifier("ABCDE-XY-9-999"));
    }

    #[test]
    fn rejects_malformed_identifiers() {
        assert!(!is_identifier(""));
        assert!(!is_identifier("PENDING"));
        assert!(!is_identifier("pln-pln-goal-001"));
        assert!(!is_identifier("P-PLN-GOAL-001"));
        assert!(!is_identifier("ABCDEF-PLN-GOAL-001"));
        assert!(!is_identifier("PLN-PLN-GOAL-01"));
        assert!(!is_identifier("PLN-PLN-GOAL-0001"));
        assert!(!is_identifier("PLN-PLN--001"));
        assert!(!is_identifier("PLN-PLN-GO-AL-001"));
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert!(is_identifier("  PLN-PLN-GOAL-001 \n"));
        let id = Identifier::parse(" PLN-PLN-GOAL-001 ").unwrap();
        assert_eq!(id.as_str(), "PLN-PLN-GOAL-001");
    }

    #[test]
    fn segments() {
        let id = Identifier::parse("PRM-PLN-YAML_V2-042").unwrap();
        assert_eq!(id.prefix(), "PRM");
        assert_eq!(id.phase(), "PLN");
        assert_eq!(id.purpose(), "YAML_V2");
        assert_eq!(id.sequence(), 42);
    }

    #[test]
    fn parse_error_display() {
        let err = Identifier::parse("nope").unwrap_err();
        assert_eq!(
            err.to_string(),
            "not an AIDD identifier (PREFIX-PHASE-PURPOSE-NNN): 'nope'"
        );
    }

    #[test]
    fn serde_is_transparent_and_validating() {
        let id: Identifier = serde_json::from_str("\"PLN-PLN-GOAL-001\"").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"PLN-PLN-GOAL-001\"");
        assert!(serde_json::from_str::<Identifier>("\"PENDING\"").is_err());
    }

    proptest! {
        #[test]
        fn generated_identifiers_match(
            prefix in "[A-Z]{2,5}",
            phase in "[A-Z]{2,5}",
            purpose in "[A-Z0-9_]{1,12}",
            seq in 0u16..1000,
        ) {
            let raw = format!("{prefix}-{phase}-{purpose}-{seq:03}");
            prop_assert!(is_identifier(&raw));
            let id = Identifier::parse(&raw).unwrap();
            prop_assert_eq!(id.prefix(), prefix.as_str());
            prop_assert_eq!(id.phase(), phase.as_str());
            prop_assert_eq!(id.purpose(), purpose.as_str());
            prop_assert_eq!(id.sequence(), seq);
        }

        #[test]
        fn lowercase_never_matches(raw in "[a-z]{2,5}-[a-z]{2,5}-[a-z]{1,6}-[0-9]{3}") {
            prop_assert!(!is_identifier(&raw));
        }
    }
}
