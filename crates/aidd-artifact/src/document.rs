//! Schema-less document tree
//!
//! [`DocumentValue`] is the parsed form of one YAML or JSON artifact. Every
//! traceability walker matches on it exhaustively; nothing assumes a shape
//! beyond the keys listed in [`crate::fields`].

use crate::fields::OWN_ID_KEYS;
use crate::identifier::Identifier;
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

/// Ordered mapping node
///
/// Insertion order is kept so write-back reproduces the original key order;
/// equality ignores it.
pub type Mapping = IndexMap<Key, DocumentValue>;

/// Mapping key
///
/// Keys compare and hash by their text, so lookups take a plain `&str`. The
/// scalar the key was written as is kept for write-back: `1:` stays an
/// integer key and `true:` a boolean one.
#[derive(Debug, Clone)]
pub struct Key {
    text: String,
    scalar: Scalar,
}

impl Key {
    /// Key written as `scalar`
    #[must_use]
    pub fn new(scalar: Scalar) -> Self {
        let text = match &scalar {
            Scalar::Null => "null".to_string(),
            Scalar::Bool(b) => b.to_string(),
            Scalar::Int(i) => i.to_string(),
            Scalar::UInt(u) => u.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::String(s) => s.clone(),
        };
        Self { text, scalar }
    }

    /// Text the key compares by
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Scalar the key was written as
    #[inline]
    #[must_use]
    pub const fn scalar(&self) -> &Scalar {
        &self.scalar
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Self {
            text: value.clone(),
            scalar: Scalar::String(value),
        }
    }
}

/// Leaf value
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// `null` / `~` / missing value
    Null,
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Unsigned integer above `i64::MAX`
    UInt(u64),
    /// Floating point
    Float(f64),
    /// String
    String(String),
}

/// One node of a parsed document
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentValue {
    /// Key-value node
    Mapping(Mapping),
    /// Ordered list
    Sequence(Vec<DocumentValue>),
    /// Leaf
    Scalar(Scalar),
    /// Node carrying an explicit YAML tag such as `!custom`
    Tagged(Box<TaggedValue>),
}

/// Tag and the node it applies to
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedValue {
    /// Tag as written, including the leading `!`
    pub tag: String,
    /// Tagged node
    pub value: DocumentValue,
}

impl DocumentValue {
    /// Null leaf
    #[inline]
    #[must_use]
    pub const fn null() -> Self {
        Self::Scalar(Scalar::Null)
    }

    /// Node with any tags stripped
    #[must_use]
    pub fn untagged(&self) -> &DocumentValue {
        match self {
            Self::Tagged(tagged) => tagged.value.untagged(),
            other => other,
        }
    }

    /// Mutable node with any tags stripped
    pub fn untagged_mut(&mut self) -> &mut DocumentValue {
        match self {
            Self::Tagged(tagged) => tagged.value.untagged_mut(),
            other => other,
        }
    }

    /// True for a null leaf
    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self.untagged(), Self::Scalar(Scalar::Null))
    }

    /// String content, if this is a string leaf
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self.untagged() {
            Self::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Mapping content, if this is a mapping
    #[inline]
    #[must_use]
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self.untagged() {
            Self::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Mutable mapping content, if this is a mapping
    #[inline]
    pub fn as_mapping_mut(&mut self) -> Option<&mut Mapping> {
        match self.untagged_mut() {
            Self::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a key, if this is a mapping
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&DocumentValue> {
        self.as_mapping().and_then(|map| map.get(key))
    }

    /// Identifier this node declares for itself, if any
    ///
    /// Own-identifier keys are checked in priority order; the first one whose
    /// value is a string with the identifier shape wins.
    #[must_use]
    pub fn own_identifier(&self) -> Option<Identifier> {
        self.as_mapping().and_then(own_identifier)
    }

    /// Convert back into a YAML value for serialization
    #[must_use]
    pub fn to_yaml(&self) -> serde_yaml::Value {
        use serde_yaml::value::{Tag, TaggedValue as YamlTagged};
        use serde_yaml::Value;
        match self {
            Self::Mapping(map) => Value::Mapping(
                map.iter()
                    .map(|(k, v)| (k.scalar().to_yaml(), v.to_yaml()))
                    .collect(),
            ),
            Self::Sequence(items) => Value::Sequence(items.iter().map(Self::to_yaml).collect()),
            Self::Scalar(scalar) => scalar.to_yaml(),
            Self::Tagged(tagged) if tagged.tag.is_empty() => tagged.value.to_yaml(),
            Self::Tagged(tagged) => Value::Tagged(Box::new(YamlTagged {
                tag: Tag::new(tagged.tag.as_str()),
                value: tagged.value.to_yaml(),
            })),
        }
    }

    /// Convert into a JSON value
    ///
    /// Non-finite floats have no JSON form and become `null`. Tags are
    /// dropped.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            Self::Mapping(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.to_string(), v.to_json()))
                    .collect(),
            ),
            Self::Sequence(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Scalar(Scalar::Null) => Value::Null,
            Self::Scalar(Scalar::Bool(b)) => Value::Bool(*b),
            Self::Scalar(Scalar::Int(i)) => Value::Number((*i).into()),
            Self::Scalar(Scalar::UInt(u)) => Value::Number((*u).into()),
            Self::Scalar(Scalar::Float(f)) => {
                serde_json::Number::from_f64(*f).map_or(Value::Null, Value::Number)
            }
            Self::Scalar(Scalar::String(s)) => Value::String(s.clone()),
            Self::Tagged(tagged) => tagged.value.to_json(),
        }
    }
}

impl Scalar {
    fn to_yaml(&self) -> serde_yaml::Value {
        use serde_yaml::Value;
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(i) => Value::Number((*i).into()),
            Self::UInt(u) => Value::Number((*u).into()),
            Self::Float(f) => Value::Number((*f).into()),
            Self::String(s) => Value::String(s.clone()),
        }
    }
}

/// Identifier declared directly on a mapping node
#[must_use]
pub fn own_identifier(map: &Mapping) -> Option<Identifier> {
    OWN_ID_KEYS.iter().find_map(|key| {
        map.get(*key)
            .and_then(DocumentValue::as_str)
            .and_then(|raw| Identifier::parse(raw).ok())
    })
}

impl Default for DocumentValue {
    fn default() -> Self {
        Self::null()
    }
}

impl From<&str> for DocumentValue {
    fn from(value: &str) -> Self {
        Self::Scalar(Scalar::String(value.to_string()))
    }
}

impl From<String> for DocumentValue {
    fn from(value: String) -> Self {
        Self::Scalar(Scalar::String(value))
    }
}

impl From<&Identifier> for DocumentValue {
    fn from(value: &Identifier) -> Self {
        Self::from(value.as_str())
    }
}

impl From<Mapping> for DocumentValue {
    fn from(value: Mapping) -> Self {
        Self::Mapping(value)
    }
}

impl From<Vec<DocumentValue>> for DocumentValue {
    fn from(value: Vec<DocumentValue>) -> Self {
        Self::Sequence(value)
    }
}

impl From<serde_yaml::Value> for DocumentValue {
    fn from(value: serde_yaml::Value) -> Self {
        use serde_yaml::Value;
        match value {
            Value::Null => Self::null(),
            Value::Bool(b) => Self::Scalar(Scalar::Bool(b)),
            Value::Number(n) => Self::Scalar(yaml_number(&n)),
            Value::String(s) => Self::Scalar(Scalar::String(s)),
            Value::Sequence(items) => Self::Sequence(items.into_iter().map(Self::from).collect()),
            Value::Mapping(map) => Self::Mapping(
                map.into_iter()
                    .map(|(k, v)| (yaml_key(k), Self::from(v)))
                    .collect(),
            ),
            Value::Tagged(tagged) => Self::Tagged(Box::new(TaggedValue {
                tag: tagged.tag.to_string(),
                value: Self::from(tagged.value),
            })),
        }
    }
}

impl From<serde_json::Value> for DocumentValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::null(),
            Value::Bool(b) => Self::Scalar(Scalar::Bool(b)),
            Value::Number(n) => Self::Scalar(if let Some(i) = n.as_i64() {
                Scalar::Int(i)
            } else if let Some(u) = n.as_u64() {
                Scalar::UInt(u)
            } else {
                Scalar::Float(n.as_f64().unwrap_or(f64::NAN))
            }),
            Value::String(s) => Self::Scalar(Scalar::String(s)),
            Value::Array(items) => Self::Sequence(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => Self::Mapping(
                map.into_iter()
                    .map(|(k, v)| (Key::from(k), Self::from(v)))
                    .collect(),
            ),
        }
    }
}

fn yaml_number(n: &serde_yaml::Number) -> Scalar {
    if let Some(i) = n.as_i64() {
        Scalar::Int(i)
    } else if let Some(u) = n.as_u64() {
        Scalar::UInt(u)
    } else {
        Scalar::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

/// Scalar keys keep their type; sequence, mapping and tagged keys are
/// reduced to their printed form.
fn yaml_key(key: serde_yaml::Value) -> Key {
    use serde_yaml::Value;
    match key {
        Value::String(s) => Key::from(s),
        Value::Bool(b) => Key::new(Scalar::Bool(b)),
        Value::Number(n) => Key::new(yaml_number(&n)),
        Value::Null => Key::new(Scalar::Null),
        other => Key::from(
            serde_yaml::to_string(&other)
                .map(|s| s.trim_end().to_string())
                .unwrap_or_default(),
        ),
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::UInt(u) => serializer.serialize_u64(*u),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::String(s) => serializer.serialize_str(s),
        }
    }
}

impl Serialize for DocumentValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Scalar(scalar) => scalar.serialize(serializer),
            Self::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Mapping(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(k.as_str(), v)?;
                }
                out.end()
            }
            Self::Tagged(tagged) => tagged.value.serialize(serializer),
        }
    }
}

/// One parsed artifact of the corpus
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Display path (relative to the repository root when possible)
    pub path: String,
    /// Path on disk
    pub source: PathBuf,
    /// Parsed tree
    pub root: DocumentValue,
}

impl Document {
    /// Create a document
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<String>, source: impl Into<PathBuf>, root: DocumentValue) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
            root,
        }
    }

    /// In-memory document whose display path doubles as its source path
    #[must_use]
    pub fn in_memory(path: &str, root: DocumentValue) -> Self {
        Self::new(path, Path::new(path), root)
    }
}
