//! Core document types for juridoc.
//!
//! A `Document` is an immutable corpus entry: a legal passage with a stable
//! string identifier and a small metadata map (`code`, `code_display`,
//! `article_number`, `article_id`, `reference`). Rankers and fusion never copy
//! document text; they only carry ids and scores.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Metadata key holding the machine code name (e.g. `code_de_la_famille`).
pub const META_CODE: &str = "code";
/// Metadata key holding the display name of the code.
pub const META_CODE_DISPLAY: &str = "code_display";
/// Metadata key holding the article number.
pub const META_ARTICLE_NUMBER: &str = "article_number";
/// Metadata key holding an alternative article identifier.
pub const META_ARTICLE_ID: &str = "article_id";
/// Metadata key holding a free-form reference.
pub const META_REFERENCE: &str = "reference";
/// Metadata key used for the placeholder metadata of unresolved ids.
pub const META_ID: &str = "id";

/// A typed metadata value attached to a document.
///
/// Serialized untagged so that corpus files can use plain JSON scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    /// Boolean value (`true` / `false`).
    Boolean(bool),
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit floating-point number.
    Float(f64),
    /// UTF-8 string.
    String(String),
    /// Explicit `null`. Never truthy.
    Null,
}

impl MetadataValue {
    /// Whether the value counts as present when choosing between fallbacks:
    /// empty strings, zero and `false` do not.
    pub fn is_truthy(&self) -> bool {
        match self {
            MetadataValue::Boolean(b) => *b,
            MetadataValue::Integer(i) => *i != 0,
            MetadataValue::Float(f) => *f != 0.0,
            MetadataValue::String(s) => !s.is_empty(),
            MetadataValue::Null => false,
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Boolean(true) => f.write_str("True"),
            MetadataValue::Boolean(false) => f.write_str("False"),
            MetadataValue::Integer(i) => write!(f, "{i}"),
            MetadataValue::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{x:.1}"),
            MetadataValue::Float(x) => write!(f, "{x}"),
            MetadataValue::String(s) => f.write_str(s),
            MetadataValue::Null => f.write_str("None"),
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::String(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::String(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        MetadataValue::Integer(value)
    }
}

/// Document metadata keyed by field name.
pub type Metadata = HashMap<String, MetadataValue>;

/// Placeholder metadata for an id that does not resolve in the corpus.
pub fn placeholder_metadata(id: &str) -> Metadata {
    let mut metadata = Metadata::with_capacity(1);
    metadata.insert(META_ID.to_string(), MetadataValue::from(id));
    metadata
}

/// A corpus entry: passage text plus metadata under a stable id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Stable identifier, unique across the corpus.
    pub id: String,
    /// Full passage content.
    pub text: String,
    /// Citation metadata.
    #[serde(default)]
    pub metadata: Metadata,
}

impl Document {
    /// Creates a document with the given id, text and metadata.
    pub fn new(id: impl Into<String>, text: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            metadata,
        }
    }
}
