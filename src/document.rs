//! Data types for documents, metadata, and search results.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A scalar metadata value: string, number, or boolean.
///
/// Metadata keys are arbitrary and undeclared; values are restricted to
/// this closed set so filters and statistics stay well defined. Serialized
/// untagged, so metadata round-trips as plain JSON scalars.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MetadataValue {
    /// A boolean value.
    Bool(bool),
    /// A numeric value (integers are widened to `f64`).
    Num(f64),
    /// A string value.
    Str(String),
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Bool(b) => write!(f, "{b}"),
            MetadataValue::Num(n) => write!(f, "{n}"),
            MetadataValue::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(s: &str) -> Self {
        MetadataValue::Str(s.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(s: String) -> Self {
        MetadataValue::Str(s)
    }
}

impl From<f64> for MetadataValue {
    fn from(n: f64) -> Self {
        MetadataValue::Num(n)
    }
}

impl From<i64> for MetadataValue {
    fn from(n: i64) -> Self {
        MetadataValue::Num(n as f64)
    }
}

impl From<bool> for MetadataValue {
    fn from(b: bool) -> Self {
        MetadataValue::Bool(b)
    }
}

/// Key-value metadata attached to a document.
pub type Metadata = HashMap<String, MetadataValue>;

/// A stored document: text content plus its vector embedding and metadata.
///
/// The embedding length always equals the owning collection's locked
/// dimension. Documents that were added without metadata carry an empty
/// map, never an absent one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier within the collection.
    pub id: String,
    /// The indexed text content.
    pub text: String,
    /// The vector embedding for `text`.
    pub embedding: Vec<f32>,
    /// Key-value metadata.
    pub metadata: Metadata,
}

/// A document as returned to callers: text and metadata, no embedding.
///
/// Embeddings are internal to the store; they are reconstructible by
/// re-embedding `text` and are never handed back through the read API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentView {
    /// Unique identifier within the collection.
    pub id: String,
    /// The indexed text content.
    pub text: String,
    /// Key-value metadata.
    pub metadata: Metadata,
}

impl From<Document> for DocumentView {
    fn from(doc: Document) -> Self {
        DocumentView { id: doc.id, text: doc.text, metadata: doc.metadata }
    }
}

/// A similarity search result: a document with its distance to the query.
///
/// Smaller distance means more similar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// The matched document id.
    pub id: String,
    /// The matched document's text.
    pub text: String,
    /// The matched document's metadata.
    pub metadata: Metadata,
    /// Distance between the query embedding and the document embedding.
    pub distance: f32,
}

/// A hybrid search result combining semantic and lexical relevance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HybridHit {
    /// The matched document id.
    pub id: String,
    /// The matched document's text.
    pub text: String,
    /// Weighted combination of semantic and keyword scores (higher is better).
    pub combined_score: f32,
    /// Semantic similarity derived from vector distance, in [0, 1].
    pub semantic_score: f32,
    /// Fraction of query tokens present in the document text, in [0, 1].
    pub keyword_score: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_value_round_trips_as_plain_scalars() {
        let mut metadata = Metadata::new();
        metadata.insert("category".into(), "ai".into());
        metadata.insert("year".into(), 2024i64.into());
        metadata.insert("published".into(), true.into());

        let json = serde_json::to_string(&metadata).unwrap();
        let back: Metadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back, metadata);
        assert!(json.contains("\"ai\""));
        assert!(json.contains("2024"));
        assert!(json.contains("true"));
    }

    #[test]
    fn metadata_value_display_stringifies_like_json() {
        assert_eq!(MetadataValue::from("x").to_string(), "x");
        assert_eq!(MetadataValue::from(3.0).to_string(), "3");
        assert_eq!(MetadataValue::from(false).to_string(), "false");
    }
}
