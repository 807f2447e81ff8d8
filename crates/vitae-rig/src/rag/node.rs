//! Index node types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A text fragment stored in an index together with its embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedNode {
    /// Node identifier, unique within its index.
    pub id: String,
    /// Text of the fragment.
    pub text: String,
    /// Pre-computed embedding of `text`.
    pub embedding: Vec<f64>,
    /// Free-form metadata (source file, page, ...).
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// A node returned by a similarity query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedNode {
    /// Node identifier.
    pub id: String,
    /// Text of the fragment.
    pub text: String,
    /// Similarity score against the query.
    pub score: f64,
    /// Metadata carried over from the index.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl RetrievedNode {
    /// Creates a retrieved node without metadata.
    pub fn new(id: impl Into<String>, text: impl Into<String>, score: f64) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            score,
            metadata: Map::new(),
        }
    }

    /// Creates a retrieved node from an indexed node and its score.
    pub fn from_indexed(node: &IndexedNode, score: f64) -> Self {
        Self {
            id: node.id.clone(),
            text: node.text.clone(),
            score,
            metadata: node.metadata.clone(),
        }
    }
}

/// On-disk representation of a persisted index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexFile {
    /// All nodes of the index.
    pub nodes: Vec<IndexedNode>,
}
