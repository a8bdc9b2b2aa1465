//! Documents and the document store trait.
//!
//! A [`Document`] is a piece of text plus free-form metadata, optionally
//! carrying an embedding. Stores hold documents for the lifetime of the
//! process and answer metadata filters and embedding similarity queries.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::StoreError;

/// Document metadata.
pub type Meta = serde_json::Map<String, serde_json::Value>;

/// A unit of retrievable content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Content-derived ID (see [`Document::new`])
    pub id: String,

    /// The text content
    pub content: String,

    /// Free-form metadata (url, file_path, title, split_id, ...)
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub meta: Meta,

    /// Embedding vector, set by an embedding step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,

    /// Relevance score, set by retrieval
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl Document {
    /// Create a document without metadata.
    pub fn new(content: impl Into<String>) -> Self {
        Self::with_meta(content, Meta::new())
    }

    /// Create a document; the ID is a SHA-256 over content and metadata.
    pub fn with_meta(content: impl Into<String>, meta: Meta) -> Self {
        let content = content.into();
        let id = content_id(&content, &meta);
        Self {
            id,
            content,
            meta,
            embedding: None,
            score: None,
        }
    }

    /// Insert a metadata entry and recompute the ID.
    pub fn insert_meta(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self.id = content_id(&self.content, &self.meta);
        self
    }

    /// A string metadata value.
    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.meta.get(key).and_then(|v| v.as_str())
    }
}

fn content_id(content: &str, meta: &Meta) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    // serde_json::Map is ordered by key, so this is stable.
    hasher.update(serde_json::Value::Object(meta.clone()).to_string().as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// What to do when a written document's ID already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Keep the stored document, drop the new one
    Skip,
    /// Replace the stored document
    #[default]
    Overwrite,
    /// Abort the write with [`StoreError::DuplicateDocument`]
    Fail,
}

/// Metadata equality filter. An empty filter matches everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentFilter {
    #[serde(default)]
    pub meta: Meta,
}

impl DocumentFilter {
    /// Match every document.
    pub fn all() -> Self {
        Self::default()
    }

    /// Require `meta[key] == value`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    pub fn matches(&self, document: &Document) -> bool {
        self.meta
            .iter()
            .all(|(k, v)| document.meta.get(k) == Some(v))
    }
}

/// The document store collaborator.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// The backend name (e.g., "in_memory").
    fn name(&self) -> &str;

    /// Write documents; returns how many were stored.
    async fn write(
        &self,
        documents: Vec<Document>,
        policy: DuplicatePolicy,
    ) -> std::result::Result<usize, StoreError>;

    /// Documents matching a filter, in insertion order.
    async fn filter(&self, filter: &DocumentFilter) -> std::result::Result<Vec<Document>, StoreError>;

    /// The `top_k` documents most similar to `query_embedding`.
    async fn embedding_retrieval(
        &self,
        query_embedding: &[f32],
        top_k: usize,
    ) -> std::result::Result<Vec<Document>, StoreError>;

    /// Total document count.
    async fn count(&self) -> std::result::Result<usize, StoreError>;
}
