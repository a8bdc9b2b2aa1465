//! In-memory document store, held for the lifetime of the process.

use async_trait::async_trait;
use pipewright_core::document::{Document, DocumentFilter, DocumentStore, DuplicatePolicy};
use pipewright_core::error::StoreError;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::vector::rank_by_similarity;

/// A store that keeps documents in a Vec, in insertion order.
#[derive(Clone)]
pub struct InMemoryDocumentStore {
    documents: Arc<RwLock<Vec<Document>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            documents: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn write(
        &self,
        documents: Vec<Document>,
        policy: DuplicatePolicy,
    ) -> Result<usize, StoreError> {
        let mut stored = self.documents.write().await;

        if policy == DuplicatePolicy::Fail {
            // Check the whole batch first so a failed write stores nothing.
            let mut seen: Vec<&str> = Vec::with_capacity(documents.len());
            for doc in &documents {
                if seen.contains(&doc.id.as_str()) || stored.iter().any(|d| d.id == doc.id) {
                    return Err(StoreError::DuplicateDocument(doc.id.clone()));
                }
                seen.push(&doc.id);
            }
        }

        let mut written = 0;
        for doc in documents {
            match stored.iter().position(|d| d.id == doc.id) {
                Some(_) if policy == DuplicatePolicy::Skip => {
                    debug!(id = %doc.id, "Skipping duplicate document");
                }
                Some(index) => {
                    stored[index] = doc;
                    written += 1;
                }
                None => {
                    stored.push(doc);
                    written += 1;
                }
            }
        }

        debug!(written, total = stored.len(), "Documents written");
        Ok(written)
    }

    async fn filter(&self, filter: &DocumentFilter) -> Result<Vec<Document>, StoreError> {
        let stored = self.documents.read().await;
        Ok(stored.iter().filter(|d| filter.matches(d)).cloned().collect())
    }

    async fn embedding_retrieval(
        &self,
        query_embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<Document>, StoreError> {
        let stored = self.documents.read().await;
        rank_by_similarity(&stored, query_embedding, top_k)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.documents.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embedded(text: &str, embedding: Vec<f32>) -> Document {
        let mut d = Document::new(text);
        d.embedding = Some(embedding);
        d
    }

    #[tokio::test]
    async fn write_and_count() {
        let store = InMemoryDocumentStore::new();
        let n = store
            .write(
                vec![Document::new("first"), Document::new("second")],
                DuplicatePolicy::Overwrite,
            )
            .await
            .unwrap();
        assert_eq!(n, 2);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn skip_keeps_existing() {
        let store = InMemoryDocumentStore::new();
        let original = embedded("same", vec![1.0, 0.0]);
        store.write(vec![original], DuplicatePolicy::Overwrite).await.unwrap();

        let replacement = embedded("same", vec![0.0, 1.0]);
        let n = store.write(vec![replacement], DuplicatePolicy::Skip).await.unwrap();
        assert_eq!(n, 0);

        let docs = store.filter(&DocumentFilter::all()).await.unwrap();
        assert_eq!(docs[0].embedding, Some(vec![1.0, 0.0]));
    }

    #[tokio::test]
    async fn overwrite_replaces_in_place() {
        let store = InMemoryDocumentStore::new();
        store
            .write(
                vec![embedded("same", vec![1.0, 0.0]), Document::new("other")],
                DuplicatePolicy::Overwrite,
            )
            .await
            .unwrap();
        store
            .write(vec![embedded("same", vec![0.0, 1.0])], DuplicatePolicy::Overwrite)
            .await
            .unwrap();

        let docs = store.filter(&DocumentFilter::all()).await.unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].content, "same");
        assert_eq!(docs[0].embedding, Some(vec![0.0, 1.0]));
    }

    #[tokio::test]
    async fn fail_rejects_whole_batch() {
        let store = InMemoryDocumentStore::new();
        store
            .write(vec![Document::new("existing")], DuplicatePolicy::Overwrite)
            .await
            .unwrap();

        let err = store
            .write(
                vec![Document::new("new"), Document::new("existing")],
                DuplicatePolicy::Fail,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateDocument(_)));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn filter_by_meta() {
        let store = InMemoryDocumentStore::new();
        store
            .write(
                vec![
                    Document::new("a").insert_meta("url", "https://a.example"),
                    Document::new("b").insert_meta("url", "https://b.example"),
                ],
                DuplicatePolicy::Overwrite,
            )
            .await
            .unwrap();

        let hits = store
            .filter(&DocumentFilter::all().with("url", "https://b.example"))
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].content, "b");
    }

    #[tokio::test]
    async fn retrieval_returns_nearest_first() {
        let store = InMemoryDocumentStore::new();
        store
            .write(
                vec![
                    embedded("far", vec![0.0, 1.0]),
                    embedded("near", vec![1.0, 0.1]),
                    Document::new("no embedding"),
                ],
                DuplicatePolicy::Overwrite,
            )
            .await
            .unwrap();

        let hits = store.embedding_retrieval(&[1.0, 0.0], 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].content, "near");
        assert!(hits[0].score.is_some());
    }

    #[tokio::test]
    async fn empty_store_retrieves_nothing() {
        let store = InMemoryDocumentStore::new();
        assert!(store.embedding_retrieval(&[1.0], 5).await.unwrap().is_empty());
    }
}
