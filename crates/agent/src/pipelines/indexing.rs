//! Indexing pipeline: convert → split → embed → write.

use std::path::PathBuf;
use std::sync::Arc;

use pipewright_core::document::{Document, DocumentStore, DuplicatePolicy};
use pipewright_core::error::{Result, StoreError};
use pipewright_core::provider::{EmbeddingRequest, Embedder};
use pipewright_fetch::{HtmlConverter, LinkFetcher, TextFileConverter};
use serde::Serialize;
use tracing::{debug, info};

use super::splitter::DocumentSplitter;

/// Counts from one indexing run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexReport {
    /// Documents received
    pub documents: usize,
    /// Documents after splitting
    pub chunks: usize,
    /// Documents the store accepted
    pub written: usize,
}

pub struct IndexingPipeline {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn DocumentStore>,
    splitter: Option<DocumentSplitter>,
    policy: DuplicatePolicy,
}

impl IndexingPipeline {
    /// A pipeline that embeds whole documents.
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            embedder,
            store,
            splitter: None,
            policy: DuplicatePolicy::default(),
        }
    }

    pub fn with_splitter(mut self, splitter: DocumentSplitter) -> Self {
        self.splitter = Some(splitter);
        self
    }

    pub fn with_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub async fn index(&self, documents: Vec<Document>) -> Result<IndexReport> {
        let received = documents.len();

        let mut chunks = match &self.splitter {
            Some(splitter) => splitter.split(documents),
            None => documents,
        };

        if chunks.is_empty() {
            info!(documents = received, "Nothing to index");
            return Ok(IndexReport {
                documents: received,
                ..IndexReport::default()
            });
        }

        self.embed(&mut chunks).await?;

        let chunk_count = chunks.len();
        let written = self.store.write(chunks, self.policy).await?;

        info!(
            documents = received,
            chunks = chunk_count,
            written,
            store = self.store.name(),
            "Indexing complete"
        );

        Ok(IndexReport {
            documents: received,
            chunks: chunk_count,
            written,
        })
    }

    /// Read text files and index them.
    pub async fn index_files(&self, paths: &[PathBuf]) -> Result<IndexReport> {
        let documents = TextFileConverter.convert(paths).await;
        self.index(documents).await
    }

    /// Fetch web pages, convert them from HTML and index them.
    pub async fn index_urls(&self, links: &LinkFetcher, urls: &[String]) -> Result<IndexReport> {
        let streams = links.fetch_urls(urls).await;
        let documents = HtmlConverter.convert(streams);
        self.index(documents).await
    }

    /// Embed every document in one request.
    async fn embed(&self, documents: &mut [Document]) -> Result<()> {
        let request = EmbeddingRequest {
            model: self.embedder.model().to_string(),
            inputs: documents.iter().map(|d| d.content.clone()).collect(),
        };

        debug!(
            embedder = self.embedder.name(),
            count = request.inputs.len(),
            "Embedding documents"
        );

        let response = self.embedder.embed(request).await?;
        let mut embeddings = response.embeddings.into_iter();

        for doc in documents.iter_mut() {
            let embedding = embeddings
                .next()
                .ok_or_else(|| StoreError::MissingEmbedding(doc.id.clone()))?;
            doc.embedding = Some(embedding);
        }

        Ok(())
    }
}
