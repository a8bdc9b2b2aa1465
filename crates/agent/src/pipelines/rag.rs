//! Document search and retrieval-augmented generation.
//!
//! # Flow
//!
//! 1. Embed the question with the query embedder
//! 2. Retrieve the `top_k` nearest documents from the store
//! 3. Render the [`RagTemplate`] with the documents and the question
//! 4. Generate; the first reply is the answer

use std::sync::Arc;

use pipewright_core::document::{Document, DocumentStore};
use pipewright_core::error::Result;
use pipewright_core::provider::{Embedder, Provider};
use tracing::{debug, info, warn};

use crate::generation::Generation;
use crate::prompt::{PromptState, RagTemplate, compose};

/// Embedding search over a document store.
#[derive(Clone)]
pub struct DocumentSearch {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn DocumentStore>,
}

impl DocumentSearch {
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn DocumentStore>) -> Self {
        Self { embedder, store }
    }

    /// The `top_k` documents nearest to `query`, best first, with scores.
    pub async fn run(&self, query: &str, top_k: usize) -> Result<Vec<Document>> {
        let embedding = self.embedder.embed_one(query).await?;
        let documents = self.store.embedding_retrieval(&embedding, top_k).await?;
        debug!(query, top_k, hits = documents.len(), "Search complete");
        Ok(documents)
    }
}

/// The answer and the documents it was grounded on.
#[derive(Debug, Clone)]
pub struct RagAnswer {
    pub answer: String,
    pub documents: Vec<Document>,
}

pub struct RagPipeline {
    search: DocumentSearch,
    provider: Arc<dyn Provider>,
    generation: Generation,
    template: RagTemplate,
    top_k: usize,
}

impl RagPipeline {
    pub fn new(search: DocumentSearch, provider: Arc<dyn Provider>, generation: Generation) -> Self {
        Self {
            search,
            provider,
            generation,
            template: RagTemplate::Basic,
            top_k: 1,
        }
    }

    pub fn with_template(mut self, template: RagTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub async fn run(&self, question: &str) -> Result<RagAnswer> {
        info!(top_k = self.top_k, "RAG: retrieving");
        let documents = self.search.run(question, self.top_k).await?;

        let prompt = compose(&PromptState::Rag {
            template: &self.template,
            question,
            documents: &documents,
        });

        let response = self.provider.complete(self.generation.request(prompt)).await?;
        let answer = match response.replies.into_iter().next() {
            Some(answer) => answer,
            None => {
                warn!("Generator returned no replies");
                String::new()
            }
        };

        info!(
            sources = documents.len(),
            answer_len = answer.len(),
            "RAG: response generated"
        );

        Ok(RagAnswer { answer, documents })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipelines::IndexingPipeline;
    use crate::test_helpers::{SequentialMockProvider, make_empty_response};
    use pipewright_providers::HashingEmbedder;
    use pipewright_store::InMemoryDocumentStore;

    async fn indexed_search() -> DocumentSearch {
        let embedder = Arc::new(HashingEmbedder::new(256));
        let store = Arc::new(InMemoryDocumentStore::new());
        IndexingPipeline::new(embedder.clone(), store.clone())
            .index(vec![
                Document::new("Cohere embedders and generators integrate with Haystack pipelines")
                    .insert_meta("url", "https://haystack.deepset.ai/integrations/cohere"),
                Document::new("Anthropic Claude models are available as Haystack generators")
                    .insert_meta("url", "https://haystack.deepset.ai/integrations/anthropic"),
                Document::new("NVIDIA NIM microservices host embedding models"),
            ])
            .await
            .unwrap();
        DocumentSearch::new(embedder, store)
    }

    #[tokio::test]
    async fn search_ranks_relevant_document_first() {
        let search = indexed_search().await;
        let hits = search.run("How can I use Cohere with Haystack?", 3).await.unwrap();
        assert_eq!(hits.len(), 3);
        assert!(hits[0].content.starts_with("Cohere"));
        assert!(hits[0].score >= hits[1].score);
    }

    #[tokio::test]
    async fn rag_grounds_prompt_in_top_document() {
        let provider = Arc::new(SequentialMockProvider::replies(&[
            "Use the CohereGenerator component.",
        ]));
        let rag = RagPipeline::new(
            indexed_search().await,
            provider.clone(),
            Generation::new("gpt-3.5-turbo"),
        );

        let answer = rag.run("How can I use Cohere with Haystack?").await.unwrap();

        assert_eq!(answer.answer, "Use the CohereGenerator component.");
        assert_eq!(answer.documents.len(), 1);
        let prompt = &provider.prompts()[0];
        assert!(prompt.contains("Cohere embedders and generators"));
        assert!(!prompt.contains("NVIDIA"));
    }

    #[tokio::test]
    async fn cited_template_includes_source_url() {
        let provider = Arc::new(SequentialMockProvider::replies(&["Utilisez Cohere."]));
        let rag = RagPipeline::new(
            indexed_search().await,
            provider.clone(),
            Generation::new("gpt-3.5-turbo"),
        )
        .with_template(RagTemplate::Cited {
            language: "French".into(),
        });

        rag.run("How can I use Cohere with Haystack?").await.unwrap();

        let prompt = &provider.prompts()[0];
        assert!(prompt.contains("URL: https://haystack.deepset.ai/integrations/cohere"));
        assert!(prompt.contains("Your answer should be in French."));
    }

    #[tokio::test]
    async fn missing_reply_gives_empty_answer() {
        let provider = Arc::new(SequentialMockProvider::new(vec![make_empty_response()]));
        let rag = RagPipeline::new(indexed_search().await, provider, Generation::new("m"))
            .with_top_k(2);
        let answer = rag.run("Cohere?").await.unwrap();
        assert!(answer.answer.is_empty());
        assert_eq!(answer.documents.len(), 2);
    }
}
