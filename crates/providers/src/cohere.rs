//! Cohere embedding backend (`POST /v1/embed`).
//!
//! The base URL comes from configuration (`CO_API_URL`), so the same client
//! works against Cohere's hosted API and self-hosted gateways.

use async_trait::async_trait;
use pipewright_core::error::ProviderError;
use pipewright_core::provider::{EmbeddingRequest, EmbeddingResponse, Embedder};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::openai_compat::check_status;

pub const DEFAULT_COHERE_URL: &str = "https://api.cohere.com";

/// Which side of a search the embedded texts are on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    SearchQuery,
    SearchDocument,
}

impl InputType {
    fn as_str(&self) -> &'static str {
        match self {
            InputType::SearchQuery => "search_query",
            InputType::SearchDocument => "search_document",
        }
    }
}

pub struct CohereEmbedder {
    base_url: String,
    api_key: String,
    model: String,
    input_type: InputType,
    client: reqwest::Client,
}

impl CohereEmbedder {
    pub fn new(base_url: Option<&str>, api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });

        Self {
            base_url: base_url
                .unwrap_or(DEFAULT_COHERE_URL)
                .trim_end_matches('/')
                .to_string(),
            api_key: api_key.into(),
            model: "embed-english-v3.0".into(),
            input_type: InputType::SearchQuery,
            client,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_input_type(mut self, input_type: InputType) -> Self {
        self.input_type = input_type;
        self
    }

    fn body(&self, request: &EmbeddingRequest) -> serde_json::Value {
        serde_json::json!({
            "texts": request.inputs,
            "model": request.model,
            "input_type": self.input_type.as_str(),
            "embedding_types": ["float"],
        })
    }
}

#[async_trait]
impl Embedder for CohereEmbedder {
    fn name(&self) -> &str {
        "cohere"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(
        &self,
        request: EmbeddingRequest,
    ) -> std::result::Result<EmbeddingResponse, ProviderError> {
        let url = format!("{}/v1/embed", self.base_url);

        debug!(model = %request.model, count = request.inputs.len(), "Sending Cohere embed request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&self.body(&request))
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let response = check_status(response).await?;

        let parsed: CohereResponse = response.json().await.map_err(|e| ProviderError::ApiError {
            status_code: 200,
            message: format!("Failed to parse Cohere response: {e}"),
        })?;

        Ok(EmbeddingResponse {
            embeddings: parsed.embeddings.into_vectors(),
            model: request.model,
            usage: None,
        })
    }
}

#[derive(Debug, Deserialize)]
struct CohereResponse {
    embeddings: CohereEmbeddings,
}

/// `embeddings` is a bare list for legacy requests and a map keyed by
/// embedding type when `embedding_types` is sent.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CohereEmbeddings {
    Plain(Vec<Vec<f32>>),
    Typed { float: Vec<Vec<f32>> },
}

impl CohereEmbeddings {
    fn into_vectors(self) -> Vec<Vec<f32>> {
        match self {
            CohereEmbeddings::Plain(v) => v,
            CohereEmbeddings::Typed { float } => float,
        }
    }
}
