//! Backend selection from configuration.
//!
//! The generator and the embedder are chosen independently: generation
//! always goes to the OpenAI-compatible endpoint in `base_url`, while
//! embeddings follow `[embedding].provider`.

use std::sync::Arc;

use pipewright_config::{AppConfig, ConfigError};
use pipewright_core::provider::{Embedder, Provider};
use tracing::debug;

use crate::cohere::{CohereEmbedder, InputType};
use crate::hashing::HashingEmbedder;
use crate::openai_compat::OpenAiCompatProvider;

/// Build the text generator. Fails when no OpenAI credential is available.
pub fn build_provider(config: &AppConfig) -> Result<Arc<dyn Provider>, ConfigError> {
    let api_key = config.require_api_key()?;
    debug!(base_url = %config.base_url, "Using OpenAI-compatible generator");
    Ok(Arc::new(OpenAiCompatProvider::new(
        provider_name(&config.base_url),
        &config.base_url,
        api_key,
    )))
}

/// Build the embedder named by `[embedding].provider`.
pub fn build_embedder(
    config: &AppConfig,
    input_type: InputType,
) -> Result<Arc<dyn Embedder>, ConfigError> {
    let embedding = &config.embedding;
    debug!(provider = %embedding.provider, model = ?embedding.model, "Selecting embedder");

    match embedding.provider.as_str() {
        "openai" => {
            let api_key = config.require_api_key()?;
            let mut embedder =
                OpenAiCompatProvider::new(provider_name(&config.base_url), &config.base_url, api_key);
            if let Some(model) = &embedding.model {
                embedder = embedder.with_embedding_model(model);
            }
            Ok(Arc::new(embedder))
        }
        "cohere" => {
            let api_key = embedding
                .cohere_api_key
                .as_deref()
                .ok_or(ConfigError::MissingCredential("CO_API_KEY"))?;
            let mut embedder = CohereEmbedder::new(embedding.cohere_api_url.as_deref(), api_key)
                .with_input_type(input_type);
            if let Some(model) = &embedding.model {
                embedder = embedder.with_model(model);
            }
            Ok(Arc::new(embedder))
        }
        "hashing" => Ok(Arc::new(HashingEmbedder::new(embedding.dimensions))),
        other => Err(ConfigError::ValidationError(format!(
            "unknown embedding provider '{other}'"
        ))),
    }
}

/// Derive a display name for an OpenAI-compatible endpoint.
fn provider_name(base_url: &str) -> &'static str {
    if base_url.contains("api.openai.com") {
        "openai"
    } else if base_url.contains("openrouter.ai") {
        "openrouter"
    } else if base_url.contains("localhost:11434") {
        "ollama"
    } else {
        "custom"
    }
}
