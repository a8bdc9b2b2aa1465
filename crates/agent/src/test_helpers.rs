//! Shared test helpers.

use pipewright_core::error::ProviderError;
use pipewright_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use std::sync::Mutex;

/// A mock provider that returns a sequence of scripted responses.
///
/// Each call to `complete` returns the next response in the queue and
/// records the prompt it was given. Panics if more calls are made than
/// responses provided.
pub struct SequentialMockProvider {
    responses: Mutex<Vec<ProviderResponse>>,
    prompts: Mutex<Vec<String>>,
}

impl SequentialMockProvider {
    pub fn new(responses: Vec<ProviderResponse>) -> Self {
        Self {
            responses: Mutex::new(responses),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// One single-reply response per text.
    pub fn replies(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| make_text_response(t)).collect())
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// Every prompt received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut prompts = self.prompts.lock().unwrap();
        let responses = self.responses.lock().unwrap();

        if prompts.len() >= responses.len() {
            panic!(
                "SequentialMockProvider: no more responses (call #{}, have {})",
                prompts.len(),
                responses.len()
            );
        }

        let response = responses[prompts.len()].clone();
        prompts.push(request.prompt);
        Ok(response)
    }
}

/// A provider that always fails.
pub struct FailingProvider;

#[async_trait::async_trait]
impl Provider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        Err(ProviderError::Network("connection refused".into()))
    }
}

/// A response with a single reply.
pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        replies: vec![text.to_string()],
        model: "mock-model".into(),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
    }
}

/// A response with no replies at all.
pub fn make_empty_response() -> ProviderResponse {
    ProviderResponse {
        replies: Vec::new(),
        model: "mock-model".into(),
        usage: None,
    }
}
