//! Generation settings shared by every pipeline that calls a provider.

use pipewright_config::AppConfig;
use pipewright_core::provider::ProviderRequest;

/// Model, temperature and token limit for one pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl Generation {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
        }
    }

    /// The top-level defaults from configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            model: config.default_model.clone(),
            temperature: config.default_temperature,
            max_tokens: Some(config.default_max_tokens),
        }
    }

    /// The chat section's model with the top-level sampling defaults.
    pub fn for_chat(config: &AppConfig) -> Self {
        Self {
            model: config.chat.model.clone(),
            ..Self::from_config(config)
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn request(&self, prompt: impl Into<String>) -> ProviderRequest {
        ProviderRequest::new(&self.model, prompt)
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_uses_its_own_model() {
        let config = AppConfig::default();
        let chat = Generation::for_chat(&config);
        assert_eq!(chat.model, config.chat.model);
        assert_eq!(chat.max_tokens, Some(config.default_max_tokens));
    }

    #[test]
    fn request_carries_settings() {
        let request = Generation::new("gpt-4o-mini")
            .with_temperature(0.0)
            .request("hello");
        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(request.prompt, "hello");
        assert_eq!(request.temperature, 0.0);
        assert_eq!(request.max_tokens, None);
    }
}
