//! Article summaries: fetch → prompt → generate.

use std::sync::Arc;

use pipewright_core::error::Result;
use pipewright_core::provider::Provider;
use pipewright_fetch::ArticleSource;
use tracing::{info, warn};

use crate::generation::Generation;
use crate::prompt::{PromptState, SummaryStyle, compose};

pub struct NewsSummarizer {
    source: Arc<dyn ArticleSource>,
    provider: Arc<dyn Provider>,
    generation: Generation,
    style: SummaryStyle,
}

impl NewsSummarizer {
    pub fn new(
        source: Arc<dyn ArticleSource>,
        provider: Arc<dyn Provider>,
        generation: Generation,
    ) -> Self {
        Self {
            source,
            provider,
            generation,
            style: SummaryStyle::Brief,
        }
    }

    pub fn with_style(mut self, style: SummaryStyle) -> Self {
        self.style = style;
        self
    }

    /// Summarise the top `top_k` articles. Returns the first reply, or an
    /// empty string when the model returns none.
    pub async fn run(&self, top_k: usize) -> Result<String> {
        let articles = self.source.articles(top_k).await?;
        info!(articles = articles.len(), style = ?self.style, "Summarising");

        let prompt = compose(&PromptState::Summary {
            style: self.style,
            articles: &articles,
        });

        let response = self.provider.complete(self.generation.request(prompt)).await?;
        Ok(response.replies.into_iter().next().unwrap_or_else(|| {
            warn!("Generator returned no replies");
            String::new()
        }))
    }
}
