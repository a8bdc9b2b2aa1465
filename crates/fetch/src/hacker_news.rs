//! Hacker News top stories as documents.

use async_trait::async_trait;
use pipewright_core::document::{Document, Meta};
use pipewright_core::error::FetchError;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::convert::HtmlConverter;
use crate::link::LinkFetcher;

/// A source of articles to summarise.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Up to `top_k` articles. Individual failures are skipped.
    async fn articles(&self, top_k: usize) -> Result<Vec<Document>, FetchError>;
}

#[derive(Debug, Deserialize)]
struct Item {
    id: u64,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

/// Reads the Hacker News Firebase API.
///
/// Stories with a `url` are fetched and converted from HTML; text posts
/// (Ask HN and similar) use their `text` directly.
pub struct HackerNewsFetcher {
    base_url: String,
    links: LinkFetcher,
    converter: HtmlConverter,
}

impl HackerNewsFetcher {
    pub fn new(base_url: impl Into<String>, links: LinkFetcher) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            links,
            converter: HtmlConverter,
        }
    }

    async fn article(&self, id: u64) -> Result<Option<Document>, FetchError> {
        let item_url = format!("{}/item/{id}.json", self.base_url);
        let item: Item = self.links.get_json(&item_url).await?;

        if let Some(url) = &item.url {
            let stream = self.links.fetch(url).await?;
            let Some(mut doc) = self.converter.convert_one(&stream) else {
                return Ok(None);
            };
            if let Some(title) = item.title {
                doc = doc.insert_meta("title", title);
            }
            return Ok(Some(doc));
        }

        if let Some(text) = item.text {
            let mut meta = Meta::new();
            if let Some(title) = item.title {
                meta.insert("title".into(), title.into());
            }
            return Ok(Some(Document::with_meta(text, meta)));
        }

        debug!(id = item.id, "Item has neither url nor text");
        Ok(None)
    }
}

#[async_trait]
impl ArticleSource for HackerNewsFetcher {
    async fn articles(&self, top_k: usize) -> Result<Vec<Document>, FetchError> {
        let ids: Vec<u64> = self
            .links
            .get_json(&format!("{}/topstories.json", self.base_url))
            .await?;

        let mut articles = Vec::new();
        for id in ids.into_iter().take(top_k) {
            match self.article(id).await {
                Ok(Some(doc)) => articles.push(doc),
                Ok(None) => {}
                Err(e) => warn!(id, error = %e, "Can't download item {id}, skipped"),
            }
        }

        debug!(count = articles.len(), top_k, "Collected articles");
        Ok(articles)
    }
}
