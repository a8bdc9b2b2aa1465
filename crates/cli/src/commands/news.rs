//! `pipewright news`: summarise the top Hacker News stories.

use std::sync::Arc;

use pipewright_agent::{Generation, NewsSummarizer, SummaryStyle};
use pipewright_fetch::{HackerNewsFetcher, LinkFetcher};

use super::load_config;

pub async fn run(top_k: usize, with_urls: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let provider = pipewright_providers::build_provider(&config)?;

    let source = HackerNewsFetcher::new(
        &config.fetch.hacker_news_url,
        LinkFetcher::new(&config.fetch),
    );
    let style = if with_urls {
        SummaryStyle::WithUrls
    } else {
        SummaryStyle::Brief
    };

    let summary = NewsSummarizer::new(Arc::new(source), provider, Generation::from_config(&config))
        .with_style(style)
        .run(top_k)
        .await?;

    println!("{summary}");
    Ok(())
}
