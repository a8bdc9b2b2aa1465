//! `pipewright rag`: answer a question from indexed sources.

use pipewright_agent::{Generation, RagPipeline, RagTemplate};

use super::index::index_sources;
use super::load_config;
use crate::SourceArgs;

pub async fn run(
    question: &str,
    sources: &SourceArgs,
    top_k: Option<usize>,
    language: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let provider = pipewright_providers::build_provider(&config)?;
    let (search, _, _) = index_sources(&config, sources).await?;

    let template = match language {
        Some(language) => RagTemplate::Cited { language },
        None => RagTemplate::Basic,
    };

    let answer = RagPipeline::new(search, provider, Generation::from_config(&config))
        .with_template(template)
        .with_top_k(top_k.unwrap_or(config.retrieval.rag_top_k))
        .run(question)
        .await?;

    println!("{}", answer.answer);
    Ok(())
}
