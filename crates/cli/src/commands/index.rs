//! `pipewright index` and `pipewright search`.
//!
//! The document store lives in memory, so every command indexes its
//! sources before querying them.

use std::sync::Arc;

use pipewright_agent::{DocumentSearch, DocumentSplitter, IndexReport, IndexingPipeline};
use pipewright_config::AppConfig;
use pipewright_core::document::{DocumentFilter, DocumentStore};
use pipewright_fetch::LinkFetcher;
use pipewright_providers::{InputType, build_embedder};
use pipewright_store::InMemoryDocumentStore;
use tracing::info;

use super::load_config;
use crate::SourceArgs;

/// Index `sources` into a fresh store and return a search over it.
pub(crate) async fn index_sources(
    config: &AppConfig,
    sources: &SourceArgs,
) -> Result<(DocumentSearch, Arc<InMemoryDocumentStore>, IndexReport), Box<dyn std::error::Error>> {
    if sources.files.is_empty() && sources.urls.is_empty() {
        return Err("Nothing to index: pass --file and/or --url".into());
    }

    let store = Arc::new(InMemoryDocumentStore::new());
    let pipeline = IndexingPipeline::new(
        build_embedder(config, InputType::SearchDocument)?,
        store.clone(),
    )
    .with_splitter(DocumentSplitter::from_config(&config.indexing)?)
    .with_policy(config.indexing.duplicate_policy);

    let mut report = IndexReport::default();
    if !sources.files.is_empty() {
        report = merge(report, pipeline.index_files(&sources.files).await?);
    }
    if !sources.urls.is_empty() {
        let links = LinkFetcher::new(&config.fetch);
        report = merge(report, pipeline.index_urls(&links, &sources.urls).await?);
    }

    info!(
        documents = report.documents,
        chunks = report.chunks,
        written = report.written,
        "Sources indexed"
    );

    let search = DocumentSearch::new(build_embedder(config, InputType::SearchQuery)?, store.clone());
    Ok((search, store, report))
}

fn merge(a: IndexReport, b: IndexReport) -> IndexReport {
    IndexReport {
        documents: a.documents + b.documents,
        chunks: a.chunks + b.chunks,
        written: a.written + b.written,
    }
}

pub async fn run(sources: &SourceArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let (_, store, report) = index_sources(&config, sources).await?;

    for (i, doc) in store.filter(&DocumentFilter::all()).await?.iter().enumerate() {
        println!("\n--------------\n");
        println!("DOCUMENT {i}");
        println!("{}", doc.content);
    }

    println!(
        "\nIndexed {} documents as {} chunks ({} written)",
        report.documents, report.chunks, report.written
    );
    Ok(())
}

pub async fn search(
    query: &str,
    sources: &SourceArgs,
    top_k: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let (search, _, _) = index_sources(&config, sources).await?;

    let top_k = top_k.unwrap_or(config.retrieval.search_top_k);
    for (i, doc) in search.run(query, top_k).await?.iter().enumerate() {
        println!("\n--------------\n");
        println!("DOCUMENT {i} (score {:.3})", doc.score.unwrap_or_default());
        println!("{}", doc.content);
    }
    Ok(())
}
