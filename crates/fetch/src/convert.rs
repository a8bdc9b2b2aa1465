//! Converters from raw content to documents.

use std::path::{Path, PathBuf};

use pipewright_core::document::{Document, Meta};
use pipewright_core::error::FetchError;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::{debug, warn};

use crate::link::ByteStream;

/// Elements whose text is never visible.
const SKIPPED_ELEMENTS: &[&str] = &["head", "script", "style", "noscript", "template"];

/// Extract the visible text of an HTML page, whitespace collapsed.
pub fn html_to_text(source: &str) -> String {
    let html = Html::parse_document(source);
    let mut pieces = Vec::new();
    collect_text(html.root_element(), &mut pieces);
    pieces.join(" ")
}

fn collect_text(element: ElementRef<'_>, pieces: &mut Vec<String>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
                if !collapsed.is_empty() {
                    pieces.push(collapsed);
                }
            }
            Node::Element(el) if SKIPPED_ELEMENTS.contains(&el.name()) => {}
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, pieces);
                }
            }
            _ => {}
        }
    }
}

fn page_title(source: &str) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    let html = Html::parse_document(source);
    let title = html
        .select(&selector)
        .next()?
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    (!title.is_empty()).then_some(title)
}

/// Turns fetched HTML into documents carrying `url` and `content_type` meta.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlConverter;

impl HtmlConverter {
    pub fn convert(&self, sources: Vec<ByteStream>) -> Vec<Document> {
        sources
            .into_iter()
            .filter_map(|stream| self.convert_one(&stream))
            .collect()
    }

    /// Convert one stream; `None` when the page has no visible text.
    pub fn convert_one(&self, stream: &ByteStream) -> Option<Document> {
        let source = stream.text();
        let content = html_to_text(&source);
        if content.is_empty() {
            warn!(url = %stream.url, "No text extracted, skipping");
            return None;
        }

        let mut meta = Meta::new();
        meta.insert("url".into(), stream.url.clone().into());
        if let Some(content_type) = &stream.content_type {
            meta.insert("content_type".into(), content_type.clone().into());
        }
        if let Some(title) = page_title(&source) {
            meta.insert("title".into(), title.into());
        }

        debug!(url = %stream.url, chars = content.len(), "Converted HTML");
        Some(Document::with_meta(content, meta))
    }
}

/// Reads UTF-8 text files into documents carrying `file_path` meta.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextFileConverter;

impl TextFileConverter {
    pub async fn convert(&self, paths: &[PathBuf]) -> Vec<Document> {
        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            match self.convert_one(path).await {
                Ok(document) => documents.push(document),
                Err(e) => warn!(error = %e, "Could not read file, skipping"),
            }
        }
        documents
    }

    pub async fn convert_one(&self, path: &Path) -> Result<Document, FetchError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| FetchError::Read {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        let mut meta = Meta::new();
        meta.insert("file_path".into(), path.display().to_string().into());
        Ok(Document::with_meta(content, meta))
    }
}
