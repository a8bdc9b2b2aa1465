//! Word-window document splitting.

use pipewright_config::IndexingConfig;
use pipewright_core::document::Document;
use pipewright_core::error::Error;

/// Splits documents into chunks of `split_length` words, consecutive chunks
/// sharing `split_overlap` words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentSplitter {
    split_length: usize,
    split_overlap: usize,
}

impl Default for DocumentSplitter {
    fn default() -> Self {
        Self {
            split_length: 200,
            split_overlap: 0,
        }
    }
}

impl DocumentSplitter {
    pub fn new(split_length: usize, split_overlap: usize) -> Result<Self, Error> {
        if split_length == 0 {
            return Err(Error::Config {
                message: "split_length must be > 0".into(),
            });
        }
        if split_overlap >= split_length {
            return Err(Error::Config {
                message: format!(
                    "split_overlap ({split_overlap}) must be smaller than split_length ({split_length})"
                ),
            });
        }
        Ok(Self {
            split_length,
            split_overlap,
        })
    }

    pub fn from_config(config: &IndexingConfig) -> Result<Self, Error> {
        Self::new(config.split_length, config.split_overlap)
    }

    /// Split every document. Chunks keep the parent's meta and add
    /// `source_id` (the parent id) and `split_id` (the chunk index).
    pub fn split(&self, documents: Vec<Document>) -> Vec<Document> {
        documents
            .into_iter()
            .flat_map(|doc| self.split_one(&doc))
            .collect()
    }

    fn split_one(&self, document: &Document) -> Vec<Document> {
        self.windows(&document.content)
            .into_iter()
            .enumerate()
            .map(|(split_id, chunk)| {
                let mut meta = document.meta.clone();
                meta.insert("source_id".into(), document.id.clone().into());
                meta.insert("split_id".into(), split_id.into());
                Document::with_meta(chunk, meta)
            })
            .collect()
    }

    fn windows(&self, text: &str) -> Vec<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        let step = self.split_length - self.split_overlap;
        let mut chunks = Vec::new();

        let mut start = 0;
        while start < words.len() {
            let end = (start + self.split_length).min(words.len());
            chunks.push(words[start..end].join(" "));
            if end == words.len() {
                break;
            }
            start += step;
        }

        chunks
    }
}
