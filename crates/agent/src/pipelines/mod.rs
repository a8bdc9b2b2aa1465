//! Retrieval and summarisation pipelines.
//!
//! - **Indexing**: convert → split → embed → write
//! - **Search**: embed query → retrieve by embedding
//! - **RAG**: search → prompt → generate
//! - **Summaries**: fetch articles → prompt → generate
//!
//! Every step is awaited in turn; nothing runs concurrently.

pub mod indexing;
pub mod rag;
pub mod splitter;
pub mod summarizer;

pub use indexing::{IndexReport, IndexingPipeline};
pub use rag::{DocumentSearch, RagAnswer, RagPipeline};
pub use splitter::DocumentSplitter;
pub use summarizer::NewsSummarizer;
