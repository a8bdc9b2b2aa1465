//! Agent workflows built on the Pipewright collaborators.
//!
//! Two loops form the core:
//!
//! 1. **Reflection**: [`ReflectingExtractor`] composes an extraction
//!    prompt, generates, and hands the reply to the [`ReflectionValidator`].
//!    Replies without the terminator are fed back as a revision prompt until
//!    one is accepted or `max_loops` is reached.
//! 2. **Function dispatch**: [`ChatAgent`] renders the [`MessageLog`] as a
//!    transcript, generates, and routes JSON function calls through the
//!    [`FunctionDispatcher`], appending the results as function messages.
//!
//! The retrieval pipelines (indexing, search, RAG, news summaries) live in
//! [`pipelines`].
//!
//! [`MessageLog`]: pipewright_core::MessageLog

pub mod chat;
pub mod dispatcher;
pub mod extraction;
pub mod generation;
pub mod pipelines;
pub mod prompt;
pub mod reflection;

pub use chat::{ChatAgent, ChatTurn};
pub use dispatcher::{DispatchError, FunctionCallRequest, FunctionDispatcher};
pub use extraction::{EntityError, EntitySet, ExtractionOutcome, ExtractionStatus, ReflectingExtractor};
pub use generation::Generation;
pub use pipelines::{
    DocumentSearch, DocumentSplitter, IndexReport, IndexingPipeline, NewsSummarizer, RagAnswer,
    RagPipeline,
};
pub use prompt::{PromptState, RagTemplate, SummaryStyle, compose};
pub use reflection::{ReflectionValidator, TerminatorMatch, Verdict};

#[cfg(test)]
pub(crate) mod test_helpers;
