//! Text-generation and embedding backends for Pipewright.
//!
//! Generators implement `pipewright_core::Provider`, embedders implement
//! `pipewright_core::Embedder`. The router builds both from configuration.

pub mod cohere;
pub mod hashing;
pub mod openai_compat;
pub mod router;

pub use cohere::{CohereEmbedder, InputType};
pub use hashing::HashingEmbedder;
pub use openai_compat::OpenAiCompatProvider;
pub use router::{build_embedder, build_provider};
