//! # Pipewright Core
//!
//! Domain types, traits, and error definitions shared by every Pipewright
//! pipeline. This crate has no HTTP or runtime dependencies; it defines the
//! model the other crates implement against.
//!
//! ## Layout
//!
//! - [`message`]: role-tagged messages and the append-only [`MessageLog`]
//! - [`provider`]: the text-generation and embedding collaborator traits
//! - [`function`]: callable functions and the immutable [`FunctionTable`]
//! - [`document`]: documents and the [`DocumentStore`] trait

pub mod document;
pub mod error;
pub mod function;
pub mod message;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use document::{Document, DocumentFilter, DocumentStore, DuplicatePolicy};
pub use error::{Error, Result};
pub use function::{Function, FunctionTable, FunctionTableBuilder};
pub use message::{Message, MessageLog, Role};
pub use provider::{Embedder, Provider, ProviderRequest, ProviderResponse};
