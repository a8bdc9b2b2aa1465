//! Document store implementations for Pipewright.

pub mod in_memory;
pub mod vector;

pub use in_memory::InMemoryDocumentStore;
pub use vector::{cosine_similarity, rank_by_similarity};
