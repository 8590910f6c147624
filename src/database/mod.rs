// file: src/database/mod.rs
// description: vector store and embedding operations module exports
// reference: internal module structure

pub mod client;
pub mod embeddings;
pub mod insert;
pub mod memory;
pub mod schema;
pub mod store;

pub use client::AstraDbClient;
pub use embeddings::{EmbeddingProvider, OpenAiEmbeddingClient};
pub use insert::{BatchInserter, InsertStats};
pub use memory::{HashingEmbedder, InMemoryVectorStore};
pub use schema::CollectionManager;
pub use store::{InsertOutcome, VectorStore, similarity_score};
