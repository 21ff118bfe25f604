//! Provider traits and remote-service clients

pub mod embedding;
pub mod graph;
pub mod llm;
pub mod ollama;
pub mod qdrant;
pub mod vector_store;

pub use embedding::EmbeddingProvider;
pub use graph::{DriveItem, GraphClient};
pub use llm::LlmProvider;
pub use ollama::{OllamaClient, OllamaEmbedder, OllamaLlm};
pub use qdrant::QdrantStore;
pub use vector_store::{ScoredChunk, VectorStoreProvider};
