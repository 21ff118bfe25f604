//! Vector store provider trait

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ChunkPayload, Point};

/// A retrieved point with its similarity score
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub score: f32,
    pub payload: ChunkPayload,
}

/// A named vector index reachable over the network
#[async_trait]
pub trait VectorStoreProvider: Send + Sync {
    /// Create the collection if absent; fail hard if it exists with a
    /// different dimensionality.
    async fn ensure_collection(&self, dimension: usize) -> Result<()>;

    /// Write one bounded batch of points. No retry; the caller iterates
    /// sub-batches.
    async fn upsert(&self, points: &[Point]) -> Result<()>;

    /// Nearest-neighbor search with payloads attached
    async fn search(&self, vector: &[f32], limit: usize) -> Result<Vec<ScoredChunk>>;
}
