//! Embedding provider trait

use async_trait::async_trait;

use crate::error::Result;

/// Produces fixed-dimension vectors from text
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>>;

    /// Vector dimensionality this provider produces
    fn dimension(&self) -> usize;

    /// Embed many texts, preserving order and length.
    ///
    /// Blank inputs map to an all-zero vector instead of being dropped, so
    /// the output stays 1:1 with the input. One remote call per non-blank
    /// text.
    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            if text.trim().is_empty() {
                vectors.push(vec![0.0; self.dimension()]);
            } else {
                vectors.push(self.embed_one(text).await?);
            }
        }
        Ok(vectors)
    }
}
