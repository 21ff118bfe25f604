//! Generation provider trait

use async_trait::async_trait;

use crate::error::Result;

/// Produces a text completion for a prompt
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a complete (non-streaming) response
    async fn generate(&self, prompt: &str) -> Result<String>;
}
