//! Retrieval-augmented answering

use std::sync::Arc;

use crate::error::Result;
use crate::generation::prompt::PromptBuilder;
use crate::providers::embedding::EmbeddingProvider;
use crate::providers::llm::LlmProvider;
use crate::providers::vector_store::{ScoredChunk, VectorStoreProvider};

/// An answer with the retrieved chunks that grounded it
#[derive(Debug, Clone)]
pub struct GroundedAnswer {
    pub answer: String,
    pub sources: Vec<ScoredChunk>,
}

/// Embeds a question, retrieves nearest chunks, and asks the generator
pub struct AnswerEngine {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStoreProvider>,
    llm: Arc<dyn LlmProvider>,
}

impl AnswerEngine {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStoreProvider>,
        llm: Arc<dyn LlmProvider>,
    ) -> Self {
        Self {
            embedder,
            store,
            llm,
        }
    }

    /// Answer a question from the `top_k` nearest stored chunks.
    ///
    /// Any remote failure propagates; there is no partial or cached answer.
    pub async fn answer(&self, question: &str, top_k: usize) -> Result<GroundedAnswer> {
        let started = std::time::Instant::now();

        let query_vector = self.embedder.embed_one(question).await?;
        let results = self.store.search(&query_vector, top_k).await?;
        tracing::debug!(
            hits = results.len(),
            top_k,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "retrieval complete"
        );

        let context = PromptBuilder::build_context(&results);
        let prompt = PromptBuilder::build_grounded_prompt(question, &context);
        let answer = self.llm.generate(&prompt).await?;

        tracing::info!(
            hits = results.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "answer generated"
        );
        Ok(GroundedAnswer {
            answer,
            sources: results,
        })
    }
}
