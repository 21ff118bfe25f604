//! Grounding prompt template

use crate::providers::vector_store::ScoredChunk;

/// Prompt builder for retrieval-grounded answers
pub struct PromptBuilder;

impl PromptBuilder {
    /// Concatenate retrieved chunk texts with blank-line separators.
    ///
    /// No deduplication and no truncation; the generation call carries a
    /// fixed context budget instead.
    pub fn build_context(results: &[ScoredChunk]) -> String {
        results
            .iter()
            .map(|r| r.payload.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Build the grounding prompt embedding context and question
    pub fn build_grounded_prompt(question: &str, context: &str) -> String {
        format!(
            r#"You are a helpful assistant. Use the context to answer concisely. If the answer is not in the context, say you don't know.

Context:
{context}

Question: {question}
Answer:"#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChunkPayload;

    fn scored(text: &str) -> ScoredChunk {
        ScoredChunk {
            score: 0.9,
            payload: ChunkPayload {
                text: text.to_string(),
                project: "default".to_string(),
                file: "a.txt".to_string(),
            },
        }
    }

    #[test]
    fn context_joins_chunks_with_blank_lines() {
        let context = PromptBuilder::build_context(&[scored("first"), scored("second")]);
        assert_eq!(context, "first\n\nsecond");
    }

    #[test]
    fn prompt_embeds_context_and_question_verbatim() {
        let prompt =
            PromptBuilder::build_grounded_prompt("What is the limit?", "The limit is 42.");
        assert!(prompt.contains("Context:\nThe limit is 42."));
        assert!(prompt.contains("Question: What is the limit?"));
        assert!(prompt.ends_with("Answer:"));
        assert!(prompt.contains("say you don't know"));
    }
}
