//! Grounded answer synthesis.

use crate::rag::generator::Generator;
use crate::rag::types::Answer;
use crate::types::RetrievedChunk;
use docqa_core::AppResult;
use docqa_prompt::{build_prompt, grounded_qa};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Context used when retrieval found nothing.
pub const NO_CONTEXT: &str = "No relevant context was retrieved.";

/// Render retrieved chunks as labeled blocks the generator can cite.
///
/// Each block is `[Source: <source_id>]` followed by the chunk text; blocks
/// are separated by a blank line, in retrieval order.
pub fn build_context(chunks: &[RetrievedChunk]) -> String {
    if chunks.is_empty() {
        return NO_CONTEXT.to_string();
    }

    chunks
        .iter()
        .map(|r| format!("[Source: {}]\n{}", r.chunk.source_id, r.chunk.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub struct AnswerSynthesizer {
    generator: Arc<dyn Generator>,
}

impl AnswerSynthesizer {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }

    /// Produce an answer to `question` from `chunks`.
    ///
    /// Calls the generator exactly once and returns its text as-is.
    pub async fn synthesize(&self, question: &str, chunks: Vec<RetrievedChunk>) -> AppResult<Answer> {
        let mut vars = BTreeMap::new();
        vars.insert("context".to_string(), build_context(&chunks));
        vars.insert("question".to_string(), question.to_string());

        let prompt = build_prompt(&grounded_qa(), vars)?;
        let answer = self.generator.generate(&prompt.user).await?;

        tracing::debug!(sources = chunks.len(), answer_len = answer.len(), "Synthesized answer");
        Ok(Answer {
            answer,
            sources: chunks,
        })
    }
}
