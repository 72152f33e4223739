//! Text generation capability.

use docqa_core::AppResult;
use docqa_llm::{LlmClient, LlmRequest};
use std::sync::Arc;

/// Turns a fully rendered prompt into answer text.
#[async_trait::async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> AppResult<String>;
}

/// Generator backed by an LLM provider client.
pub struct LlmGenerator {
    client: Arc<dyn LlmClient>,
    model: String,
    temperature: f32,
}

impl LlmGenerator {
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            client,
            model: model.into(),
            temperature,
        }
    }
}

#[async_trait::async_trait]
impl Generator for LlmGenerator {
    async fn generate(&self, prompt: &str) -> AppResult<String> {
        let request =
            LlmRequest::new(prompt, self.model.as_str()).with_temperature(self.temperature);

        tracing::debug!(
            provider = self.client.provider_name(),
            model = %self.model,
            prompt_len = prompt.len(),
            "Generating answer"
        );

        let response = self.client.complete(&request).await?;
        Ok(response.content)
    }
}
