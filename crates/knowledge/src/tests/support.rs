//! Deterministic test doubles for the embedding and generation capabilities.

use crate::config::KnowledgeConfig;
use crate::embeddings::{Embedder, TrigramEmbedder};
use crate::pipeline::Pipeline;
use crate::rag::Generator;
use crate::store::VectorStore;
use docqa_core::{AppError, AppResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const DONT_KNOW: &str = "I don't know the answer based on the provided context.";

/// Trigram embedder that counts how often it is called.
#[derive(Debug)]
pub struct CountingEmbedder {
    inner: TrigramEmbedder,
    pub calls: AtomicUsize,
}

impl CountingEmbedder {
    pub fn new() -> Self {
        Self {
            inner: TrigramEmbedder::new(256),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Embedder for CountingEmbedder {
    fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.embed_batch(texts).await
    }
}

/// Embedder whose provider is always down.
#[derive(Debug)]
pub struct FailingEmbedder;

#[async_trait::async_trait]
impl Embedder for FailingEmbedder {
    fn provider_name(&self) -> &str {
        "failing"
    }

    fn model_name(&self) -> &str {
        "none"
    }

    fn dimensions(&self) -> usize {
        8
    }

    async fn embed_batch(&self, _texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Err(AppError::Embedding("provider unavailable".to_string()))
    }
}

/// Answers from the context the way a well-behaved model would.
///
/// For each known fact, if a context block contains its evidence the answer
/// is returned with that block's citation; otherwise it says it does not
/// know.
pub struct ScriptedGenerator {
    facts: Vec<(String, String)>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(facts: &[(&str, &str)]) -> Self {
        Self {
            facts: facts
                .iter()
                .map(|(evidence, answer)| (evidence.to_string(), answer.to_string()))
                .collect(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

fn context_blocks(prompt: &str) -> Vec<(String, String)> {
    let Some(start) = prompt.find("Context: ") else {
        return Vec::new();
    };
    let end = prompt.rfind("\n\nQuestion: ").unwrap_or(prompt.len());
    let context = &prompt[start + "Context: ".len()..end];

    context
        .split("[Source: ")
        .filter_map(|block| {
            let (source, text) = block.split_once("]\n")?;
            Some((source.to_string(), text.to_string()))
        })
        .collect()
}

#[async_trait::async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> AppResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        let question = prompt
            .rsplit_once("Question: ")
            .map(|(_, q)| q.trim_end_matches("Answer:").trim().to_lowercase())
            .unwrap_or_default();

        for (source, text) in context_blocks(prompt) {
            for (evidence, answer) in &self.facts {
                let topic_asked = evidence
                    .split_whitespace()
                    .filter(|w| w.len() > 3)
                    .any(|w| question.contains(&w.to_lowercase()));
                if topic_asked && text.contains(evidence.as_str()) {
                    return Ok(format!("{} [Source: {}]", answer, source));
                }
            }
        }

        Ok(DONT_KNOW.to_string())
    }
}

pub fn freedonia_generator() -> Arc<ScriptedGenerator> {
    Arc::new(ScriptedGenerator::new(&[(
        "Freedonia is Sylvania City",
        "The capital of Freedonia is Sylvania City.",
    )]))
}

pub fn memory_pipeline(
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
    config: &KnowledgeConfig,
) -> Pipeline {
    Pipeline::new(VectorStore::in_memory(embedder), generator, config).unwrap()
}
