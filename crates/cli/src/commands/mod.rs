//! Command handlers for the docqa CLI.

pub mod ask;
pub mod ingest;
pub mod session;
pub mod stats;

pub use ask::AskCommand;
pub use ingest::IngestCommand;
pub use session::SessionCommand;
pub use stats::StatsCommand;

use docqa_core::{config::AppConfig, AppResult};
use docqa_knowledge::{
    config as knowledge_config, create_embedder, LlmGenerator, Pipeline, PipelineOptions,
};
use docqa_llm::create_client;
use std::sync::Arc;

/// Build the pipeline over the workspace index from configuration.
///
/// The embedding endpoint defaults to the LLM endpoint when both talk to
/// Ollama.
pub(crate) async fn open_pipeline(config: &AppConfig, resume: bool) -> AppResult<Pipeline> {
    let data_dir = config.ensure_data_dir()?;
    let mut knowledge = knowledge_config::load_config(&data_dir)?;

    if !knowledge_config::get_config_path(&data_dir).exists() {
        knowledge_config::save_config(&data_dir, &knowledge)?;
        tracing::debug!("Wrote default knowledge config to {:?}", data_dir);
    }

    if knowledge.embedding.provider == "ollama" && knowledge.embedding.endpoint.is_none() {
        knowledge.embedding.endpoint = Some(config.endpoint.clone());
    }

    let embedder = create_embedder(&knowledge.embedding)?;
    let client = create_client(&config.provider, Some(&config.endpoint))?;
    let generator = Arc::new(LlmGenerator::new(
        client,
        config.model.clone(),
        config.temperature,
    ));

    tracing::debug!(
        backend = %knowledge.backend,
        embedder = embedder.provider_name(),
        top_k = knowledge.top_k,
        "Opening pipeline"
    );

    Pipeline::open(
        &data_dir,
        &knowledge,
        embedder,
        generator,
        PipelineOptions { resume },
    )
    .await
}

pub(crate) fn print_json(value: &serde_json::Value) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
