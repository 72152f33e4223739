//! Ingest command handler.
//!
//! Extracts, chunks and embeds documents into the workspace index.

use super::{open_pipeline, print_json};
use clap::Args;
use docqa_core::{config::AppConfig, AppResult};
use docqa_knowledge::{discover_documents, ingest_status};
use std::path::PathBuf;

/// Process documents into the index
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// Files or directories to process (directories are walked for .txt, .pdf and .docx)
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestCommand {
    /// Execute the ingest command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ingest command");
        tracing::debug!("Ingest options: {:?}", self);

        let documents = discover_documents(&self.paths)?;
        if documents.is_empty() {
            tracing::warn!("No supported documents found");
            if self.json {
                return print_json(&serde_json::json!([]));
            }
            println!("No supported documents found.");
            return Ok(());
        }

        let pipeline = open_pipeline(config, true).await?;
        let mut results = Vec::with_capacity(documents.len());

        for path in &documents {
            tracing::info!("Processing {:?}", path);
            let result = pipeline.ingest_file(path).await;
            let status = ingest_status(&result);
            let chunks = result.as_ref().map(|r| r.chunk_count).unwrap_or(0);

            if let Err(e) = &result {
                tracing::warn!("Failed to process {:?}: {}", path, e);
            }

            if self.json {
                results.push(serde_json::json!({
                    "path": path.display().to_string(),
                    "status": status,
                    "chunks": chunks,
                }));
            } else {
                println!("{}", status);
            }
        }

        if self.json {
            return print_json(&serde_json::Value::Array(results));
        }

        let stats = pipeline.stats().await?;
        tracing::info!(
            "Index now holds {} chunks from {} sources",
            stats.indexed_chunks,
            stats.indexed_sources
        );

        Ok(())
    }
}
