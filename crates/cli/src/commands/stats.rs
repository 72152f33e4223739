//! Stats command handler.
//!
//! Shows what the workspace index holds.

use super::{open_pipeline, print_json};
use clap::Args;
use docqa_core::{config::AppConfig, AppResult};

/// Show index statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");
        tracing::debug!("Stats options: {:?}", self);

        let pipeline = open_pipeline(config, true).await?;
        let stats = pipeline.stats().await?;

        if self.json {
            return print_json(&serde_json::to_value(&stats)?);
        }

        println!("Backend:   {}", stats.backend);
        println!("Documents: {}", stats.indexed_sources);
        println!("Chunks:    {}", stats.indexed_chunks);

        Ok(())
    }
}
