//! Ask command handler.
//!
//! Answers one question from the documents already in the workspace index.

use super::open_pipeline;
use clap::Args;
use docqa_core::{config::AppConfig, AppResult};
use docqa_knowledge::Answer;

/// Ask a question about the processed documents
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Number of chunks to retrieve (default: knowledge config top_k)
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// List the sources the answer was grounded on
    #[arg(short, long)]
    pub sources: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    ///
    /// A question that cannot be answered, because of the input or a failing
    /// embedding or generation service, is reported on stdout and is not a
    /// command failure.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let pipeline = open_pipeline(config, true).await?;

        let result = match self.top_k {
            Some(k) => pipeline.ask_with_top_k(&self.question, k).await,
            None => pipeline.ask(&self.question).await,
        };

        println!("{}", self.render(result)?);
        Ok(())
    }

    /// Text printed for the outcome of a question.
    fn render(&self, result: AppResult<Answer>) -> AppResult<String> {
        let answer = match result {
            Ok(answer) => answer,
            Err(e) => {
                let message = if e.is_input() {
                    e.to_string()
                } else {
                    tracing::warn!("Failed to answer question: {}", e);
                    format!("Error answering question: {}", e)
                };

                if self.json {
                    return Ok(serde_json::to_string_pretty(
                        &serde_json::json!({ "error": message }),
                    )?);
                }
                return Ok(message);
            }
        };

        tracing::debug!("Answer grounded on {} chunks", answer.sources.len());

        if self.json {
            let output = serde_json::json!({
                "answer": answer.answer,
                "sources": answer.source_refs(),
            });
            return Ok(serde_json::to_string_pretty(&output)?);
        }

        let mut out = answer.answer.clone();
        if self.sources && !answer.sources.is_empty() {
            out.push_str("\n\nSources:");
            for source in answer.source_refs() {
                out.push_str(&format!(
                    "\n- {} ({}, score {:.3})",
                    source.source, source.location, source.score
                ));
                tracing::debug!("  {}", source.snippet);
            }
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::IngestCommand;
    use docqa_core::AppError;
    use tempfile::TempDir;

    fn ask(question: &str, json: bool) -> AskCommand {
        AskCommand {
            question: question.to_string(),
            top_k: None,
            sources: false,
            json,
        }
    }

    #[test]
    fn test_render_capability_error() {
        let err = || Err(AppError::Llm("connection refused".to_string()));

        assert_eq!(
            ask("q", false).render(err()).unwrap(),
            "Error answering question: LLM error: connection refused"
        );

        let json: serde_json::Value =
            serde_json::from_str(&ask("q", true).render(err()).unwrap()).unwrap();
        assert_eq!(
            json["error"],
            "Error answering question: LLM error: connection refused"
        );
    }

    #[test]
    fn test_render_input_error_unprefixed() {
        let rendered = ask("  ", false)
            .render(Err(AppError::Input("Please enter a question.".to_string())))
            .unwrap();
        assert_eq!(rendered, "Please enter a question.");
    }

    #[tokio::test]
    async fn test_unreachable_model_is_not_fatal() {
        let temp = TempDir::new().unwrap();
        let doc = temp.path().join("doc1.txt");
        std::fs::write(&doc, "Rust was first released in 2015.").unwrap();

        let config = AppConfig {
            workspace: temp.path().to_path_buf(),
            endpoint: "http://127.0.0.1:9".to_string(),
            ..AppConfig::default()
        };

        IngestCommand {
            paths: vec![doc],
            json: false,
        }
        .execute(&config)
        .await
        .unwrap();

        assert!(ask("When was Rust released?", false)
            .execute(&config)
            .await
            .is_ok());
        assert!(ask("When was Rust released?", true)
            .execute(&config)
            .await
            .is_ok());
    }
}
