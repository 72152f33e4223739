//! Session command handler.
//!
//! A line-oriented loop over one pipeline: `:load <path>` processes
//! documents, anything else is asked as a question.

use super::open_pipeline;
use clap::Args;
use docqa_core::{config::AppConfig, AppResult};
use docqa_knowledge::{discover_documents, Pipeline};
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "Commands: :load <path>  :stats  :help  :quit\nAnything else is asked as a question.";

/// Interactive session: load documents and ask questions
#[derive(Args, Debug)]
pub struct SessionCommand {
    /// Start from the documents already in the workspace index
    #[arg(long)]
    pub resume: bool,
}

/// One line of session input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionInput {
    Load(PathBuf),
    Stats,
    Help,
    Quit,
    Question(String),
    Empty,
}

pub fn parse_line(line: &str) -> SessionInput {
    let line = line.trim();
    if line.is_empty() {
        return SessionInput::Empty;
    }

    match line.split_once(char::is_whitespace) {
        Some((":load", rest)) if !rest.trim().is_empty() => {
            SessionInput::Load(PathBuf::from(rest.trim()))
        }
        _ => match line {
            ":stats" => SessionInput::Stats,
            ":help" | ":load" => SessionInput::Help,
            ":quit" | ":q" | "quit" | "exit" => SessionInput::Quit,
            _ => SessionInput::Question(line.to_string()),
        },
    }
}

impl SessionCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Starting session");
        tracing::debug!("Session options: {:?}", self);

        let pipeline = open_pipeline(config, self.resume).await?;
        println!("{}", HELP);

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("> ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };

            match parse_line(&line) {
                SessionInput::Empty => continue,
                SessionInput::Quit => break,
                SessionInput::Help => println!("{}", HELP),
                SessionInput::Stats => {
                    let stats = pipeline.stats().await?;
                    println!(
                        "{} documents processed, {} chunks indexed ({})",
                        stats.document_count, stats.indexed_chunks, stats.backend
                    );
                }
                SessionInput::Load(path) => load(&pipeline, &path).await,
                SessionInput::Question(question) => {
                    println!("{}", pipeline.ask_question(&question).await);
                }
            }
        }

        tracing::info!("Session ended");
        Ok(())
    }
}

async fn load(pipeline: &Pipeline, path: &std::path::Path) {
    let documents = match discover_documents(&[path.to_path_buf()]) {
        Ok(documents) => documents,
        Err(e) => {
            println!("Error processing file: {}", e);
            return;
        }
    };

    if documents.is_empty() {
        println!("No supported documents found.");
    }
    for document in documents {
        println!("{}", pipeline.process_file(&document).await);
    }
}
