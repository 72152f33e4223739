//! Pipeline orchestrator.
//!
//! Owns the chunker, the vector store and the answer synthesizer, and
//! tracks which documents have been processed. A pipeline starts `Empty`
//! and becomes `Ready` after the first successful ingest; it never goes
//! back.

use crate::chunk::ChunkPipeline;
use crate::config::KnowledgeConfig;
use crate::embeddings::Embedder;
use crate::extract::extract_file;
use crate::rag::{Answer, AnswerSynthesizer, Generator};
use crate::store::VectorStore;
use crate::types::{DocType, IngestReport, PipelineStats, PipelineStatus};
use docqa_core::{AppError, AppResult};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

pub const NOT_READY_MESSAGE: &str =
    "Please upload and process a document before asking questions.";
pub const BLANK_QUESTION_MESSAGE: &str = "Please enter a question.";

#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Treat documents already in a persistent index as processed.
    pub resume: bool,
}

#[derive(Debug, Default)]
struct PipelineState {
    sources: HashSet<String>,
}

pub struct Pipeline {
    chunker: ChunkPipeline,
    store: VectorStore,
    synthesizer: AnswerSynthesizer,
    top_k: usize,
    state: Mutex<PipelineState>,
}

impl Pipeline {
    pub fn new(
        store: VectorStore,
        generator: Arc<dyn Generator>,
        config: &KnowledgeConfig,
    ) -> AppResult<Self> {
        config.validate()?;

        Ok(Self {
            chunker: ChunkPipeline::new(config.chunk_config())?,
            store,
            synthesizer: AnswerSynthesizer::new(generator),
            top_k: config.top_k,
            state: Mutex::new(PipelineState::default()),
        })
    }

    /// Open the configured index under `data_dir` and build a pipeline on it.
    pub async fn open(
        data_dir: &Path,
        config: &KnowledgeConfig,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
        options: PipelineOptions,
    ) -> AppResult<Self> {
        let store = VectorStore::open(data_dir, config, embedder).await?;
        let pipeline = Self::new(store, generator, config)?;

        if options.resume {
            let existing = pipeline.store.source_ids().await?;
            debug!("Resuming with {} indexed documents", existing.len());
            pipeline.state.lock().await.sources.extend(existing);
        }

        Ok(pipeline)
    }

    pub async fn status(&self) -> PipelineStatus {
        if self.state.lock().await.sources.is_empty() {
            PipelineStatus::Empty
        } else {
            PipelineStatus::Ready
        }
    }

    /// Distinct documents processed by this pipeline.
    pub async fn document_count(&self) -> usize {
        self.state.lock().await.sources.len()
    }

    /// Chunk, embed and index one document.
    ///
    /// All-or-nothing: on error neither the index nor the document count
    /// changes.
    #[instrument(skip(self, raw_text), fields(doc_type = %doc_type, chars = raw_text.len()))]
    pub async fn ingest(
        &self,
        source_id: &str,
        doc_type: DocType,
        raw_text: &str,
    ) -> AppResult<IngestReport> {
        if source_id.trim().is_empty() {
            return Err(AppError::Input(
                "Document name must not be empty".to_string(),
            ));
        }

        let chunks = self.chunker.process(source_id, doc_type, raw_text);
        if chunks.is_empty() {
            return Err(AppError::Input(format!(
                "'{}' contains no extractable text",
                source_id
            )));
        }

        let chunk_count = self.store.embed_and_store(chunks).await?;
        self.state
            .lock()
            .await
            .sources
            .insert(source_id.to_string());

        info!("Processed {} chunks from '{}'", chunk_count, source_id);
        Ok(IngestReport {
            source_id: source_id.to_string(),
            doc_type,
            chunk_count,
        })
    }

    /// Answer a question from the indexed documents.
    #[instrument(skip(self))]
    pub async fn ask(&self, question: &str) -> AppResult<Answer> {
        self.ask_with_top_k(question, self.top_k).await
    }

    /// Like `ask`, retrieving `top_k` chunks instead of the configured count.
    ///
    /// Refused before any document is processed and for blank questions;
    /// neither the embedder nor the generator is called then.
    pub async fn ask_with_top_k(&self, question: &str, top_k: usize) -> AppResult<Answer> {
        if self.status().await == PipelineStatus::Empty {
            return Err(AppError::Input(NOT_READY_MESSAGE.to_string()));
        }
        if question.trim().is_empty() {
            return Err(AppError::Input(BLANK_QUESTION_MESSAGE.to_string()));
        }

        let retrieved = self.store.similarity_search(question, top_k).await?;
        debug!(
            retrieved = retrieved.len(),
            top_score = retrieved.first().map(|r| r.score),
            "Retrieved context"
        );

        self.synthesizer.synthesize(question, retrieved).await
    }

    /// Extract a file from disk and ingest it.
    pub async fn ingest_file(&self, path: &Path) -> AppResult<IngestReport> {
        let owned: PathBuf = path.to_path_buf();
        let document = tokio::task::spawn_blocking(move || extract_file(&owned))
            .await
            .map_err(|e| AppError::Other(format!("Extraction task failed: {}", e)))??;

        self.ingest(&document.source_id, document.doc_type, &document.raw_text)
            .await
    }

    /// Ingest already-extracted text and describe the outcome.
    pub async fn process_document(&self, source_id: &str, doc_type: &str, raw_text: &str) -> String {
        let result = match DocType::parse(doc_type) {
            Ok(doc_type) => self.ingest(source_id, doc_type, raw_text).await,
            Err(e) => Err(e),
        };
        ingest_status(&result)
    }

    /// Extract a file from disk, ingest it, and describe the outcome.
    pub async fn process_file(&self, path: &Path) -> String {
        ingest_status(&self.ingest_file(path).await)
    }

    /// Answer a question, or explain why it could not be answered.
    pub async fn ask_question(&self, question: &str) -> String {
        match self.ask(question).await {
            Ok(answer) => answer.answer,
            Err(e) if e.is_input() => e.to_string(),
            Err(e) => format!("Error answering question: {}", e),
        }
    }

    pub async fn stats(&self) -> AppResult<PipelineStats> {
        let document_count = self.document_count().await;

        Ok(PipelineStats {
            document_count,
            indexed_chunks: self.store.count().await?,
            indexed_sources: self.store.source_ids().await?.len(),
            status: if document_count == 0 {
                PipelineStatus::Empty
            } else {
                PipelineStatus::Ready
            },
            backend: self.store.backend_name().await,
        })
    }
}

/// Caller-facing status line for an ingest outcome.
///
/// Input errors (unsupported type, empty document) are shown as-is; any
/// other failure is prefixed.
pub fn ingest_status(result: &AppResult<IngestReport>) -> String {
    match result {
        Ok(report) => report.status_message(),
        Err(e) if e.is_input() => e.to_string(),
        Err(e) => format!("Error processing file: {}", e),
    }
}
