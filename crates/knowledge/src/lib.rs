//! Document question answering over a local vector index.
//!
//! Documents are split into overlapping chunks, embedded, and stored in a
//! vector index. Questions are answered by retrieving the closest chunks
//! and asking a language model to answer from them alone, citing sources.

pub mod chunk;
pub mod config;
pub mod embeddings;
pub mod extract;
pub mod index;
pub mod lancedb_index;
pub mod memory_index;
pub mod pipeline;
pub mod rag;
pub mod store;
pub mod types;
pub mod vector_index;

#[cfg(test)]
mod tests;

pub use chunk::{split, Chunk, ChunkConfig, ChunkMetadata};
pub use config::{IndexBackend, KnowledgeConfig};
pub use embeddings::{create_embedder, Embedder, EmbeddingConfig};
pub use extract::{discover_documents, extract_file, ExtractedDocument};
pub use pipeline::{
    ingest_status, Pipeline, PipelineOptions, BLANK_QUESTION_MESSAGE, NOT_READY_MESSAGE,
};
pub use rag::{Answer, AnswerSynthesizer, Generator, LlmGenerator, SourceRef};
pub use store::VectorStore;
pub use types::{
    DocType, IndexedEntry, IngestReport, PipelineStats, PipelineStatus, RetrievedChunk,
    UNSUPPORTED_TYPE_MESSAGE,
};
pub use vector_index::VectorIndex;
