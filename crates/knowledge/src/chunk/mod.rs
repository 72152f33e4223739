//! Boundary-aware chunking of raw document text.
//!
//! Text is cut into windows of at most `chunk_size` characters (Unicode
//! scalar values). Each cut prefers, in order: a paragraph break, a line
//! break, a sentence boundary, whitespace, and only then an arbitrary
//! character. Consecutive chunks share exactly `chunk_overlap` characters.

mod boundaries;
mod metadata;
mod pipeline;

pub use pipeline::{ChunkConfig, ChunkPipeline};

use crate::types::DocType;
use chrono::{DateTime, Utc};
use docqa_core::AppResult;
use serde::{Deserialize, Serialize};

/// A bounded span of document text with provenance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Unique identifier (UUID v4)
    pub id: String,

    /// Document the chunk came from; shared by all its chunks
    pub source_id: String,

    pub doc_type: DocType,

    /// Chunk position in document (0-indexed)
    pub position: u32,

    /// Chunk text content, never empty
    pub text: String,

    pub metadata: ChunkMetadata,
}

/// Metadata about a chunk's origin.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkMetadata {
    /// Character range `[start, end)` in the source text
    pub char_range: (usize, usize),

    pub char_count: usize,

    /// SHA-256 hash of chunk text
    pub hash: String,

    pub created_at: DateTime<Utc>,
}

impl Chunk {
    /// Create a new chunk with generated ID and timestamp.
    pub fn new(
        source_id: impl Into<String>,
        doc_type: DocType,
        position: u32,
        text: String,
        char_range: (usize, usize),
    ) -> Self {
        let char_count = text.chars().count();
        let hash = metadata::calculate_hash(&text);

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            source_id: source_id.into(),
            doc_type,
            position,
            text,
            metadata: ChunkMetadata {
                char_range,
                char_count,
                hash,
                created_at: Utc::now(),
            },
        }
    }
}

/// Split one document into overlapping chunks.
///
/// Fails with a configuration error unless `chunk_size > 0` and
/// `chunk_overlap < chunk_size`. Empty text yields no chunks.
pub fn split(
    source_id: &str,
    doc_type: DocType,
    raw_text: &str,
    chunk_size: usize,
    chunk_overlap: usize,
) -> AppResult<Vec<Chunk>> {
    let pipeline = ChunkPipeline::new(ChunkConfig {
        chunk_size,
        chunk_overlap,
    })?;
    Ok(pipeline.process(source_id, doc_type, raw_text))
}
