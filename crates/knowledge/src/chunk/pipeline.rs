//! Chunking pipeline.

use super::boundaries::BoundaryMap;
use super::Chunk;
use crate::types::DocType;
use docqa_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Configuration for the chunking pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkConfig {
    /// Maximum chunk length in characters
    pub chunk_size: usize,

    /// Characters shared by consecutive chunks
    pub chunk_overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

impl ChunkConfig {
    pub fn validate(&self) -> AppResult<()> {
        if self.chunk_size == 0 {
            return Err(AppError::Config(
                "chunk_size must be greater than 0".to_string(),
            ));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(AppError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// Splits document text into overlapping, boundary-aware chunks.
#[derive(Debug, Clone)]
pub struct ChunkPipeline {
    config: ChunkConfig,
}

impl ChunkPipeline {
    /// Create a pipeline, rejecting invalid size/overlap combinations.
    pub fn new(config: ChunkConfig) -> AppResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    /// Process text into chunks in document order.
    ///
    /// Every character of `text` lands in at least one chunk, except runs
    /// that would form a whitespace-only chunk, which are dropped.
    pub fn process(&self, source_id: &str, doc_type: DocType, text: &str) -> Vec<Chunk> {
        let map = BoundaryMap::new(text);
        let total = map.char_len();
        let ChunkConfig {
            chunk_size,
            chunk_overlap,
        } = self.config;

        let mut chunks = Vec::new();
        if total == 0 {
            return chunks;
        }

        let mut hard_cuts = 0usize;
        let mut start = 0usize;
        loop {
            let limit = (start + chunk_size).min(total);
            let end = if limit == total {
                total
            } else {
                // The cut must land past the overlap so every chunk adds text
                let (cut, level) = map.best_cut(start + chunk_overlap, limit);
                if level.is_none() {
                    hard_cuts += 1;
                }
                cut
            };

            let piece = map.slice(text, start, end);
            if piece.trim().is_empty() {
                tracing::debug!(start, end, "Dropping whitespace-only chunk");
            } else {
                chunks.push(Chunk::new(
                    source_id,
                    doc_type,
                    chunks.len() as u32,
                    piece.to_string(),
                    (start, end),
                ));
            }

            if end == total {
                break;
            }
            start = end - chunk_overlap;
        }

        tracing::debug!(
            source_id,
            chunks = chunks.len(),
            chars = total,
            hard_cuts,
            "Chunking complete"
        );

        chunks
    }
}
