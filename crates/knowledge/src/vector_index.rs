//! Vector index abstraction.
//!
//! An index stores `(chunk, vector)` entries and answers top-k nearest
//! neighbour queries by cosine similarity. Entries are never modified or
//! removed once appended.

use crate::types::{IndexedEntry, RetrievedChunk};
use crate::chunk::Chunk;
use docqa_core::{AppError, AppResult};

/// Storage backend for embedded chunks.
///
/// Implementations must:
/// - append a batch all-or-nothing
/// - return results by descending score, ties in insertion order
/// - reject vectors whose length differs from the index dimension
#[async_trait::async_trait]
pub trait VectorIndex: Send + Sync {
    /// Backend name, e.g. "sqlite"
    fn backend_name(&self) -> &str;

    /// Append entries in order. On error nothing is stored.
    async fn append(&mut self, entries: &[IndexedEntry]) -> AppResult<()>;

    /// Up to `k` entries most similar to `query`.
    async fn search(&self, query: &[f32], k: usize) -> AppResult<Vec<RetrievedChunk>>;

    /// Number of stored entries.
    async fn count(&self) -> AppResult<usize>;

    /// Distinct source ids in first-seen order.
    async fn source_ids(&self) -> AppResult<Vec<String>>;
}

/// Cosine similarity; zero when either vector has zero norm or lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// Score candidates (given in insertion order) and keep the best `k`.
pub(crate) fn rank<I>(query: &[f32], candidates: I, k: usize) -> Vec<RetrievedChunk>
where
    I: IntoIterator<Item = (Chunk, Vec<f32>)>,
{
    let mut scored: Vec<RetrievedChunk> = candidates
        .into_iter()
        .map(|(chunk, vector)| RetrievedChunk {
            score: cosine_similarity(query, &vector),
            chunk,
        })
        .collect();

    // sort_by is stable, so equal scores keep insertion order
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(k);
    scored
}

/// Reject a batch containing a vector of the wrong length.
pub(crate) fn check_dimensions(entries: &[IndexedEntry], dimensions: usize) -> AppResult<()> {
    for entry in entries {
        if entry.vector.len() != dimensions {
            return Err(AppError::Index(format!(
                "Vector for chunk {} has {} dimensions, index expects {}",
                entry.chunk.id,
                entry.vector.len(),
                dimensions
            )));
        }
    }
    Ok(())
}

pub(crate) fn check_query(query: &[f32], dimensions: usize) -> AppResult<()> {
    if query.len() != dimensions {
        return Err(AppError::Index(format!(
            "Query vector has {} dimensions, index expects {}",
            query.len(),
            dimensions
        )));
    }
    Ok(())
}
