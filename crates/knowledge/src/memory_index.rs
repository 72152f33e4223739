//! In-process vector index. Lost when the process exits.

use crate::types::{IndexedEntry, RetrievedChunk};
use crate::vector_index::{check_dimensions, check_query, rank, VectorIndex};
use docqa_core::AppResult;

#[derive(Debug, Default)]
pub struct MemoryIndex {
    dimensions: usize,
    entries: Vec<IndexedEntry>,
}

impl MemoryIndex {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            entries: Vec::new(),
        }
    }
}

#[async_trait::async_trait]
impl VectorIndex for MemoryIndex {
    fn backend_name(&self) -> &str {
        "memory"
    }

    async fn append(&mut self, entries: &[IndexedEntry]) -> AppResult<()> {
        check_dimensions(entries, self.dimensions)?;
        self.entries.extend_from_slice(entries);
        Ok(())
    }

    async fn search(&self, query: &[f32], k: usize) -> AppResult<Vec<RetrievedChunk>> {
        if k == 0 || self.entries.is_empty() {
            return Ok(Vec::new());
        }
        check_query(query, self.dimensions)?;

        let candidates = self
            .entries
            .iter()
            .map(|e| (e.chunk.clone(), e.vector.clone()));
        Ok(rank(query, candidates, k))
    }

    async fn count(&self) -> AppResult<usize> {
        Ok(self.entries.len())
    }

    async fn source_ids(&self) -> AppResult<Vec<String>> {
        let mut ids: Vec<String> = Vec::new();
        for entry in &self.entries {
            if !ids.contains(&entry.chunk.source_id) {
                ids.push(entry.chunk.source_id.clone());
            }
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::Chunk;
    use crate::types::DocType;

    fn entry(source: &str, text: &str, vector: Vec<f32>) -> IndexedEntry {
        IndexedEntry {
            chunk: Chunk::new(source, DocType::Txt, 0, text.to_string(), (0, text.len())),
            vector,
        }
    }

    #[tokio::test]
    async fn test_append_and_search() {
        let mut index = MemoryIndex::new(2);
        index
            .append(&[
                entry("a", "north", vec![0.0, 1.0]),
                entry("b", "east", vec![1.0, 0.0]),
            ])
            .await
            .unwrap();

        let results = index.search(&[1.0, 0.1], 1).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.text, "east");
        assert_eq!(index.count().await.unwrap(), 2);
        assert_eq!(index.source_ids().await.unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_failed_append_stores_nothing() {
        let mut index = MemoryIndex::new(2);
        let result = index
            .append(&[entry("a", "ok", vec![1.0, 0.0]), entry("a", "bad", vec![1.0])])
            .await;

        assert!(result.is_err());
        assert_eq!(index.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_empty_index_search() {
        let index = MemoryIndex::new(2);
        assert!(index.search(&[1.0, 0.0], 4).await.unwrap().is_empty());
    }
}
