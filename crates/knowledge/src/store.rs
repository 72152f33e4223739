//! Embedder plus index, behind one handle.

use crate::chunk::Chunk;
use crate::config::{self, IndexBackend, KnowledgeConfig};
use crate::embeddings::{Embedder, EmbeddingConfig};
use crate::index::SqliteIndex;
use crate::lancedb_index::LanceDbIndex;
use crate::memory_index::MemoryIndex;
use crate::types::{IndexedEntry, RetrievedChunk};
use crate::vector_index::VectorIndex;
use docqa_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Written next to a persistent index; an index is only reopened with the
/// embedder that built it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexManifest {
    pub backend: IndexBackend,
    pub embedding: EmbeddingConfig,
}

/// Embeds chunks and keeps them searchable.
///
/// Writes are serialized by the lock; concurrent searches only read.
pub struct VectorStore {
    embedder: Arc<dyn Embedder>,
    index: RwLock<Box<dyn VectorIndex>>,
}

impl VectorStore {
    pub fn new(embedder: Arc<dyn Embedder>, index: Box<dyn VectorIndex>) -> Self {
        Self {
            embedder,
            index: RwLock::new(index),
        }
    }

    /// In-memory store, used for ephemeral sessions and tests.
    pub fn in_memory(embedder: Arc<dyn Embedder>) -> Self {
        let dimensions = embedder.dimensions();
        Self::new(embedder, Box::new(MemoryIndex::new(dimensions)))
    }

    /// Open the configured backend under `data_dir`.
    ///
    /// Fails with a configuration error if a persisted index was built by a
    /// different embedder.
    pub async fn open(
        data_dir: &Path,
        config: &KnowledgeConfig,
        embedder: Arc<dyn Embedder>,
    ) -> AppResult<Self> {
        let dimensions = embedder.dimensions();

        let index: Box<dyn VectorIndex> = match config.backend {
            IndexBackend::Memory => Box::new(MemoryIndex::new(dimensions)),
            IndexBackend::Sqlite => {
                let pending = check_manifest(data_dir, config.backend, embedder.as_ref())?;
                let index = SqliteIndex::open(&config::get_index_path(data_dir), dimensions)?;
                write_manifest(data_dir, pending)?;
                Box::new(index)
            }
            IndexBackend::Lancedb => {
                let pending = check_manifest(data_dir, config.backend, embedder.as_ref())?;
                let index =
                    LanceDbIndex::open(&config::get_lancedb_path(data_dir), dimensions).await?;
                write_manifest(data_dir, pending)?;
                Box::new(index)
            }
        };

        tracing::debug!(
            backend = index.backend_name(),
            embedder = embedder.provider_name(),
            "Opened vector store"
        );
        Ok(Self::new(embedder, index))
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    pub async fn backend_name(&self) -> String {
        self.index.read().await.backend_name().to_string()
    }

    /// Embed every chunk, then append them all in one write.
    ///
    /// If embedding fails for any chunk the index is left untouched.
    pub async fn embed_and_store(&self, chunks: Vec<Chunk>) -> AppResult<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self.embedder.embed_batch(&texts).await?;

        if vectors.len() != chunks.len() {
            return Err(AppError::Embedding(format!(
                "Embedder returned {} vectors for {} chunks",
                vectors.len(),
                chunks.len()
            )));
        }
        let dimensions = self.embedder.dimensions();
        if let Some(bad) = vectors.iter().find(|v| v.len() != dimensions) {
            return Err(AppError::Embedding(format!(
                "Embedder returned a {}-dimensional vector, expected {}",
                bad.len(),
                dimensions
            )));
        }

        let entries: Vec<IndexedEntry> = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| IndexedEntry { chunk, vector })
            .collect();

        self.index.write().await.append(&entries).await?;
        Ok(entries.len())
    }

    /// The `k` chunks most similar to `query`, best first.
    ///
    /// Returns nothing, without calling the embedder, when `k` is zero or
    /// the index is empty.
    pub async fn similarity_search(&self, query: &str, k: usize) -> AppResult<Vec<RetrievedChunk>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let index = self.index.read().await;
        if index.count().await? == 0 {
            return Ok(Vec::new());
        }

        let vector = self.embedder.embed(query).await?;
        index.search(&vector, k).await
    }

    pub async fn count(&self) -> AppResult<usize> {
        self.index.read().await.count().await
    }

    pub async fn source_ids(&self) -> AppResult<Vec<String>> {
        self.index.read().await.source_ids().await
    }
}

fn embedder_identity(embedder: &dyn Embedder) -> EmbeddingConfig {
    EmbeddingConfig {
        provider: embedder.provider_name().to_string(),
        model: embedder.model_name().to_string(),
        dimensions: embedder.dimensions(),
        endpoint: None,
    }
}

/// Validate an existing manifest against the embedder.
///
/// Returns the manifest to write once the index has opened, or `None` when
/// one is already on disk.
fn check_manifest(
    data_dir: &Path,
    backend: IndexBackend,
    embedder: &dyn Embedder,
) -> AppResult<Option<IndexManifest>> {
    let path = config::get_manifest_path(data_dir);
    let current = IndexManifest {
        backend,
        embedding: embedder_identity(embedder),
    };

    if !path.exists() {
        return Ok(Some(current));
    }

    let stored: IndexManifest = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    if stored.backend != backend {
        return Err(AppError::Config(format!(
            "Index at {} was built with the {} backend, configured {}",
            data_dir.display(),
            stored.backend,
            backend
        )));
    }
    stored.embedding.validate_consistency(&current.embedding)?;
    Ok(None)
}

fn write_manifest(data_dir: &Path, manifest: Option<IndexManifest>) -> AppResult<()> {
    if let Some(manifest) = manifest {
        std::fs::create_dir_all(data_dir)?;
        std::fs::write(
            config::get_manifest_path(data_dir),
            serde_json::to_string_pretty(&manifest)?,
        )?;
    }
    Ok(())
}
