//! SQLite-backed vector index.
//!
//! Vectors are stored as little-endian `f32` blobs and scanned in rowid
//! order at query time, which gives insertion-order tie breaking for free.

use crate::chunk::{Chunk, ChunkMetadata};
use crate::types::{DocType, IndexedEntry, RetrievedChunk};
use crate::vector_index::{check_dimensions, check_query, rank, VectorIndex};
use docqa_core::{AppError, AppResult};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

pub struct SqliteIndex {
    conn: Mutex<Connection>,
    dimensions: usize,
}

impl SqliteIndex {
    /// Open (or create) the index database at `db_path`.
    pub fn open(db_path: &Path, dimensions: usize) -> AppResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)
            .map_err(|e| AppError::Index(format!("Failed to open SQLite index: {}", e)))?;
        init_schema(&conn)?;

        tracing::debug!("Opened SQLite index at {:?}", db_path);
        Ok(Self {
            conn: Mutex::new(conn),
            dimensions,
        })
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Index("SQLite connection lock poisoned".to_string()))
    }
}

fn init_schema(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS chunks (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT NOT NULL UNIQUE,
            source_id TEXT NOT NULL,
            doc_type TEXT NOT NULL,
            position INTEGER NOT NULL,
            text TEXT NOT NULL,
            embedding BLOB NOT NULL,
            metadata TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_chunks_source ON chunks(source_id);
        "#,
    )
    .map_err(|e| AppError::Index(format!("Failed to create tables: {}", e)))
}

#[async_trait::async_trait]
impl VectorIndex for SqliteIndex {
    fn backend_name(&self) -> &str {
        "sqlite"
    }

    async fn append(&mut self, entries: &[IndexedEntry]) -> AppResult<()> {
        check_dimensions(entries, self.dimensions)?;

        let conn = self
            .conn
            .get_mut()
            .map_err(|_| AppError::Index("SQLite connection lock poisoned".to_string()))?;
        let tx = conn
            .transaction()
            .map_err(|e| AppError::Index(format!("Failed to begin transaction: {}", e)))?;

        for entry in entries {
            let chunk = &entry.chunk;
            let metadata = serde_json::to_string(&chunk.metadata)?;

            tx.execute(
                "INSERT INTO chunks (id, source_id, doc_type, position, text, embedding, metadata)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    chunk.id,
                    chunk.source_id,
                    chunk.doc_type.as_str(),
                    chunk.position as i64,
                    chunk.text,
                    embedding_to_bytes(&entry.vector),
                    metadata,
                ],
            )
            .map_err(|e| AppError::Index(format!("Failed to insert chunk: {}", e)))?;
        }

        // Dropping an uncommitted transaction rolls it back.
        tx.commit()
            .map_err(|e| AppError::Index(format!("Failed to commit chunks: {}", e)))?;

        tracing::debug!("Appended {} entries to SQLite index", entries.len());
        Ok(())
    }

    async fn search(&self, query: &[f32], k: usize) -> AppResult<Vec<RetrievedChunk>> {
        if k == 0 {
            return Ok(Vec::new());
        }
        check_query(query, self.dimensions)?;

        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, source_id, doc_type, position, text, embedding, metadata
                 FROM chunks ORDER BY seq",
            )
            .map_err(|e| AppError::Index(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(StoredRow {
                    id: row.get(0)?,
                    source_id: row.get(1)?,
                    doc_type: row.get(2)?,
                    position: row.get(3)?,
                    text: row.get(4)?,
                    embedding: row.get(5)?,
                    metadata: row.get(6)?,
                })
            })
            .map_err(|e| AppError::Index(format!("Failed to query chunks: {}", e)))?;

        let mut candidates = Vec::new();
        for row in rows {
            let row = row.map_err(|e| AppError::Index(format!("Failed to read chunk: {}", e)))?;
            candidates.push(row.into_candidate()?);
        }

        let results = rank(query, candidates, k);
        tracing::debug!("Retrieved {} chunks (requested top-{})", results.len(), k);
        Ok(results)
    }

    async fn count(&self) -> AppResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))
            .map_err(|e| AppError::Index(format!("Failed to count chunks: {}", e)))?;
        Ok(count as usize)
    }

    async fn source_ids(&self) -> AppResult<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT source_id FROM chunks GROUP BY source_id ORDER BY MIN(seq)")
            .map_err(|e| AppError::Index(format!("Failed to prepare query: {}", e)))?;

        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
            .map_err(|e| AppError::Index(format!("Failed to list sources: {}", e)))?;
        Ok(ids)
    }
}

struct StoredRow {
    id: String,
    source_id: String,
    doc_type: String,
    position: i64,
    text: String,
    embedding: Vec<u8>,
    metadata: String,
}

impl StoredRow {
    fn into_candidate(self) -> AppResult<(Chunk, Vec<f32>)> {
        let metadata: ChunkMetadata = serde_json::from_str(&self.metadata)?;
        let doc_type = DocType::parse(&self.doc_type)
            .map_err(|_| AppError::Index(format!("Unknown doc type '{}' in index", self.doc_type)))?;
        let vector = bytes_to_embedding(&self.embedding)?;

        let chunk = Chunk {
            id: self.id,
            source_id: self.source_id,
            doc_type,
            position: self.position as u32,
            text: self.text,
            metadata,
        };
        Ok((chunk, vector))
    }
}

fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Index(
            "Invalid embedding bytes length".to_string(),
        ));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}
