//! LanceDB-backed vector index.
//!
//! Each append writes a single record batch, so a batch lands as one
//! Lance commit or not at all. Search is LanceDB's cosine nearest-neighbour
//! query; the returned rows are re-scored and ordered by (score desc, `seq`
//! asc) so scores and tie order match the other backends.

use crate::chunk::{Chunk, ChunkMetadata};
use crate::types::{DocType, IndexedEntry, RetrievedChunk};
use crate::vector_index::{check_dimensions, check_query, cosine_similarity, VectorIndex};
use arrow_array::{
    Array, FixedSizeListArray, Float32Array, RecordBatch, RecordBatchIterator, StringArray,
    UInt32Array, UInt64Array,
};
use arrow_schema::{DataType, Field, Schema};
use docqa_core::{AppError, AppResult};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase, Select};
use lancedb::{DistanceType, Table};
use std::path::Path;
use std::sync::Arc;

const TABLE_NAME: &str = "chunks";

pub struct LanceDbIndex {
    table: Table,
    dimensions: usize,
}

impl LanceDbIndex {
    /// Open the `chunks` table under `db_path`, creating it if absent.
    pub async fn open(db_path: &Path, dimensions: usize) -> AppResult<Self> {
        std::fs::create_dir_all(db_path)?;

        let uri = db_path.to_string_lossy().to_string();
        let conn = lancedb::connect(&uri)
            .execute()
            .await
            .map_err(|e| AppError::Index(format!("Failed to connect to LanceDB: {}", e)))?;

        let table_names = conn
            .table_names()
            .execute()
            .await
            .map_err(|e| AppError::Index(format!("Failed to list tables: {}", e)))?;

        let table = if table_names.iter().any(|name| name == TABLE_NAME) {
            conn.open_table(TABLE_NAME)
                .execute()
                .await
                .map_err(|e| AppError::Index(format!("Failed to open table: {}", e)))?
        } else {
            let schema = schema(dimensions);
            let empty = RecordBatch::new_empty(schema.clone());
            conn.create_table(
                TABLE_NAME,
                RecordBatchIterator::new(vec![Ok(empty)], schema),
            )
            .execute()
            .await
            .map_err(|e| AppError::Index(format!("Failed to create table: {}", e)))?
        };

        tracing::debug!("Opened LanceDB index at {:?}", db_path);
        Ok(Self { table, dimensions })
    }

    async fn row_count(&self) -> AppResult<usize> {
        self.table
            .count_rows(None)
            .await
            .map_err(|e| AppError::Index(format!("Failed to count rows: {}", e)))
    }

    fn entries_to_batch(&self, entries: &[IndexedEntry], first_seq: u64) -> AppResult<RecordBatch> {
        let mut metadata = Vec::with_capacity(entries.len());
        for entry in entries {
            metadata.push(serde_json::to_string(&entry.chunk.metadata)?);
        }

        let ids = StringArray::from_iter_values(entries.iter().map(|e| e.chunk.id.as_str()));
        let sources =
            StringArray::from_iter_values(entries.iter().map(|e| e.chunk.source_id.as_str()));
        let doc_types =
            StringArray::from_iter_values(entries.iter().map(|e| e.chunk.doc_type.as_str()));
        let positions = UInt32Array::from_iter_values(entries.iter().map(|e| e.chunk.position));
        let texts = StringArray::from_iter_values(entries.iter().map(|e| e.chunk.text.as_str()));
        let metadata = StringArray::from_iter_values(metadata.iter().map(String::as_str));
        let seqs = UInt64Array::from_iter_values(first_seq..first_seq + entries.len() as u64);

        let values =
            Float32Array::from_iter_values(entries.iter().flat_map(|e| e.vector.iter().copied()));
        let embeddings = FixedSizeListArray::try_new(
            item_field(),
            self.dimensions as i32,
            Arc::new(values),
            None,
        )
        .map_err(|e| AppError::Index(format!("Failed to build embedding column: {}", e)))?;

        RecordBatch::try_new(
            schema(self.dimensions),
            vec![
                Arc::new(ids),
                Arc::new(sources),
                Arc::new(doc_types),
                Arc::new(positions),
                Arc::new(texts),
                Arc::new(embeddings),
                Arc::new(metadata),
                Arc::new(seqs),
            ],
        )
        .map_err(|e| AppError::Index(format!("Failed to create RecordBatch: {}", e)))
    }
}

fn item_field() -> Arc<Field> {
    Arc::new(Field::new("item", DataType::Float32, true))
}

fn schema(dimensions: usize) -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("source_id", DataType::Utf8, false),
        Field::new("doc_type", DataType::Utf8, false),
        Field::new("position", DataType::UInt32, false),
        Field::new("text", DataType::Utf8, false),
        Field::new(
            "embedding",
            DataType::FixedSizeList(item_field(), dimensions as i32),
            false,
        ),
        Field::new("metadata", DataType::Utf8, false),
        Field::new("seq", DataType::UInt64, false),
    ]))
}

fn column<'a, T: 'static>(batch: &'a RecordBatch, name: &str) -> AppResult<&'a T> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<T>())
        .ok_or_else(|| AppError::Index(format!("Invalid {} column", name)))
}

/// Decode every row of `batch` into `(seq, chunk, vector)`.
fn batch_rows(batch: &RecordBatch) -> AppResult<Vec<(u64, Chunk, Vec<f32>)>> {
    let ids = column::<StringArray>(batch, "id")?;
    let sources = column::<StringArray>(batch, "source_id")?;
    let doc_types = column::<StringArray>(batch, "doc_type")?;
    let positions = column::<UInt32Array>(batch, "position")?;
    let texts = column::<StringArray>(batch, "text")?;
    let embeddings = column::<FixedSizeListArray>(batch, "embedding")?;
    let metadata = column::<StringArray>(batch, "metadata")?;
    let seqs = column::<UInt64Array>(batch, "seq")?;

    let mut rows = Vec::with_capacity(batch.num_rows());
    for i in 0..batch.num_rows() {
        let values = embeddings.value(i);
        let vector = values
            .as_any()
            .downcast_ref::<Float32Array>()
            .ok_or_else(|| AppError::Index("Invalid embedding values".to_string()))?
            .values()
            .to_vec();

        let doc_type = DocType::parse(doc_types.value(i)).map_err(|_| {
            AppError::Index(format!("Unknown doc type '{}' in index", doc_types.value(i)))
        })?;
        let chunk_metadata: ChunkMetadata = serde_json::from_str(metadata.value(i))?;

        let chunk = Chunk {
            id: ids.value(i).to_string(),
            source_id: sources.value(i).to_string(),
            doc_type,
            position: positions.value(i),
            text: texts.value(i).to_string(),
            metadata: chunk_metadata,
        };
        rows.push((seqs.value(i), chunk, vector));
    }
    Ok(rows)
}

#[async_trait::async_trait]
impl VectorIndex for LanceDbIndex {
    fn backend_name(&self) -> &str {
        "lancedb"
    }

    async fn append(&mut self, entries: &[IndexedEntry]) -> AppResult<()> {
        if entries.is_empty() {
            return Ok(());
        }
        check_dimensions(entries, self.dimensions)?;

        let first_seq = self.row_count().await? as u64;
        let batch = self.entries_to_batch(entries, first_seq)?;
        let schema = batch.schema();

        self.table
            .add(RecordBatchIterator::new(vec![Ok(batch)], schema))
            .execute()
            .await
            .map_err(|e| AppError::Index(format!("Failed to add chunks: {}", e)))?;

        tracing::debug!("Appended {} entries to LanceDB index", entries.len());
        Ok(())
    }

    async fn search(&self, query: &[f32], k: usize) -> AppResult<Vec<RetrievedChunk>> {
        if k == 0 || self.row_count().await? == 0 {
            return Ok(Vec::new());
        }
        check_query(query, self.dimensions)?;

        let batches: Vec<RecordBatch> = self
            .table
            .query()
            .nearest_to(query.to_vec())
            .map_err(|e| AppError::Index(format!("Failed to create query: {}", e)))?
            .column("embedding")
            .distance_type(DistanceType::Cosine)
            .limit(k)
            .execute()
            .await
            .map_err(|e| AppError::Index(format!("Failed to execute search: {}", e)))?
            .try_collect()
            .await
            .map_err(|e| AppError::Index(format!("Failed to collect results: {}", e)))?;

        let mut scored = Vec::new();
        for batch in &batches {
            for (seq, chunk, vector) in batch_rows(batch)? {
                let score = cosine_similarity(query, &vector);
                scored.push((seq, RetrievedChunk { chunk, score }));
            }
        }
        scored.sort_by(|(seq_a, a), (seq_b, b)| {
            b.score.total_cmp(&a.score).then_with(|| seq_a.cmp(seq_b))
        });
        scored.truncate(k);

        let results: Vec<RetrievedChunk> = scored.into_iter().map(|(_, r)| r).collect();
        tracing::debug!("Retrieved {} chunks (requested top-{})", results.len(), k);
        Ok(results)
    }

    async fn count(&self) -> AppResult<usize> {
        self.row_count().await
    }

    async fn source_ids(&self) -> AppResult<Vec<String>> {
        let batches: Vec<RecordBatch> = self
            .table
            .query()
            .select(Select::columns(&["source_id", "seq"]))
            .execute()
            .await
            .map_err(|e| AppError::Index(format!("Failed to list sources: {}", e)))?
            .try_collect()
            .await
            .map_err(|e| AppError::Index(format!("Failed to collect sources: {}", e)))?;

        let mut seen: Vec<(u64, String)> = Vec::new();
        for batch in &batches {
            let sources = column::<StringArray>(batch, "source_id")?;
            let seqs = column::<UInt64Array>(batch, "seq")?;
            for i in 0..batch.num_rows() {
                seen.push((seqs.value(i), sources.value(i).to_string()));
            }
        }
        seen.sort_by_key(|(seq, _)| *seq);

        let mut ids: Vec<String> = Vec::new();
        for (_, id) in seen {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(source: &str, text: &str, vector: Vec<f32>) -> IndexedEntry {
        IndexedEntry {
            chunk: Chunk::new(source, DocType::Pdf, 0, text.to_string(), (0, text.len())),
            vector,
        }
    }

    #[tokio::test]
    async fn test_append_search_and_reopen() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("lancedb");

        {
            let mut index = LanceDbIndex::open(&path, 3).await.unwrap();
            assert!(index.search(&[1.0, 0.0, 0.0], 2).await.unwrap().is_empty());

            index
                .append(&[
                    entry("a", "x-axis", vec![1.0, 0.0, 0.0]),
                    entry("b", "y-axis", vec![0.0, 1.0, 0.0]),
                ])
                .await
                .unwrap();
            index
                .append(&[entry("a", "x-again", vec![2.0, 0.0, 0.0])])
                .await
                .unwrap();
        }

        let index = LanceDbIndex::open(&path, 3).await.unwrap();
        assert_eq!(index.count().await.unwrap(), 3);
        assert_eq!(index.source_ids().await.unwrap(), vec!["a", "b"]);

        let results = index.search(&[1.0, 0.0, 0.0], 2).await.unwrap();
        let texts: Vec<&str> = results.iter().map(|r| r.chunk.text.as_str()).collect();
        assert_eq!(texts, vec!["x-axis", "x-again"]);
        assert_eq!(results[0].chunk.doc_type, DocType::Pdf);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_rejected() {
        let temp = TempDir::new().unwrap();
        let mut index = LanceDbIndex::open(&temp.path().join("lancedb"), 3)
            .await
            .unwrap();

        let err = index
            .append(&[entry("a", "short", vec![1.0])])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Index(_)));
        assert_eq!(index.count().await.unwrap(), 0);
    }
}
