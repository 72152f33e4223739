//! Ranking behaviour shared by every index backend.

use crate::chunk::Chunk;
use crate::index::SqliteIndex;
use crate::lancedb_index::LanceDbIndex;
use crate::memory_index::MemoryIndex;
use crate::types::{DocType, IndexedEntry};
use crate::vector_index::VectorIndex;
use tempfile::TempDir;

fn normalize(v: &[f32]) -> Vec<f32> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter().map(|x| x / norm).collect()
    } else {
        v.to_vec()
    }
}

fn entry(position: u32, source: &str, text: &str, vector: [f32; 4]) -> IndexedEntry {
    IndexedEntry {
        chunk: Chunk::new(source, DocType::Txt, position, text.to_string(), (0, text.len())),
        vector: normalize(&vector),
    }
}

fn entries() -> Vec<IndexedEntry> {
    vec![
        entry(0, "rust.md", "Rust is a systems programming language", [1.0, 0.5, 0.2, 0.1]),
        entry(1, "pasta.md", "Cooking recipes for pasta", [-0.3, -0.8, 0.4, -0.2]),
        entry(2, "rust.md", "Cargo builds Rust crates", [0.8, 0.6, 0.1, 0.0]),
    ]
}

fn query() -> Vec<f32> {
    normalize(&[0.9, 0.4, 0.3, 0.1])
}

async fn assert_ranking(index: &mut dyn VectorIndex) {
    index.append(&entries()).await.unwrap();

    let results = index.search(&query(), 3).await.unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].chunk.text, "Rust is a systems programming language");
    assert!(results[0].score > 0.9);
    assert_eq!(results[1].chunk.text, "Cargo builds Rust crates");
    assert!(results[2].score < 0.0);
    assert!(results.windows(2).all(|w| w[0].score >= w[1].score));

    let top_one = index.search(&query(), 1).await.unwrap();
    assert_eq!(top_one[0].chunk.id, results[0].chunk.id);
    assert!(index.search(&query(), 0).await.unwrap().is_empty());
}

async fn assert_ties_keep_insertion_order(index: &mut dyn VectorIndex) {
    let same = [0.0, 1.0, 0.0, 0.0];
    index.append(&[entry(0, "first.md", "first copy", same)]).await.unwrap();
    index
        .append(&[
            entry(0, "other.md", "unrelated", [1.0, 0.0, 0.0, 0.0]),
            entry(0, "second.md", "second copy", same),
        ])
        .await
        .unwrap();

    for _ in 0..3 {
        let results = index.search(&normalize(&same), 2).await.unwrap();
        let sources: Vec<&str> = results.iter().map(|r| r.chunk.source_id.as_str()).collect();
        assert_eq!(sources, vec!["first.md", "second.md"]);
        assert_eq!(results[0].score, results[1].score);
    }
}

async fn assert_zero_vector_scores_zero(index: &mut dyn VectorIndex) {
    index.append(&entries()).await.unwrap();
    index
        .append(&[entry(3, "zero.md", "", [0.0, 0.0, 0.0, 0.0])])
        .await
        .unwrap();

    let results = index.search(&query(), 4).await.unwrap();
    // zero vector scores 0.0, above the negatively correlated pasta chunk
    assert_eq!(results[2].chunk.source_id, "zero.md");
    assert_eq!(results[2].score, 0.0);
    assert!(results[3].score < 0.0);
}

fn sqlite(temp: &TempDir) -> SqliteIndex {
    SqliteIndex::open(&temp.path().join("index.sqlite"), 4).unwrap()
}

async fn lancedb(temp: &TempDir) -> LanceDbIndex {
    LanceDbIndex::open(&temp.path().join("lancedb"), 4).await.unwrap()
}

#[tokio::test]
async fn test_memory_ranking() {
    assert_ranking(&mut MemoryIndex::new(4)).await;
    assert_ties_keep_insertion_order(&mut MemoryIndex::new(4)).await;
    assert_zero_vector_scores_zero(&mut MemoryIndex::new(4)).await;
}

#[tokio::test]
async fn test_sqlite_ranking() {
    let temp = TempDir::new().unwrap();
    assert_ranking(&mut sqlite(&temp)).await;

    let temp = TempDir::new().unwrap();
    assert_ties_keep_insertion_order(&mut sqlite(&temp)).await;

    let temp = TempDir::new().unwrap();
    assert_zero_vector_scores_zero(&mut sqlite(&temp)).await;
}

#[tokio::test]
async fn test_lancedb_ranking() {
    let temp = TempDir::new().unwrap();
    assert_ranking(&mut lancedb(&temp).await).await;

    let temp = TempDir::new().unwrap();
    assert_ties_keep_insertion_order(&mut lancedb(&temp).await).await;
}
