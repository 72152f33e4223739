//! Document QA type definitions.

use crate::chunk::Chunk;
use docqa_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Returned when a file or doc type is not one of pdf, docx, txt.
pub const UNSUPPORTED_TYPE_MESSAGE: &str =
    "Unsupported file type. Please upload a PDF, TXT, or DOCX file.";

/// Document formats the pipeline accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocType {
    Pdf,
    Docx,
    Txt,
}

impl DocType {
    /// Parse a doc type tag ("pdf", "docx", "txt"), case-insensitively.
    pub fn parse(s: &str) -> AppResult<Self> {
        match s.trim().trim_start_matches('.').to_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            "txt" => Ok(Self::Txt),
            _ => Err(AppError::Input(UNSUPPORTED_TYPE_MESSAGE.to_string())),
        }
    }

    /// Doc type implied by a file's extension.
    pub fn from_path(path: &Path) -> AppResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| AppError::Input(UNSUPPORTED_TYPE_MESSAGE.to_string()))?;
        Self::parse(ext)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Txt => "txt",
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A chunk together with its embedding, as stored by an index.
#[derive(Debug, Clone)]
pub struct IndexedEntry {
    pub chunk: Chunk,
    pub vector: Vec<f32>,
}

/// A chunk returned by similarity search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub chunk: Chunk,

    /// Cosine similarity with the query, higher is better
    pub score: f32,
}

/// Outcome of ingesting one document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngestReport {
    pub source_id: String,
    pub doc_type: DocType,
    pub chunk_count: usize,
}

impl IngestReport {
    /// Status line shown to the caller.
    pub fn status_message(&self) -> String {
        format!(
            "Processed {} chunks from '{}'",
            self.chunk_count, self.source_id
        )
    }
}

/// Readiness of the pipeline for questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStatus {
    /// No document processed yet
    Empty,
    /// At least one document processed
    Ready,
}

/// Counters reported by `stats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineStats {
    /// Distinct documents processed by this pipeline
    pub document_count: usize,

    /// Entries currently in the vector index
    pub indexed_chunks: usize,

    /// Distinct source ids currently in the vector index
    pub indexed_sources: usize,

    pub status: PipelineStatus,

    /// Index backend name ("sqlite", "lancedb", "memory")
    pub backend: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_doc_type_parse() {
        assert_eq!(DocType::parse("pdf").unwrap(), DocType::Pdf);
        assert_eq!(DocType::parse("DOCX").unwrap(), DocType::Docx);
        assert_eq!(DocType::parse(".txt").unwrap(), DocType::Txt);
    }

    #[test]
    fn test_doc_type_rejects_other_formats() {
        let err = DocType::parse("xlsx").unwrap_err();
        assert!(err.is_input());
        assert_eq!(err.to_string(), UNSUPPORTED_TYPE_MESSAGE);
    }

    #[test]
    fn test_doc_type_from_path() {
        assert_eq!(
            DocType::from_path(&PathBuf::from("notes/Report.PDF")).unwrap(),
            DocType::Pdf
        );
        assert!(DocType::from_path(&PathBuf::from("Makefile")).is_err());
    }

    #[test]
    fn test_ingest_report_message() {
        let report = IngestReport {
            source_id: "handbook.pdf".to_string(),
            doc_type: DocType::Pdf,
            chunk_count: 12,
        };
        assert_eq!(
            report.status_message(),
            "Processed 12 chunks from 'handbook.pdf'"
        );
    }
}
