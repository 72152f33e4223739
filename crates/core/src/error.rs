//! Error types for docqa.
//!
//! One enum covers every failure category of the pipeline: configuration,
//! caller input, document extraction, the embedding and generation
//! capabilities, and the vector index.

use thiserror::Error;

/// Unified error type for docqa.
///
/// Library functions return `Result<T, AppError>`; nothing panics on a
/// recoverable failure.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid caller input (unsupported file type, blank question, ...)
    #[error("{0}")]
    Input(String),

    /// Raw text could not be pulled out of a document
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Embedding provider errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// LLM provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Vector index errors
    #[error("Index error: {0}")]
    Index(String),

    /// Prompt rendering errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// True for errors caused by what the caller asked for rather than by a
    /// failing collaborator.
    pub fn is_input(&self) -> bool {
        matches!(self, AppError::Input(_))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
