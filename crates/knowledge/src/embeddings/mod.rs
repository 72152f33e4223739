//! Embedding capability.
//!
//! The pipeline only sees the `Embedder` trait; the concrete provider is
//! chosen from `EmbeddingConfig` by `create_embedder`.

pub mod config;
pub mod provider;
pub mod providers;

pub use config::EmbeddingConfig;
pub use provider::{create_embedder, Embedder};
pub use providers::{OllamaEmbedder, TrigramEmbedder};
