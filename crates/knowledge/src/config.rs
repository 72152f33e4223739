//! Pipeline configuration and on-disk layout.
//!
//! Settings live in `<data_dir>/knowledge.yaml`. A missing file means
//! defaults; a present one is validated on load.

use crate::chunk::ChunkConfig;
use crate::embeddings::EmbeddingConfig;
use docqa_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Where embedded chunks are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexBackend {
    #[default]
    Sqlite,
    Lancedb,
    Memory,
}

impl IndexBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Lancedb => "lancedb",
            Self::Memory => "memory",
        }
    }
}

impl fmt::Display for IndexBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeConfig {
    /// Maximum characters per chunk
    pub chunk_size: usize,

    /// Characters shared by consecutive chunks
    pub chunk_overlap: usize,

    /// Chunks retrieved per question
    pub top_k: usize,

    pub backend: IndexBackend,

    pub embedding: EmbeddingConfig,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            top_k: 4,
            backend: IndexBackend::default(),
            embedding: EmbeddingConfig::default(),
        }
    }
}

impl KnowledgeConfig {
    pub fn chunk_config(&self) -> ChunkConfig {
        ChunkConfig {
            chunk_size: self.chunk_size,
            chunk_overlap: self.chunk_overlap,
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        self.chunk_config().validate()?;
        self.embedding.validate()?;
        if self.top_k == 0 {
            return Err(AppError::Config("top_k must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Load `knowledge.yaml` from `data_dir`, or defaults if it does not exist.
pub fn load_config(data_dir: &Path) -> AppResult<KnowledgeConfig> {
    let config_path = get_config_path(data_dir);

    let config = if config_path.exists() {
        let content = fs::read_to_string(&config_path)?;
        let config: KnowledgeConfig = serde_yaml::from_str(&content).map_err(|e| {
            AppError::Config(format!("Failed to parse {}: {}", config_path.display(), e))
        })?;
        tracing::debug!("Loaded knowledge config from {:?}", config_path);
        config
    } else {
        tracing::debug!("No knowledge config at {:?}, using defaults", config_path);
        KnowledgeConfig::default()
    };

    config.validate()?;
    Ok(config)
}

pub fn save_config(data_dir: &Path, config: &KnowledgeConfig) -> AppResult<()> {
    fs::create_dir_all(data_dir)?;
    let yaml = serde_yaml::to_string(config)?;
    fs::write(get_config_path(data_dir), yaml)?;
    Ok(())
}

pub fn get_config_path(data_dir: &Path) -> PathBuf {
    data_dir.join("knowledge.yaml")
}

pub fn get_index_path(data_dir: &Path) -> PathBuf {
    data_dir.join("index.sqlite")
}

pub fn get_lancedb_path(data_dir: &Path) -> PathBuf {
    data_dir.join("lancedb")
}

/// Records which backend and embedder built the index.
pub fn get_manifest_path(data_dir: &Path) -> PathBuf {
    data_dir.join("index.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_default_config() {
        let temp = TempDir::new().unwrap();
        let config = load_config(temp.path()).unwrap();

        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.chunk_overlap, 200);
        assert_eq!(config.top_k, 4);
        assert_eq!(config.backend, IndexBackend::Sqlite);
        assert_eq!(config.embedding.provider, "trigram");
    }

    #[test]
    fn test_save_and_load_config() {
        let temp = TempDir::new().unwrap();
        let config = KnowledgeConfig {
            chunk_size: 400,
            chunk_overlap: 50,
            backend: IndexBackend::Memory,
            ..KnowledgeConfig::default()
        };

        save_config(temp.path(), &config).unwrap();
        assert_eq!(load_config(temp.path()).unwrap(), config);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let temp = TempDir::new().unwrap();
        fs::write(
            get_config_path(temp.path()),
            "chunk_size: 300\nbackend: lancedb\n",
        )
        .unwrap();

        let config = load_config(temp.path()).unwrap();
        assert_eq!(config.chunk_size, 300);
        assert_eq!(config.chunk_overlap, 200);
        assert_eq!(config.backend, IndexBackend::Lancedb);
    }

    #[test]
    fn test_invalid_overlap_rejected() {
        let temp = TempDir::new().unwrap();
        fs::write(
            get_config_path(temp.path()),
            "chunk_size: 100\nchunk_overlap: 100\n",
        )
        .unwrap();

        let err = load_config(temp.path()).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_zero_top_k_rejected() {
        let config = KnowledgeConfig {
            top_k: 0,
            ..KnowledgeConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
