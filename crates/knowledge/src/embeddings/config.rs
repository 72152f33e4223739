//! Embedding configuration.

use docqa_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Which embedder to build, and the shape of its vectors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Provider name: "trigram" or "ollama"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,

    /// Provider endpoint, for HTTP providers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "trigram".to_string(),
            model: "trigram-v1".to_string(),
            dimensions: 384,
            endpoint: None,
        }
    }
}

impl EmbeddingConfig {
    pub fn validate(&self) -> AppResult<()> {
        if self.dimensions == 0 {
            return Err(AppError::Config(
                "Embedding dimensions must be greater than 0".to_string(),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(AppError::Config(
                "Embedding model must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Check that `other` produces vectors comparable with this one.
    ///
    /// An index built with one embedder cannot be queried with another.
    pub fn validate_consistency(&self, other: &Self) -> AppResult<()> {
        if self.provider != other.provider {
            return Err(AppError::Config(format!(
                "Embedding provider mismatch: index built with '{}', configured '{}'",
                self.provider, other.provider
            )));
        }

        if self.model != other.model {
            return Err(AppError::Config(format!(
                "Embedding model mismatch: index built with '{}', configured '{}'",
                self.model, other.model
            )));
        }

        if self.dimensions != other.dimensions {
            return Err(AppError::Config(format!(
                "Embedding dimension mismatch: index built with {}, configured {}",
                self.dimensions, other.dimensions
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EmbeddingConfig::default();
        assert_eq!(config.provider, "trigram");
        assert_eq!(config.model, "trigram-v1");
        assert_eq!(config.dimensions, 384);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let config = EmbeddingConfig {
            dimensions: 0,
            ..EmbeddingConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_consistency_success() {
        let config = EmbeddingConfig::default();
        assert!(config.validate_consistency(&config.clone()).is_ok());
    }

    #[test]
    fn test_endpoint_does_not_affect_consistency() {
        let config = EmbeddingConfig::default();
        let other = EmbeddingConfig {
            endpoint: Some("http://gpu-box:11434".to_string()),
            ..config.clone()
        };
        assert!(config.validate_consistency(&other).is_ok());
    }

    #[test]
    fn test_validate_consistency_provider_mismatch() {
        let config = EmbeddingConfig::default();
        let other = EmbeddingConfig {
            provider: "ollama".to_string(),
            ..config.clone()
        };

        let err = config.validate_consistency(&other).unwrap_err();
        assert!(err.to_string().contains("provider mismatch"));
    }

    #[test]
    fn test_validate_consistency_dimension_mismatch() {
        let config = EmbeddingConfig::default();
        let other = EmbeddingConfig {
            dimensions: 768,
            ..config.clone()
        };

        let err = config.validate_consistency(&other).unwrap_err();
        assert!(err.to_string().contains("dimension mismatch"));
    }
}
