//! Placeholder embedding provider for tests and dry runs

use crate::{error::EmbeddingError, provider::EmbeddingProvider};
use async_trait::async_trait;
use kbseed_core::error::Result;
use rand::Rng;

/// Provider that returns vectors of uniform random values in `[0, 1)`
///
/// The vectors carry no meaning; they only have the right shape.
pub struct PlaceholderEmbeddingProvider {
    embedding_dim: usize,
}

impl PlaceholderEmbeddingProvider {
    /// Create a new placeholder provider with specified embedding dimension
    pub fn new(embedding_dim: usize) -> Self {
        Self { embedding_dim }
    }
}

#[async_trait]
impl EmbeddingProvider for PlaceholderEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyInput.into());
        }

        let mut rng = rand::thread_rng();
        Ok((0..self.embedding_dim).map(|_| rng.gen::<f32>()).collect())
    }

    fn embedding_dimension(&self) -> usize {
        self.embedding_dim
    }

    fn model_name(&self) -> &str {
        "placeholder"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_vectors_have_configured_dimension_and_range() {
        let provider = PlaceholderEmbeddingProvider::new(1536);
        let vector = provider.embed("snowstorm advisory").await.unwrap();
        assert_eq!(vector.len(), 1536);
        assert!(vector.iter().all(|v| (0.0..1.0).contains(v)));
    }

    #[tokio::test]
    async fn test_batch_preserves_count() {
        let provider = PlaceholderEmbeddingProvider::new(8);
        let vectors = provider
            .embed_batch(vec!["a".to_string(), "b".to_string(), "c".to_string()])
            .await
            .unwrap();
        assert_eq!(vectors.len(), 3);
        assert!(vectors.iter().all(|v| v.len() == 8));
    }

    #[tokio::test]
    async fn test_empty_text_is_rejected() {
        let provider = PlaceholderEmbeddingProvider::new(8);
        assert!(provider.embed("   ").await.is_err());
    }
}
