//! Trait definition for embedding providers

use async_trait::async_trait;
use kbseed_core::error::Result;

/// Trait for embedding providers
///
/// A provider turns text into a fixed-length float vector. The length is
/// fixed per provider and reported by [`EmbeddingProvider::embedding_dimension`].
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate the embedding for a single text
    ///
    /// # Errors
    /// Fails on empty text, on a provider failure, or when the returned vector
    /// does not have `embedding_dimension()` components.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for a list of texts, in input order
    ///
    /// The default implementation calls [`EmbeddingProvider::embed`] once per
    /// text, sequentially.
    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in &texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    /// Get the embedding dimension
    fn embedding_dimension(&self) -> usize;

    /// Model identifier, used in log output
    fn model_name(&self) -> &str;
}
