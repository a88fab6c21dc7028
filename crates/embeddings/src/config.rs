//! Configuration for embedding generation

use serde::{Deserialize, Serialize};

/// Embedding provider type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EmbeddingProviderType {
    /// OpenAI-compatible API (OpenAI, vLLM or any `/embeddings` server)
    #[default]
    OpenAi,
    /// Random vectors, for test builds and dry runs
    Placeholder,
}

impl EmbeddingProviderType {
    /// Parse a provider name as written in configuration
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "openai" | "api" => Some(Self::OpenAi),
            "placeholder" => Some(Self::Placeholder),
            _ => None,
        }
    }
}

/// Configuration for embedding generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Provider type
    pub(crate) provider: EmbeddingProviderType,

    /// Model name
    pub(crate) model: String,

    /// Number of texts sent in a single API request
    pub(crate) texts_per_api_request: usize,

    /// API base URL
    pub(crate) api_base_url: Option<String>,

    /// API key for authentication
    #[serde(skip_serializing)]
    pub(crate) api_key: Option<String>,

    /// Embedding dimension size
    pub(crate) embedding_dimension: usize,
}

impl EmbeddingConfig {
    pub fn provider(&self) -> EmbeddingProviderType {
        self.provider
    }

    pub fn embedding_dimension(&self) -> usize {
        self.embedding_dimension
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.texts_per_api_request == 0 {
            return Err("texts_per_api_request must be greater than 0".to_string());
        }
        if self.texts_per_api_request > 2048 {
            return Err("texts_per_api_request too large (max 2048)".to_string());
        }
        if self.model.is_empty() {
            return Err("Model name cannot be empty".to_string());
        }
        if self.embedding_dimension == 0 {
            return Err("embedding_dimension must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProviderType::default(),
            model: "text-embedding-3-small".to_string(),
            texts_per_api_request: 16,
            api_base_url: Some("https://api.openai.com/v1".to_string()),
            api_key: None,
            embedding_dimension: 1536,
        }
    }
}

/// Builder for EmbeddingConfig
pub struct EmbeddingConfigBuilder {
    provider: Option<EmbeddingProviderType>,
    model: Option<String>,
    texts_per_api_request: Option<usize>,
    api_base_url: Option<Option<String>>,
    api_key: Option<Option<String>>,
    embedding_dimension: Option<usize>,
}

impl EmbeddingConfigBuilder {
    /// Create a new builder with no defaults set
    pub fn new() -> Self {
        Self {
            provider: None,
            model: None,
            texts_per_api_request: None,
            api_base_url: None,
            api_key: None,
            embedding_dimension: None,
        }
    }

    /// Set the provider type
    pub fn provider(mut self, provider: EmbeddingProviderType) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the model name
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the number of texts per API request
    pub fn texts_per_api_request(mut self, count: usize) -> Self {
        self.texts_per_api_request = Some(count);
        self
    }

    /// Set the API base URL
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(Some(url.into()));
        self
    }

    /// Set the API key
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(Some(key.into()));
        self
    }

    /// Set the embedding dimension
    pub fn embedding_dimension(mut self, dimension: usize) -> Self {
        self.embedding_dimension = Some(dimension);
        self
    }

    /// Build the configuration, using defaults for unset fields
    pub fn build(self) -> EmbeddingConfig {
        let defaults = EmbeddingConfig::default();

        EmbeddingConfig {
            provider: self.provider.unwrap_or(defaults.provider),
            model: self.model.unwrap_or(defaults.model),
            texts_per_api_request: self
                .texts_per_api_request
                .unwrap_or(defaults.texts_per_api_request),
            api_base_url: self.api_base_url.unwrap_or(defaults.api_base_url),
            api_key: self.api_key.unwrap_or(defaults.api_key),
            embedding_dimension: self
                .embedding_dimension
                .unwrap_or(defaults.embedding_dimension),
        }
    }
}

impl Default for EmbeddingConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_uses_defaults_for_unset_fields() {
        let config = EmbeddingConfigBuilder::new().model("m").build();
        assert_eq!(config.model, "m");
        assert_eq!(config.embedding_dimension, 1536);
        assert_eq!(config.provider, EmbeddingProviderType::OpenAi);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_dimension() {
        let config = EmbeddingConfigBuilder::new().embedding_dimension(0).build();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_provider_names() {
        assert_eq!(
            EmbeddingProviderType::from_name("OpenAI"),
            Some(EmbeddingProviderType::OpenAi)
        );
        assert_eq!(
            EmbeddingProviderType::from_name("placeholder"),
            Some(EmbeddingProviderType::Placeholder)
        );
        assert_eq!(EmbeddingProviderType::from_name("jina"), None);
    }
}
