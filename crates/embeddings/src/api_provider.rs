//! OpenAI-compatible API provider for embeddings (OpenAI, vLLM, etc.)

use crate::{config::EmbeddingConfig, error::EmbeddingError, provider::EmbeddingProvider};
use async_openai::types::{CreateEmbeddingRequest, EmbeddingInput};
use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use kbseed_core::error::Result;
use tracing::{debug, error, info};

/// OpenAI-compatible API provider
///
/// Every returned vector is checked against the configured dimension. Failed
/// requests are reported immediately and never retried here.
pub struct OpenAiApiProvider {
    client: Client<OpenAIConfig>,
    model: String,
    dimensions: usize,
    batch_size: usize,
}

impl OpenAiApiProvider {
    /// Create a new API provider from configuration
    pub(crate) fn new(config: EmbeddingConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| EmbeddingError::ConfigError(format!("Invalid configuration: {e}")))?;

        let base_url = config
            .api_base_url
            .clone()
            .unwrap_or_else(|| "https://api.openai.com/v1".to_string());

        info!(
            model = %config.model,
            dimensions = config.embedding_dimension,
            batch_size = config.texts_per_api_request,
            base_url = %base_url,
            "Initializing OpenAI-compatible API embeddings"
        );

        let mut openai_config = OpenAIConfig::new().with_api_base(&base_url);
        if let Some(ref api_key) = config.api_key {
            openai_config = openai_config.with_api_key(api_key);
        }

        Ok(Self {
            client: Client::with_config(openai_config),
            model: config.model,
            dimensions: config.embedding_dimension,
            batch_size: config.texts_per_api_request,
        })
    }

    /// Send one request for `texts` and return the vectors in input order
    async fn request(
        &self,
        texts: Vec<String>,
    ) -> std::result::Result<Vec<Vec<f32>>, EmbeddingError> {
        let expected = texts.len();
        let request = CreateEmbeddingRequest {
            model: self.model.clone(),
            input: EmbeddingInput::StringArray(texts),
            encoding_format: None,
            dimensions: None,
            user: None,
        };

        let response = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(|e| {
                error!("Embedding request failed: {e}");
                EmbeddingError::InferenceError(format!("API request failed: {e}"))
            })?;

        let mut data: Vec<(usize, Vec<f32>)> = response
            .data
            .into_iter()
            .map(|emb| (emb.index as usize, emb.embedding))
            .collect();
        data.sort_by_key(|(idx, _)| *idx);

        if data.len() != expected {
            return Err(EmbeddingError::CountMismatch {
                expected,
                actual: data.len(),
            });
        }

        data.into_iter()
            .map(|(_, embedding)| {
                if embedding.len() == self.dimensions {
                    Ok(embedding)
                } else {
                    Err(EmbeddingError::DimensionMismatch {
                        expected: self.dimensions,
                        actual: embedding.len(),
                    })
                }
            })
            .collect()
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiApiProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut embeddings = self.embed_batch(vec![text.to_string()]).await?;
        embeddings.pop().ok_or_else(|| {
            EmbeddingError::CountMismatch {
                expected: 1,
                actual: 0,
            }
            .into()
        })
    }

    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        if texts.iter().any(|t| t.trim().is_empty()) {
            return Err(EmbeddingError::EmptyInput.into());
        }

        let mut embeddings = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.batch_size) {
            debug!(texts = chunk.len(), model = %self.model, "Requesting embeddings");
            embeddings.extend(self.request(chunk.to_vec()).await?);
        }

        Ok(embeddings)
    }

    fn embedding_dimension(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Create a new OpenAI-compatible API provider from configuration
pub fn create_api_provider(config: EmbeddingConfig) -> Result<Box<dyn EmbeddingProvider>> {
    let provider = OpenAiApiProvider::new(config)?;
    Ok(Box::new(provider))
}
