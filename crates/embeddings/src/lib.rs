//! Embedding generation for knowledge-base records
//!
//! This crate provides the [`EmbeddingProvider`] capability and its
//! implementations: an OpenAI-compatible API client and, in test builds or
//! with the `placeholder` feature, a random-vector provider.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use kbseed_core::error::{Result, ResultExt};
use std::sync::Arc;

mod api_provider;
pub mod config;
pub mod error;
#[cfg(any(test, feature = "placeholder"))]
mod placeholder_provider;
pub mod provider;

pub use api_provider::create_api_provider;
pub use config::{EmbeddingConfig, EmbeddingConfigBuilder, EmbeddingProviderType};
pub use error::EmbeddingError;
#[cfg(any(test, feature = "placeholder"))]
pub use placeholder_provider::PlaceholderEmbeddingProvider;
pub use provider::EmbeddingProvider;

/// Convert the application's embeddings section into an [`EmbeddingConfig`]
///
/// Reads the API key from the EMBEDDING_API_KEY environment variable if it is
/// not specified in the config.
pub fn embedding_config_from_app_config(
    embeddings_config: &kbseed_core::config::EmbeddingsConfig,
) -> Result<EmbeddingConfig> {
    let provider = EmbeddingProviderType::from_name(&embeddings_config.provider)
        .ok_or_else(|| EmbeddingError::UnsupportedProvider(embeddings_config.provider.clone()))?;

    let mut config_builder = EmbeddingConfigBuilder::default()
        .provider(provider)
        .model(embeddings_config.model.clone())
        .texts_per_api_request(embeddings_config.texts_per_api_request)
        .embedding_dimension(embeddings_config.embedding_dimension);

    if let Some(ref api_base_url) = embeddings_config.api_base_url {
        config_builder = config_builder.api_base_url(api_base_url.clone());
    }

    let api_key = embeddings_config
        .api_key
        .clone()
        .or_else(|| std::env::var("EMBEDDING_API_KEY").ok());
    if let Some(key) = api_key {
        config_builder = config_builder.api_key(key);
    }

    Ok(config_builder.build())
}

/// Create the configured embedding provider
pub fn create_embedding_provider(config: EmbeddingConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    match config.provider() {
        EmbeddingProviderType::OpenAi => {
            let provider =
                create_api_provider(config).context("Failed to create embedding provider")?;
            Ok(Arc::from(provider))
        }
        #[cfg(any(test, feature = "placeholder"))]
        EmbeddingProviderType::Placeholder => {
            tracing::warn!("Using placeholder embeddings; vectors are random");
            Ok(Arc::new(PlaceholderEmbeddingProvider::new(
                config.embedding_dimension(),
            )))
        }
        #[cfg(not(any(test, feature = "placeholder")))]
        EmbeddingProviderType::Placeholder => Err(EmbeddingError::UnsupportedProvider(
            "placeholder (build with the `placeholder` feature)".to_string(),
        )
        .into()),
    }
}

/// Create an embedding provider from the application config
pub fn create_embedding_provider_from_app_config(
    embeddings_config: &kbseed_core::config::EmbeddingsConfig,
) -> Result<Arc<dyn EmbeddingProvider>> {
    create_embedding_provider(embedding_config_from_app_config(embeddings_config)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kbseed_core::config::EmbeddingsConfig;
    use serial_test::serial;

    fn app_config(provider: &str, api_key: Option<&str>) -> EmbeddingsConfig {
        EmbeddingsConfig {
            provider: provider.to_string(),
            model: "test-model".to_string(),
            api_base_url: Some("http://localhost:8000/v1".to_string()),
            api_key: api_key.map(str::to_string),
            embedding_dimension: 16,
            texts_per_api_request: 4,
        }
    }

    #[test]
    #[serial(env)]
    fn test_embedding_api_key_resolution() {
        std::env::set_var("EMBEDDING_API_KEY", "env-api-key");
        let from_env = embedding_config_from_app_config(&app_config("openai", None)).unwrap();
        let from_config =
            embedding_config_from_app_config(&app_config("openai", Some("config-api-key")))
                .unwrap();
        std::env::remove_var("EMBEDDING_API_KEY");

        assert_eq!(from_env.api_key.as_deref(), Some("env-api-key"));
        // Config takes precedence over the environment
        assert_eq!(from_config.api_key.as_deref(), Some("config-api-key"));
    }

    #[test]
    #[serial(env)]
    fn test_unknown_provider_is_config_error() {
        let result = embedding_config_from_app_config(&app_config("jina", None));
        assert!(matches!(result, Err(kbseed_core::Error::Config(_))));
    }

    #[tokio::test]
    #[serial(env)]
    async fn test_placeholder_provider_from_app_config() {
        let provider =
            create_embedding_provider_from_app_config(&app_config("placeholder", None)).unwrap();
        assert_eq!(provider.embedding_dimension(), 16);
        assert_eq!(provider.embed("hello").await.unwrap().len(), 16);
    }

    #[test]
    #[serial(env)]
    fn test_openai_provider_construction_is_offline() {
        let provider =
            create_embedding_provider_from_app_config(&app_config("openai", None)).unwrap();
        assert_eq!(provider.model_name(), "test-model");
    }
}
