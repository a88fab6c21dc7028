use crate::{memory::InMemoryVectorStore, milvus::MilvusStoreBuilder, VectorStore};
use kbseed_core::{config::VectorStoreConfig, Error};
use std::sync::Arc;

/// Creates a vector store based on configuration.
///
/// This is the primary factory function for creating vector stores. It
/// returns a trait object that hides implementation details, allowing the
/// Milvus and in-memory backends to be used interchangeably.
///
/// # Arguments
/// * `config` - Vector store configuration specifying provider type and connection details
///
/// # Errors
/// Returns a configuration error for unknown providers
///
/// # Example
/// ```ignore
/// let store = create_vector_store(VectorStoreConfig::default())?;
/// ```
pub fn create_vector_store(config: VectorStoreConfig) -> Result<Arc<dyn VectorStore>, Error> {
    match config.provider.as_str() {
        "milvus" => {
            let store = MilvusStoreBuilder::from_config(config).build()?;
            Ok(Arc::new(store) as Arc<dyn VectorStore>)
        }
        "memory" => Ok(Arc::new(InMemoryVectorStore::new()) as Arc<dyn VectorStore>),
        other => Err(Error::config(format!(
            "Unknown vector store provider '{other}'"
        ))),
    }
}

/// Creates a vector store and verifies it is reachable.
///
/// Equivalent to calling `create_vector_store()` followed by
/// `health_check()`.
///
/// # Errors
/// Returns an error if the store cannot be created or does not answer
pub async fn create_and_check_vector_store(
    config: VectorStoreConfig,
) -> Result<Arc<dyn VectorStore>, Error> {
    let alias = config.alias.clone();
    let store = create_vector_store(config)?;
    store.health_check().await?;
    tracing::info!(alias = %alias, "Vector store is reachable");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_provider_is_rejected() {
        let config = VectorStoreConfig {
            provider: "qdrant".to_string(),
            ..Default::default()
        };
        let result = create_vector_store(config);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_memory_provider_is_always_healthy() {
        let config = VectorStoreConfig {
            provider: "memory".to_string(),
            ..Default::default()
        };
        let store = create_and_check_vector_store(config).await.unwrap();
        assert!(!store.has_collection("knowledge_base").await.unwrap());
    }

    #[test]
    fn test_milvus_provider_builds_offline() {
        assert!(create_vector_store(VectorStoreConfig::default()).is_ok());
    }
}
