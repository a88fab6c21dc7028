//! Storage initialization helpers for the CLI
//!
//! Connections are attempted once. Any failure aborts the run.

use anyhow::{Context, Result};
use kbseed_core::config::{Config, RelationalConfig};
use kbseed_core::{CollectionSpec, IndexSpec};
use kbseed_storage::{CollectionProvisioner, RelationalStore};
use std::path::Path;
use tracing::info;

/// Load and validate configuration
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = Config::load(config_path).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Verify the relational store answers, unless it is disabled
pub async fn verify_relational_store(config: &RelationalConfig) -> Result<()> {
    if !config.enabled {
        info!("Relational store check disabled, skipping");
        return Ok(());
    }

    let store = RelationalStore::connect(config)
        .await
        .context("Relational store is not reachable")?;
    store.close().await;
    Ok(())
}

/// Connect to the configured vector store and wrap it in a provisioner
pub async fn connect_provisioner(config: &Config) -> Result<CollectionProvisioner> {
    info!(
        provider = %config.vector_store.provider,
        alias = %config.vector_store.alias,
        "Connecting to vector store"
    );

    let store = kbseed_storage::create_and_check_vector_store(config.vector_store.clone())
        .await
        .context("Vector store is not reachable")?;

    Ok(CollectionProvisioner::new(store).with_nprobe(config.collection.nprobe))
}

/// Collection and index layout described by the configuration
pub fn collection_layout(config: &Config) -> Result<(CollectionSpec, IndexSpec)> {
    let spec = config.collection.collection_spec();
    let index = config
        .collection
        .index_spec()
        .context("Invalid index configuration")?;
    Ok((spec, index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kbseed_core::{IndexType, MetricType};

    #[test]
    fn test_default_layout_is_knowledge_base() {
        let (spec, index) = collection_layout(&Config::default()).unwrap();

        assert_eq!(spec.name, "knowledge_base");
        assert_eq!(spec.vector_dim(), Some(1536));
        assert_eq!(spec.shard_count, 2);
        assert_eq!(index.index_type, IndexType::IvfFlat);
        assert_eq!(index.metric, MetricType::Cosine);
        assert_eq!(index.nlist(), Some(128));
    }

    #[tokio::test]
    async fn test_disabled_relational_check_is_skipped() {
        let config = RelationalConfig {
            enabled: false,
            port: 1,
            ..Default::default()
        };
        assert!(verify_relational_store(&config).await.is_ok());
    }
}
