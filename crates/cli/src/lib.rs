//! Library interface for the kbseed CLI
//!
//! The command implementations live here so they can be exercised without a
//! terminal; main.rs only parses arguments, prompts and prints.

pub mod storage_init;

use kbseed_core::sample_records;
use kbseed_storage::{CollectionHandle, CollectionStatus, SeedReport};
use std::sync::Arc;
use tracing::info;

// Re-export commonly needed types for tests
pub use anyhow::Result;
pub use kbseed_core::config::Config;
pub use std::path::Path;

use anyhow::Context;
use storage_init::{collection_layout, connect_provisioner, verify_relational_store};

/// Outcome of a `provision` run
#[derive(Debug, Clone)]
pub struct ProvisionSummary {
    pub collection: String,
    /// `None` when seeding was skipped
    pub seed: Option<SeedReport>,
    pub row_count: u64,
}

/// Helper function to create an embedding provider from configuration
pub fn create_embedding_provider(
    config: &Config,
) -> Result<Arc<dyn kbseed_embeddings::EmbeddingProvider>> {
    kbseed_embeddings::create_embedding_provider_from_app_config(&config.embeddings)
        .map_err(Into::into)
}

/// Replace the collection and optionally seed the sample records
///
/// **Destroys any existing collection of the configured name.** Callers are
/// responsible for confirming this with the user.
pub async fn provision(config: &Config, seed: bool) -> Result<ProvisionSummary> {
    verify_relational_store(&config.relational).await?;

    // Build the embedder before touching the collection so a bad provider
    // setting cannot leave an empty collection behind
    let embedder = if seed {
        Some(create_embedding_provider(config).context("Failed to create embedding provider")?)
    } else {
        None
    };

    let provisioner = connect_provisioner(config).await?;
    let (spec, index) = collection_layout(config)?;

    let handle = provisioner
        .replace_collection(&spec, &index)
        .await
        .context("Failed to provision collection")?;

    let seed = match embedder {
        Some(embedder) => Some(
            provisioner
                .seed_sample_data(&handle, &sample_records(), embedder.as_ref())
                .await
                .context("Failed to seed sample data")?,
        ),
        None => {
            info!("Seeding skipped");
            None
        }
    };

    let row_count = handle.count().await.context("Failed to count rows")?;
    Ok(ProvisionSummary {
        collection: handle.name().to_string(),
        seed,
        row_count,
    })
}

/// Create the collection if it is missing, keeping existing data
pub async fn ensure(config: &Config) -> Result<CollectionHandle> {
    verify_relational_store(&config.relational).await?;
    let provisioner = connect_provisioner(config).await?;
    let (spec, index) = collection_layout(config)?;

    provisioner
        .ensure_collection(&spec, &index)
        .await
        .context("Failed to ensure collection")
}

/// Drop the configured collection, returning whether it existed
pub async fn drop_collection(config: &Config) -> Result<bool> {
    let provisioner = connect_provisioner(config).await?;
    provisioner
        .drop_collection(&config.collection.name)
        .await
        .with_context(|| format!("Failed to drop collection '{}'", config.collection.name))
}

/// Describe the configured collection, or `None` if it does not exist
pub async fn status(config: &Config) -> Result<Option<CollectionStatus>> {
    let provisioner = connect_provisioner(config).await?;
    provisioner
        .collection_status(&config.collection.name)
        .await
        .context("Failed to read collection status")
}
