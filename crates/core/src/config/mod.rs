//! Configuration module for kbseed
//!
//! This module provides configuration structures and loading mechanisms for the
//! provisioner. Configuration can be loaded from TOML files and/or environment
//! variables; connection credentials never live in code.

mod collection;
mod defaults;
mod loading;


use crate::error::{Error, Result};
use crate::schema::{IndexType, MetricType, MAX_VECTOR_DIM, NLIST_RANGE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use defaults::DEFAULT_VECTOR_DIMENSION;

use defaults::*;

/// Vector store providers understood by the storage factory
pub const VECTOR_STORE_PROVIDERS: [&str; 2] = ["milvus", "memory"];

/// Embedding providers understood by the embeddings factory
pub const EMBEDDING_PROVIDERS: [&str; 2] = ["openai", "placeholder"];

/// Largest shard count a collection may request
pub const MAX_SHARD_COUNT: u32 = 16;

/// Returns the path to the global configuration file
///
/// The global config is stored at `~/.kbseed/config.toml`.
pub fn global_config_path() -> Result<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| Error::config("Unable to determine home directory".to_string()))?;
    Ok(home_dir.join(".kbseed").join("config.toml"))
}

/// Main configuration structure for kbseed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Relational store connection
    #[serde(default)]
    pub relational: RelationalConfig,

    /// Vector store connection
    #[serde(default)]
    pub vector_store: VectorStoreConfig,

    /// Collection layout and index
    #[serde(default)]
    pub collection: CollectionConfig,

    /// Embeddings configuration
    #[serde(default)]
    pub embeddings: EmbeddingsConfig,
}

/// MySQL connection settings
///
/// Only connectivity is checked; no schema is managed.
#[derive(Clone, Serialize, Deserialize)]
pub struct RelationalConfig {
    /// Skip the connectivity check entirely when false
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_mysql_host")]
    pub host: String,

    #[serde(default = "default_mysql_port")]
    pub port: u16,

    #[serde(default = "default_mysql_user")]
    pub user: String,

    /// Password (or use the MYSQL_PASSWORD env var)
    #[serde(default)]
    pub password: Option<String>,

    #[serde(default = "default_mysql_database")]
    pub database: String,

    #[serde(default = "default_mysql_charset")]
    pub charset: String,

    /// Connect timeout in milliseconds
    #[serde(default = "default_connect_timeout_ms")]
    pub timeout_ms: u64,
}

impl std::fmt::Debug for RelationalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelationalConfig")
            .field("enabled", &self.enabled)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***REDACTED***"))
            .field("database", &self.database)
            .field("charset", &self.charset)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl Default for RelationalConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            host: default_mysql_host(),
            port: default_mysql_port(),
            user: default_mysql_user(),
            password: None,
            database: default_mysql_database(),
            charset: default_mysql_charset(),
            timeout_ms: default_connect_timeout_ms(),
        }
    }
}

/// Vector store connection settings
#[derive(Clone, Serialize, Deserialize)]
pub struct VectorStoreConfig {
    /// Provider type: "milvus" or "memory"
    #[serde(default = "default_vector_store_provider")]
    pub provider: String,

    #[serde(default = "default_milvus_host")]
    pub host: String,

    #[serde(default = "default_milvus_port")]
    pub port: u16,

    /// Name of this connection, used to label log output
    #[serde(default = "default_connection_alias")]
    pub alias: String,

    /// Bearer token, `user:password` or an API key (or use MILVUS_TOKEN)
    #[serde(default)]
    pub token: Option<String>,

    /// Database the collection lives in
    #[serde(default = "default_milvus_database")]
    pub database: String,

    /// Timeout in milliseconds for each store request
    #[serde(default = "default_vector_store_timeout_ms")]
    pub timeout_ms: u64,
}

impl std::fmt::Debug for VectorStoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorStoreConfig")
            .field("provider", &self.provider)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("alias", &self.alias)
            .field("token", &self.token.as_ref().map(|_| "***REDACTED***"))
            .field("database", &self.database)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            provider: default_vector_store_provider(),
            host: default_milvus_host(),
            port: default_milvus_port(),
            alias: default_connection_alias(),
            token: None,
            database: default_milvus_database(),
            timeout_ms: default_vector_store_timeout_ms(),
        }
    }
}

/// Layout and index of the knowledge-base collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    #[serde(default = "default_collection_name")]
    pub name: String,

    /// Vector dimension; must match the embedding model
    #[serde(default = "default_vector_dimension")]
    pub dimension: usize,

    #[serde(default = "default_shard_count")]
    pub shard_count: u32,

    /// Index algorithm: "IVF_FLAT" or "FLAT"
    #[serde(default = "default_index_type")]
    pub index_type: String,

    /// Metric: "COSINE", "L2" or "IP"; must match downstream queries
    #[serde(default = "default_metric")]
    pub metric: String,

    /// IVF cluster count
    #[serde(default = "default_nlist")]
    pub nlist: i64,

    /// IVF clusters probed per search
    #[serde(default = "default_nprobe")]
    pub nprobe: i64,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            name: default_collection_name(),
            dimension: default_vector_dimension(),
            shard_count: default_shard_count(),
            index_type: default_index_type(),
            metric: default_metric(),
            nlist: default_nlist(),
            nprobe: default_nprobe(),
        }
    }
}

/// Configuration for embeddings generation
///
/// # Providers
/// - `openai` (default): OpenAI-compatible `/embeddings` API
/// - `placeholder`: random vectors, only available in builds with the
///   `placeholder` feature of `kbseed-embeddings`
#[derive(Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    #[serde(default = "default_embedding_provider")]
    pub provider: String,

    #[serde(default = "default_embedding_model")]
    pub model: String,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: Option<String>,

    /// API key for authentication (or use the EMBEDDING_API_KEY env var)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Dimension the model produces
    #[serde(default = "default_vector_dimension")]
    pub embedding_dimension: usize,

    /// Number of texts sent in a single embedding API request
    #[serde(default = "default_texts_per_api_request")]
    pub texts_per_api_request: usize,
}

impl std::fmt::Debug for EmbeddingsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingsConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_base_url", &self.api_base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***REDACTED***"))
            .field("embedding_dimension", &self.embedding_dimension)
            .field("texts_per_api_request", &self.texts_per_api_request)
            .finish()
    }
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            model: default_embedding_model(),
            api_base_url: default_api_base_url(),
            api_key: None,
            embedding_dimension: default_vector_dimension(),
            texts_per_api_request: default_texts_per_api_request(),
        }
    }
}

impl Config {
    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        // Validate vector store
        if !VECTOR_STORE_PROVIDERS.contains(&self.vector_store.provider.as_str()) {
            return Err(Error::config(format!(
                "Invalid vector store provider '{}'. Must be one of: {:?}",
                self.vector_store.provider, VECTOR_STORE_PROVIDERS
            )));
        }

        if self.vector_store.port == 0 {
            return Err(Error::config(
                "vector_store.port must be greater than 0".to_string(),
            ));
        }

        // Validate relational store
        if self.relational.enabled {
            if self.relational.port == 0 {
                return Err(Error::config(
                    "relational.port must be greater than 0".to_string(),
                ));
            }
            if self.relational.charset.trim().is_empty() {
                return Err(Error::config(
                    "relational.charset cannot be empty".to_string(),
                ));
            }
        }

        // Validate collection layout
        if self.collection.name.trim().is_empty() {
            return Err(Error::config("collection.name cannot be empty".to_string()));
        }

        if self.collection.dimension == 0 || self.collection.dimension > MAX_VECTOR_DIM {
            return Err(Error::config(format!(
                "Invalid collection.dimension {}. Must be between 1 and {MAX_VECTOR_DIM}",
                self.collection.dimension
            )));
        }

        if self.collection.shard_count == 0 || self.collection.shard_count > MAX_SHARD_COUNT {
            return Err(Error::config(format!(
                "Invalid collection.shard_count {}. Must be between 1 and {MAX_SHARD_COUNT}",
                self.collection.shard_count
            )));
        }

        let index_type = self.collection.parsed_index_type()?;
        self.collection.parsed_metric()?;

        if index_type == IndexType::IvfFlat {
            if !NLIST_RANGE.contains(&self.collection.nlist) {
                return Err(Error::config(format!(
                    "Invalid collection.nlist {}. Must be between {} and {}",
                    self.collection.nlist,
                    NLIST_RANGE.start(),
                    NLIST_RANGE.end()
                )));
            }
            if self.collection.nprobe < 1 || self.collection.nprobe > self.collection.nlist {
                return Err(Error::config(format!(
                    "Invalid collection.nprobe {}. Must be between 1 and nlist ({})",
                    self.collection.nprobe, self.collection.nlist
                )));
            }
        }

        // Validate embeddings
        if !EMBEDDING_PROVIDERS.contains(&self.embeddings.provider.as_str()) {
            return Err(Error::config(format!(
                "Invalid embeddings provider '{}'. Must be one of: {:?}",
                self.embeddings.provider, EMBEDDING_PROVIDERS
            )));
        }

        if self.embeddings.texts_per_api_request == 0 {
            return Err(Error::config(
                "embeddings.texts_per_api_request must be greater than 0".to_string(),
            ));
        }

        // Producers and consumers of vectors must agree on the dimension
        if self.embeddings.embedding_dimension != self.collection.dimension {
            return Err(Error::config(format!(
                "embeddings.embedding_dimension ({}) does not match collection.dimension ({})",
                self.embeddings.embedding_dimension, self.collection.dimension
            )));
        }

        Ok(())
    }

    /// Saves the configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| Error::config(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, toml_string)
            .map_err(|e| Error::config(format!("Failed to write config file: {e}")))?;

        Ok(())
    }
}

impl CollectionConfig {
    pub fn parsed_index_type(&self) -> Result<IndexType> {
        self.index_type.parse().map_err(|_| {
            Error::config(format!(
                "Invalid collection.index_type '{}'. Must be one of: [\"IVF_FLAT\", \"FLAT\"]",
                self.index_type
            ))
        })
    }

    pub fn parsed_metric(&self) -> Result<MetricType> {
        self.metric.parse().map_err(|_| {
            Error::config(format!(
                "Invalid collection.metric '{}'. Must be one of: [\"COSINE\", \"L2\", \"IP\"]",
                self.metric
            ))
        })
    }
}
