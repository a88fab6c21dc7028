//! Configuration loading from files and environment variables

use crate::error::{Error, Result};
use config::{Config as ConfigLib, ConfigBuilder as LibConfigBuilder, Environment, File, FileFormat};
use std::path::Path;

use super::{global_config_path, Config};

type Builder = LibConfigBuilder<config::builder::DefaultState>;

/// Apply `env_var` as an override of `key` when it is set
fn override_from_env(builder: Builder, env_var: &str, key: &str) -> Result<Builder> {
    match std::env::var(env_var) {
        Ok(value) => builder
            .set_override(key, value)
            .map_err(|e| Error::config(format!("Failed to set {env_var}: {e}"))),
        Err(_) => Ok(builder),
    }
}

/// Apply a numeric port override, ignoring values that do not parse
fn override_port_from_env(builder: Builder, env_var: &str, key: &str) -> Result<Builder> {
    match std::env::var(env_var).ok().and_then(|p| p.parse::<u16>().ok()) {
        Some(port) => builder
            .set_override(key, port)
            .map_err(|e| Error::config(format!("Failed to set {env_var}: {e}"))),
        None => Ok(builder),
    }
}

impl Config {
    /// Loads configuration from a TOML file with environment variable overrides
    ///
    /// Environment variables are prefixed with `KBSEED_` and use double underscores
    /// for nested values. For example:
    /// - `KBSEED_COLLECTION__NAME=knowledge_base`
    /// - `KBSEED_VECTOR_STORE__PORT=19530`
    ///
    /// The conventional `MYSQL_*` and `MILVUS_*` variables are honoured last.
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut builder = ConfigLib::builder();

        // Add the config file if it exists; it is TOML whatever its extension
        if path.exists() {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }

        // Add environment variables with KBSEED_ prefix
        builder = builder.add_source(
            Environment::with_prefix("KBSEED")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // Relational store credentials
        let builder = override_from_env(builder, "MYSQL_HOST", "relational.host")?;
        let builder = override_port_from_env(builder, "MYSQL_PORT", "relational.port")?;
        let builder = override_from_env(builder, "MYSQL_USER", "relational.user")?;
        let builder = override_from_env(builder, "MYSQL_PASSWORD", "relational.password")?;
        let builder = override_from_env(builder, "MYSQL_DATABASE", "relational.database")?;

        // Vector store connection
        let builder = override_from_env(builder, "MILVUS_HOST", "vector_store.host")?;
        let builder = override_port_from_env(builder, "MILVUS_PORT", "vector_store.port")?;
        let builder = override_from_env(builder, "MILVUS_TOKEN", "vector_store.token")?;

        let config = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| Error::config(format!("Failed to deserialize config: {e}")))
    }

    /// Creates a config from a TOML string (useful for testing)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from a single file
    ///
    /// Precedence (lowest to highest):
    /// 1. Hardcoded defaults
    /// 2. Config file (~/.kbseed/config.toml or custom --config path)
    /// 3. Environment variables (KBSEED_*, then MYSQL_* / MILVUS_*)
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let path = match config_path {
            Some(p) => p.to_path_buf(),
            None => global_config_path()?,
        };
        Self::from_file(&path)
    }
}
