use super::{client::MilvusClient, MilvusStore};
use crate::VectorStore;
use kbseed_core::{config::VectorStoreConfig, Error};
use std::time::Duration;
use tracing::info;

/// Builder for MilvusStore
pub struct MilvusStoreBuilder {
    config: VectorStoreConfig,
    base_url: Option<String>,
    load_poll_interval: Duration,
}

impl MilvusStoreBuilder {
    /// Create a new builder with the given configuration
    pub fn from_config(config: VectorStoreConfig) -> Self {
        Self {
            config,
            base_url: None,
            load_poll_interval: Duration::from_millis(500),
        }
    }

    /// Set the host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the bearer token
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.token = Some(token.into());
        self
    }

    /// Set the database name
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.config.database = database.into();
        self
    }

    /// Set the timeout in milliseconds
    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.config.timeout_ms = ms;
        self
    }

    /// Use a full base URL instead of `http://host:port`
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set how often load progress is polled
    pub fn load_poll_interval(mut self, interval: Duration) -> Self {
        self.load_poll_interval = interval;
        self
    }

    /// Build the store without contacting the server
    pub fn build(self) -> Result<MilvusStore, Error> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| format!("http://{}:{}", self.config.host, self.config.port));

        let client = MilvusClient::new(
            base_url,
            self.config.token,
            self.config.database,
            self.config.alias,
            self.config.timeout_ms,
        )?;

        Ok(MilvusStore {
            client,
            load_poll_interval: self.load_poll_interval,
        })
    }

    /// Build and verify the connection is alive
    pub async fn connect(self) -> Result<MilvusStore, Error> {
        let store = self.build()?;
        store.health_check().await?;
        info!(
            alias = %store.client.alias(),
            url = %store.client.base_url(),
            "Connected to Milvus"
        );
        Ok(store)
    }
}
