//! Relational store connectivity check
//!
//! Only connectivity is verified; no tables are created or read.

use kbseed_core::{
    config::RelationalConfig,
    error::{Error, Result},
};
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use std::time::Duration;
use tracing::info;

/// Connection to the MySQL store backing the wider system
pub struct RelationalStore {
    pool: MySqlPool,
}

impl RelationalStore {
    /// Connection options for `config`
    pub fn connect_options(config: &RelationalConfig) -> MySqlConnectOptions {
        let mut options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .database(&config.database)
            .charset(&config.charset);

        if let Some(ref password) = config.password {
            options = options.password(password);
        }

        options
    }

    /// Open a single-connection pool and verify it with `SELECT 1`
    pub async fn connect(config: &RelationalConfig) -> Result<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_millis(config.timeout_ms))
            .connect_with(Self::connect_options(config))
            .await
            .map_err(|e| {
                Error::connection(format!(
                    "Failed to connect to MySQL at {}:{}/{}: {e}",
                    config.host, config.port, config.database
                ))
            })?;

        let store = Self { pool };
        store.ping().await?;

        info!(
            host = %config.host,
            port = config.port,
            database = %config.database,
            "Relational store connection verified"
        );
        Ok(store)
    }

    /// Run `SELECT 1` on the pool
    pub async fn ping(&self) -> Result<()> {
        let one: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::connection(format!("MySQL health check failed: {e}")))?;

        if one != 1 {
            return Err(Error::connection(format!(
                "MySQL health check returned {one}"
            )));
        }
        Ok(())
    }

    /// Close the pool
    pub async fn close(self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_options_carry_config() {
        let config = RelationalConfig {
            host: "db.internal".to_string(),
            port: 3307,
            database: "smart_transportation".to_string(),
            password: Some("secret".to_string()),
            ..Default::default()
        };

        let options = RelationalStore::connect_options(&config);
        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 3307);
        assert_eq!(options.get_database(), Some("smart_transportation"));
        assert_eq!(options.get_username(), "root");
        assert_eq!(options.get_charset(), "utf8mb4");
    }

    #[tokio::test]
    async fn test_connect_failure_is_connection_error() {
        let config = RelationalConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            timeout_ms: 500,
            ..Default::default()
        };

        let err = RelationalStore::connect(&config).await.err();
        assert!(matches!(err, Some(Error::Connection(_))));
    }

    #[tokio::test]
    #[ignore] // Requires a MySQL server configured through MYSQL_* variables
    async fn test_live_mysql_connection() {
        let config = kbseed_core::Config::load(None).unwrap().relational;
        let store = RelationalStore::connect(&config).await.unwrap();
        store.ping().await.unwrap();
        store.close().await;
    }
}
