//! Milvus RESTful (v2) HTTP client
//!
//! Every call is a `POST /v2/vectordb/<endpoint>` with a JSON body. Replies use
//! the envelope `{ "code": 0, "message": "...", "data": ... }`, where a non-zero
//! code is a store-side rejection even when the HTTP status is 200.

use crate::error::StorageError;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

const API_PREFIX: &str = "/v2/vectordb";

/// Reply envelope shared by all endpoints
#[derive(Debug, Deserialize)]
struct Envelope {
    code: i64,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Value,
}

/// Low-level client bound to one Milvus database
#[derive(Clone)]
pub(crate) struct MilvusClient {
    http: Client,
    base_url: String,
    token: Option<String>,
    database: String,
    alias: String,
    timeout_ms: u64,
}

impl MilvusClient {
    pub(crate) fn new(
        base_url: String,
        token: Option<String>,
        database: String,
        alias: String,
        timeout_ms: u64,
    ) -> Result<Self, StorageError> {
        let http = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| StorageError::InvalidConfig(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            database,
            alias,
            timeout_ms,
        })
    }

    pub(crate) fn alias(&self) -> &str {
        &self.alias
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Call `endpoint` and decode the envelope's `data` as `T`
    ///
    /// The configured database is added to the body as `dbName`.
    pub(crate) async fn call<B, T>(&self, endpoint: &str, body: &B) -> Result<T, StorageError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut body = serde_json::to_value(body)
            .map_err(|e| StorageError::SerializationError(format!("{endpoint}: {e}")))?;
        if let Value::Object(ref mut map) = body {
            map.entry("dbName")
                .or_insert_with(|| Value::String(self.database.clone()));
        }

        let url = format!("{}{API_PREFIX}/{endpoint}", self.base_url);
        debug!(alias = %self.alias, endpoint, "Milvus request");

        let mut request = self.http.post(&url).json(&body);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                StorageError::Timeout(self.timeout_ms)
            } else {
                StorageError::ConnectionFailed(format!("{url}: {e}"))
            }
        })?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| StorageError::ConnectionFailed(format!("{url}: {e}")))?;

        let envelope: Envelope = serde_json::from_slice(&bytes).map_err(|e| {
            if status.is_success() {
                StorageError::SerializationError(format!("{endpoint}: invalid reply: {e}"))
            } else {
                StorageError::ConnectionFailed(format!("{url} returned HTTP {status}"))
            }
        })?;

        if envelope.code != 0 {
            let message = envelope.message.unwrap_or_default();
            warn!(
                alias = %self.alias,
                endpoint,
                code = envelope.code,
                "Milvus rejected request: {message}"
            );
            return Err(StorageError::Rejected {
                code: envelope.code,
                message,
            });
        }

        serde_json::from_value(envelope.data)
            .map_err(|e| StorageError::SerializationError(format!("{endpoint}: {e}")))
    }
}
