use kbseed_core::Error as CoreError;
use thiserror::Error;

/// Storage-specific error types
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Collection '{0}' is not loaded")]
    NotLoaded(String),

    /// The store answered with a non-zero status code
    #[error("Store rejected request ({code}): {message}")]
    Rejected { code: i64, message: String },

    #[error("Operation timeout after {0}ms")]
    Timeout(u64),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl StorageError {
    /// Convert into a core error, using `rejected` for store-side rejections
    ///
    /// Transport failures stay connection errors whatever the operation.
    pub(crate) fn into_core(self, rejected: fn(String) -> CoreError) -> CoreError {
        match self {
            Self::Rejected { .. } => rejected(self.to_string()),
            other => other.into(),
        }
    }
}

impl From<StorageError> for CoreError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::ConnectionFailed(_)
            | StorageError::Timeout(_)
            | StorageError::SerializationError(_) => CoreError::connection(err.to_string()),
            StorageError::CollectionNotFound(_) | StorageError::NotLoaded(_) => {
                CoreError::invalid_input(err.to_string())
            }
            StorageError::InvalidConfig(msg) => CoreError::config(msg),
            StorageError::Rejected { .. } => CoreError::Other(anyhow::anyhow!(err.to_string())),
        }
    }
}
