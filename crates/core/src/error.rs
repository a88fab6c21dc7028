use crate::lifecycle::CollectionState;
use thiserror::Error;

/// Result type for kbseed operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for kbseed operations
#[derive(Error, Debug)]
pub enum Error {
    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A store (relational or vector) could not be reached
    #[error("Connection error: {0}")]
    Connection(String),

    /// Collection or field definition rejected
    #[error("Schema error: {0}")]
    Schema(String),

    /// Vector length does not match the collection's vector field
    #[error("Invalid vector dimensions: expected {expected}, got {actual}")]
    InvalidDimensions { expected: usize, actual: usize },

    /// Index build failure
    #[error("Index error: {0}")]
    Index(String),

    /// Write of records into a collection failed
    #[error("Insertion error: {0}")]
    Insertion(String),

    /// Embedding generation errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Failure while provisioning a collection, tagged with the lifecycle
    /// state the collection had reached
    #[error("Provisioning of collection '{collection}' failed while {stage}: {source}")]
    Provisioning {
        collection: String,
        stage: CollectionState,
        #[source]
        source: Box<Error>,
    },

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Any other error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Creates a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a connection error
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a schema error
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    /// Creates an index error
    pub fn index(msg: impl Into<String>) -> Self {
        Self::Index(msg.into())
    }

    /// Creates an insertion error
    pub fn insertion(msg: impl Into<String>) -> Self {
        Self::Insertion(msg.into())
    }

    /// Creates an embedding error
    pub fn embedding(msg: impl Into<String>) -> Self {
        Self::Embedding(msg.into())
    }

    /// Creates an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Wraps an error raised while provisioning `collection`
    pub fn provisioning(
        collection: impl Into<String>,
        stage: CollectionState,
        source: Error,
    ) -> Self {
        Self::Provisioning {
            collection: collection.into(),
            stage,
            source: Box::new(source),
        }
    }

    /// Adds context to any error
    pub fn with_context<E>(context: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::WithContext {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// True for errors caused by a schema or record validation failure,
    /// including ones wrapped in a provisioning error
    pub fn is_schema_error(&self) -> bool {
        match self {
            Self::Schema(_) | Self::InvalidDimensions { .. } => true,
            Self::Provisioning { source, .. } => source.is_schema_error(),
            _ => false,
        }
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::with_context(context, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provisioning_error_message_names_stage() {
        let err = Error::provisioning(
            "knowledge_base",
            CollectionState::Creating,
            Error::index("nlist out of range"),
        );
        assert_eq!(
            err.to_string(),
            "Provisioning of collection 'knowledge_base' failed while CREATING: Index error: nlist out of range"
        );
    }

    #[test]
    fn test_is_schema_error_sees_through_provisioning() {
        let err = Error::provisioning(
            "kb",
            CollectionState::Loaded,
            Error::InvalidDimensions {
                expected: 1536,
                actual: 3,
            },
        );
        assert!(err.is_schema_error());
        assert!(!Error::insertion("boom").is_schema_error());
    }
}
