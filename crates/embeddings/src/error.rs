//! Error types for the embeddings module

use std::fmt;

/// Errors that can occur during embedding operations
#[derive(Debug)]
pub enum EmbeddingError {
    /// The provider call failed
    InferenceError(String),

    /// The provider returned a vector of the wrong length
    DimensionMismatch { expected: usize, actual: usize },

    /// The provider returned a different number of vectors than requested
    CountMismatch { expected: usize, actual: usize },

    /// Text was empty or whitespace only
    EmptyInput,

    /// Unsupported provider
    UnsupportedProvider(String),

    /// Configuration error
    ConfigError(String),
}

impl fmt::Display for EmbeddingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InferenceError(msg) => write!(f, "Inference failed: {msg}"),
            Self::DimensionMismatch { expected, actual } => {
                write!(f, "Dimension mismatch: expected {expected}, got {actual}")
            }
            Self::CountMismatch { expected, actual } => {
                write!(f, "Expected {expected} embeddings, got {actual}")
            }
            Self::EmptyInput => write!(f, "Cannot embed empty text"),
            Self::UnsupportedProvider(provider) => {
                write!(f, "Unsupported embedding provider: {provider}")
            }
            Self::ConfigError(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for EmbeddingError {}

impl From<EmbeddingError> for kbseed_core::error::Error {
    fn from(err: EmbeddingError) -> Self {
        match err {
            EmbeddingError::ConfigError(msg) => kbseed_core::error::Error::Config(msg),
            EmbeddingError::UnsupportedProvider(_) => {
                kbseed_core::error::Error::Config(err.to_string())
            }
            other => kbseed_core::error::Error::Embedding(other.to_string()),
        }
    }
}
