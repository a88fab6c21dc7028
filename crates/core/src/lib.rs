//! Core types for the kbseed knowledge-base provisioner
//!
//! This crate provides the foundational abstractions shared by the other
//! kbseed crates, including:
//!
//! - **Schema**: Collection layout, vector index and row values
//! - **Lifecycle**: Provisioning states of a collection
//! - **Records**: Knowledge-base entries and the built-in sample set
//! - **Configuration**: System configuration management
//! - **Error handling**: Unified error types
//!

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod record;
pub mod schema;

// Re-export main types for convenience
pub use config::{CollectionConfig, Config, EmbeddingsConfig, RelationalConfig, VectorStoreConfig};
pub use error::{Error, Result, ResultExt};
pub use lifecycle::{CollectionLifecycle, CollectionState};
pub use record::{sample_records, KnowledgeRecord};
pub use schema::{
    CollectionSpec, CollectionSpecBuilder, DataType, FieldSchema, FieldValue, IndexSpec,
    IndexType, MetricType, Row,
};

/// Version of the core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
