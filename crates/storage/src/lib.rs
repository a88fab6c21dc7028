#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod error;
mod factory;
mod memory;
mod milvus;
mod provisioner;
mod relational;

// Export factory functions
pub use factory::{create_and_check_vector_store, create_vector_store};
pub use memory::InMemoryVectorStore;
pub use milvus::{MilvusStore, MilvusStoreBuilder};
pub use provisioner::{CollectionHandle, CollectionProvisioner, CollectionStatus, SeedReport};
pub use relational::RelationalStore;

use async_trait::async_trait;
use kbseed_core::{
    error::Result,
    schema::{CollectionSpec, FieldValue, IndexSpec, MetricType, Row},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==== Traits ====

/// Operations a vector store must offer to host a provisioned collection
///
/// Implementations map store-side rejections onto the matching core error
/// (`Schema` for collection creation, `Index` for index builds, `Insertion`
/// for writes) and transport failures onto `Connection`.
#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn has_collection(&self, name: &str) -> Result<bool>;

    /// Drop the collection and all of its data
    async fn drop_collection(&self, name: &str) -> Result<()>;

    async fn create_collection(&self, spec: &CollectionSpec) -> Result<()>;

    async fn create_index(&self, collection: &str, index: &IndexSpec) -> Result<()>;

    /// Make the collection queryable, returning once it is fully loaded
    async fn load_collection(&self, name: &str) -> Result<()>;

    async fn describe_collection(&self, name: &str) -> Result<CollectionDescription>;

    /// Insert rows, returning how many the store accepted
    async fn insert(&self, collection: &str, rows: &[Row]) -> Result<usize>;

    /// Make buffered writes durable and visible to `count`
    async fn flush(&self, collection: &str) -> Result<()>;

    /// Number of flushed rows
    async fn count(&self, collection: &str) -> Result<u64>;

    async fn search(&self, collection: &str, request: &SearchRequest) -> Result<Vec<SearchHit>>;

    /// Health check for the storage backend
    async fn health_check(&self) -> Result<()>;
}

// ==== Models ====

/// What a store reports about an existing collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionDescription {
    pub spec: CollectionSpec,
    pub index: Option<IndexSpec>,
    pub loaded: bool,
}

impl CollectionDescription {
    /// Whether this collection has the requested fields and index
    ///
    /// Shard count is not compared. Index parameters are only compared when
    /// the store reports them.
    pub fn matches(&self, spec: &CollectionSpec, index: &IndexSpec) -> bool {
        if self.spec.name != spec.name || self.spec.fields != spec.fields {
            return false;
        }

        match &self.index {
            Some(existing) => {
                existing.field == index.field
                    && existing.index_type == index.index_type
                    && existing.metric == index.metric
                    && (existing.params.is_empty() || existing.params == index.params)
            }
            None => false,
        }
    }
}

/// A nearest-neighbour query
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub vector: Vec<f32>,
    /// Vector field to search
    pub anns_field: String,
    pub limit: usize,
    /// Metric the collection's index was built with
    pub metric: MetricType,
    /// IVF clusters to probe
    pub nprobe: i64,
    pub output_fields: Vec<String>,
}

/// A single search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: i64,
    /// Raw metric value: similarity for COSINE and IP, distance for L2
    pub score: f32,
    pub fields: BTreeMap<String, FieldValue>,
}

impl SearchHit {
    /// Distance under `metric`, where smaller means closer
    ///
    /// For COSINE this is `1 - similarity`.
    pub fn distance(&self, metric: MetricType) -> f32 {
        match metric {
            MetricType::Cosine => 1.0 - self.score,
            MetricType::Ip => -self.score,
            MetricType::L2 => self.score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kbseed_core::schema::IndexType;

    fn description() -> CollectionDescription {
        CollectionDescription {
            spec: CollectionSpec::knowledge_base("kb", 4, 2),
            index: Some(IndexSpec::knowledge_base(MetricType::Cosine, 128)),
            loaded: true,
        }
    }

    #[test]
    fn test_description_matches_same_layout() {
        let desc = description();
        assert!(desc.matches(
            &CollectionSpec::knowledge_base("kb", 4, 1),
            &IndexSpec::knowledge_base(MetricType::Cosine, 128)
        ));
    }

    #[test]
    fn test_description_detects_differences() {
        let desc = description();
        let index = IndexSpec::knowledge_base(MetricType::Cosine, 128);
        assert!(!desc.matches(&CollectionSpec::knowledge_base("kb", 8, 2), &index));
        assert!(!desc.matches(
            &CollectionSpec::knowledge_base("kb", 4, 2),
            &IndexSpec::knowledge_base(MetricType::L2, 128)
        ));
        assert!(!desc.matches(
            &CollectionSpec::knowledge_base("kb", 4, 2),
            &IndexSpec::knowledge_base(MetricType::Cosine, 256)
        ));
    }

    #[test]
    fn test_unreported_index_params_are_not_compared() {
        let mut desc = description();
        if let Some(index) = desc.index.as_mut() {
            index.params.clear();
        }
        assert!(desc.matches(
            &CollectionSpec::knowledge_base("kb", 4, 2),
            &IndexSpec::knowledge_base(MetricType::Cosine, 512)
        ));

        if let Some(index) = desc.index.as_mut() {
            index.index_type = IndexType::Flat;
        }
        assert!(!desc.matches(
            &CollectionSpec::knowledge_base("kb", 4, 2),
            &IndexSpec::knowledge_base(MetricType::Cosine, 512)
        ));
    }

    #[test]
    fn test_cosine_distance_is_one_minus_similarity() {
        let hit = SearchHit {
            id: 1,
            score: 0.75,
            fields: BTreeMap::new(),
        };
        assert!((hit.distance(MetricType::Cosine) - 0.25).abs() < f32::EPSILON);
        assert!((hit.distance(MetricType::L2) - 0.75).abs() < f32::EPSILON);
    }
}
