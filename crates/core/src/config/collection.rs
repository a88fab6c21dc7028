//! Collection-related configuration methods

use crate::error::Result;
use crate::schema::{CollectionSpec, IndexSpec, IndexType, VECTOR_FIELD};
use std::collections::BTreeMap;

use super::CollectionConfig;

impl CollectionConfig {
    /// Build the knowledge-base collection layout from this configuration
    pub fn collection_spec(&self) -> CollectionSpec {
        CollectionSpec::knowledge_base(&self.name, self.dimension, self.shard_count)
    }

    /// Build the vector index description from this configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the index type or metric name is not
    /// recognised.
    pub fn index_spec(&self) -> Result<IndexSpec> {
        let index_type = self.parsed_index_type()?;
        let metric = self.parsed_metric()?;

        let params = match index_type {
            IndexType::IvfFlat => BTreeMap::from([("nlist".to_string(), self.nlist)]),
            IndexType::Flat => BTreeMap::new(),
        };

        Ok(IndexSpec {
            field: VECTOR_FIELD.to_string(),
            index_type,
            metric,
            params,
        })
    }
}
