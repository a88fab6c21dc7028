//! Collection provisioning: create, index, load and seed a collection
//!
//! Every run is strictly sequential and is not transactional. A failure part
//! way through leaves the collection absent or partially built, and is
//! reported as [`Error::Provisioning`] tagged with the lifecycle state the
//! collection had reached.

use crate::{CollectionDescription, SearchHit, SearchRequest, VectorStore};
use kbseed_core::{
    error::{Error, Result},
    lifecycle::{CollectionLifecycle, CollectionState},
    record::KnowledgeRecord,
    schema::{CollectionSpec, IndexSpec, Row},
};
use kbseed_embeddings::EmbeddingProvider;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default IVF clusters probed per search
const DEFAULT_NPROBE: i64 = 10;

/// Provisions knowledge-base collections on a [`VectorStore`]
pub struct CollectionProvisioner {
    store: Arc<dyn VectorStore>,
    nprobe: i64,
}

/// Outcome of seeding a collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedReport {
    /// Rows inserted and flushed
    pub inserted: usize,
    /// Length of every inserted vector
    pub dimension: usize,
    /// Embedding model that produced the vectors
    pub model: String,
}

/// Existence and contents of a collection as seen by the store
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionStatus {
    pub description: CollectionDescription,
    pub row_count: u64,
}

impl CollectionProvisioner {
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self {
            store,
            nprobe: DEFAULT_NPROBE,
        }
    }

    /// Set the IVF clusters probed by handle searches
    pub fn with_nprobe(mut self, nprobe: i64) -> Self {
        self.nprobe = nprobe;
        self
    }

    fn handle(&self, spec: &CollectionSpec, index: &IndexSpec) -> CollectionHandle {
        CollectionHandle {
            store: Arc::clone(&self.store),
            spec: spec.clone(),
            index: index.clone(),
            nprobe: self.nprobe,
        }
    }

    /// Drop any collection named `spec.name` and create it afresh
    ///
    /// **All data in an existing collection of the same name is lost.** The
    /// returned handle points at an empty, indexed and loaded collection.
    /// `spec` and `index` are validated before the store is touched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Provisioning`] carrying the lifecycle state reached and
    /// the underlying schema, index or connection error.
    pub async fn replace_collection(
        &self,
        spec: &CollectionSpec,
        index: &IndexSpec,
    ) -> Result<CollectionHandle> {
        let mut lifecycle = CollectionLifecycle::new(&spec.name);

        match self.run_replace(&mut lifecycle, spec, index).await {
            Ok(()) => {
                info!(
                    collection = %spec.name,
                    index_type = %index.index_type,
                    metric = %index.metric,
                    "Collection created, indexed and loaded"
                );
                Ok(self.handle(spec, index))
            }
            Err(e) => Err(lifecycle.fail(e)),
        }
    }

    async fn run_replace(
        &self,
        lifecycle: &mut CollectionLifecycle,
        spec: &CollectionSpec,
        index: &IndexSpec,
    ) -> Result<()> {
        spec.validate()?;
        index.validate_against(spec)?;

        if self.store.has_collection(&spec.name).await? {
            warn!(collection = %spec.name, "Dropping existing collection; its data is lost");
            self.store.drop_collection(&spec.name).await?;
        }

        self.build(lifecycle, spec, index).await
    }

    /// ABSENT -> CREATING -> INDEXED -> LOADED
    async fn build(
        &self,
        lifecycle: &mut CollectionLifecycle,
        spec: &CollectionSpec,
        index: &IndexSpec,
    ) -> Result<()> {
        lifecycle.transition(CollectionState::Creating)?;
        info!(
            collection = %spec.name,
            fields = spec.fields.len(),
            shards = spec.shard_count,
            "Creating collection"
        );
        self.store.create_collection(spec).await?;
        self.store.create_index(&spec.name, index).await?;
        lifecycle.transition(CollectionState::Indexed)?;

        self.store.load_collection(&spec.name).await?;
        lifecycle.transition(CollectionState::Loaded)
    }

    /// Create the collection if it is absent, otherwise reuse it
    ///
    /// Existing data is kept. An existing collection whose fields or index
    /// differ from the requested ones is left untouched and reported as a
    /// schema error.
    pub async fn ensure_collection(
        &self,
        spec: &CollectionSpec,
        index: &IndexSpec,
    ) -> Result<CollectionHandle> {
        let mut lifecycle = CollectionLifecycle::new(&spec.name);

        match self.run_ensure(&mut lifecycle, spec, index).await {
            Ok(()) => Ok(self.handle(spec, index)),
            Err(e) => Err(lifecycle.fail(e)),
        }
    }

    async fn run_ensure(
        &self,
        lifecycle: &mut CollectionLifecycle,
        spec: &CollectionSpec,
        index: &IndexSpec,
    ) -> Result<()> {
        spec.validate()?;
        index.validate_against(spec)?;

        if !self.store.has_collection(&spec.name).await? {
            info!(collection = %spec.name, "Collection does not exist, creating it");
            return self.build(lifecycle, spec, index).await;
        }

        let existing = self.store.describe_collection(&spec.name).await?;
        if !existing.matches(spec, index) {
            return Err(Error::schema(format!(
                "Collection '{}' exists with a different schema or index; \
                 replace it to apply the requested layout",
                spec.name
            )));
        }

        // Step the lifecycle through the states the existing collection has
        // already passed
        lifecycle.transition(CollectionState::Creating)?;
        lifecycle.transition(CollectionState::Indexed)?;
        if !existing.loaded {
            debug!(collection = %spec.name, "Loading existing collection");
            self.store.load_collection(&spec.name).await?;
        }
        lifecycle.transition(CollectionState::Loaded)?;

        info!(collection = %spec.name, "Reusing existing collection");
        Ok(())
    }

    /// Drop `name` if it exists, returning whether anything was dropped
    pub async fn drop_collection(&self, name: &str) -> Result<bool> {
        if !self.store.has_collection(name).await? {
            debug!(collection = name, "Nothing to drop");
            return Ok(false);
        }

        self.store.drop_collection(name).await?;
        info!(collection = name, "Collection dropped");
        Ok(true)
    }

    /// Describe `name` and count its rows, or `None` if it does not exist
    pub async fn collection_status(&self, name: &str) -> Result<Option<CollectionStatus>> {
        if !self.store.has_collection(name).await? {
            return Ok(None);
        }

        let description = self.store.describe_collection(name).await?;
        let row_count = self.store.count(name).await?;
        Ok(Some(CollectionStatus {
            description,
            row_count,
        }))
    }

    /// Embed `records`, insert them into `handle` and flush
    ///
    /// Rows are validated against the collection schema before anything is
    /// inserted. Empty input is a no-op. Partially inserted data is not
    /// rolled back on failure.
    pub async fn seed_sample_data(
        &self,
        handle: &CollectionHandle,
        records: &[KnowledgeRecord],
        embedder: &dyn EmbeddingProvider,
    ) -> Result<SeedReport> {
        let dimension = handle.spec.vector_dim().unwrap_or(0);
        let report = SeedReport {
            inserted: 0,
            dimension,
            model: embedder.model_name().to_string(),
        };

        if records.is_empty() {
            debug!(collection = %handle.name(), "No records to seed");
            return Ok(report);
        }

        if embedder.embedding_dimension() != dimension {
            return Err(Error::InvalidDimensions {
                expected: dimension,
                actual: embedder.embedding_dimension(),
            });
        }

        info!(
            collection = %handle.name(),
            records = records.len(),
            model = %report.model,
            "Embedding records"
        );
        let contents: Vec<String> = records.iter().map(|r| r.content.clone()).collect();
        let embeddings = embedder.embed_batch(contents).await?;

        if embeddings.len() != records.len() {
            return Err(Error::embedding(format!(
                "Expected {} embeddings, got {}",
                records.len(),
                embeddings.len()
            )));
        }

        let rows: Vec<Row> = records
            .iter()
            .zip(embeddings)
            .map(|(record, embedding)| record.to_row(embedding))
            .collect();

        let inserted = handle.insert(&rows).await?;
        handle.flush().await?;

        info!(collection = %handle.name(), inserted, "Seeded sample records");
        Ok(SeedReport { inserted, ..report })
    }
}

/// A provisioned, loaded collection
#[derive(Clone)]
pub struct CollectionHandle {
    store: Arc<dyn VectorStore>,
    spec: CollectionSpec,
    index: IndexSpec,
    nprobe: i64,
}

impl std::fmt::Debug for CollectionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionHandle")
            .field("spec", &self.spec)
            .field("index", &self.index)
            .field("nprobe", &self.nprobe)
            .finish()
    }
}

impl CollectionHandle {
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn spec(&self) -> &CollectionSpec {
        &self.spec
    }

    pub fn index(&self) -> &IndexSpec {
        &self.index
    }

    /// Validate every row against the schema, then insert them all
    ///
    /// # Errors
    ///
    /// A row that does not fit the schema fails the whole call with a schema
    /// error (or [`Error::InvalidDimensions`]) before anything is inserted.
    pub async fn insert(&self, rows: &[Row]) -> Result<usize> {
        for row in rows {
            self.spec.validate_row(row)?;
        }
        self.store.insert(&self.spec.name, rows).await
    }

    pub async fn flush(&self) -> Result<()> {
        self.store.flush(&self.spec.name).await
    }

    /// Number of flushed rows
    pub async fn count(&self) -> Result<u64> {
        self.store.count(&self.spec.name).await
    }

    pub async fn describe(&self) -> Result<CollectionDescription> {
        self.store.describe_collection(&self.spec.name).await
    }

    /// Nearest neighbours of `vector`, closest first
    pub async fn search(&self, vector: Vec<f32>, limit: usize) -> Result<Vec<SearchHit>> {
        let dim = self.spec.vector_dim().unwrap_or(0);
        if vector.len() != dim {
            return Err(Error::InvalidDimensions {
                expected: dim,
                actual: vector.len(),
            });
        }

        let request = SearchRequest {
            vector,
            anns_field: self.index.field.clone(),
            limit,
            metric: self.index.metric,
            nprobe: self.nprobe,
            output_fields: self.spec.output_fields(),
        };
        self.store.search(&self.spec.name, &request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryVectorStore;
    use kbseed_core::schema::MetricType;

    fn knowledge_base(dim: usize) -> (CollectionSpec, IndexSpec) {
        (
            CollectionSpec::knowledge_base("kb", dim, 2),
            IndexSpec::knowledge_base(MetricType::Cosine, 16),
        )
    }

    fn stage_of(err: &Error) -> Option<CollectionState> {
        match err {
            Error::Provisioning { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    #[tokio::test]
    async fn test_invalid_index_fails_before_store_is_touched() {
        let store = InMemoryVectorStore::new();
        let provisioner = CollectionProvisioner::new(Arc::new(store.clone()));
        let (spec, _) = knowledge_base(4);
        let index = IndexSpec::knowledge_base(MetricType::Cosine, 0);

        let err = provisioner
            .replace_collection(&spec, &index)
            .await
            .unwrap_err();
        assert_eq!(stage_of(&err), Some(CollectionState::Absent));
        assert!(store.collection_names().is_empty());
    }

    #[tokio::test]
    async fn test_index_rejection_is_tagged_creating() {
        let store = InMemoryVectorStore::new();
        store.reject_operation("create_index", "out of resources");
        let provisioner = CollectionProvisioner::new(Arc::new(store.clone()));
        let (spec, index) = knowledge_base(4);

        let err = provisioner
            .replace_collection(&spec, &index)
            .await
            .unwrap_err();
        assert_eq!(stage_of(&err), Some(CollectionState::Creating));
        assert!(err.to_string().contains("failed while CREATING"));
        // Not transactional: the bare collection stays behind
        assert_eq!(store.collection_names(), vec!["kb".to_string()]);
    }

    #[tokio::test]
    async fn test_load_rejection_is_tagged_indexed() {
        let store = InMemoryVectorStore::new();
        store.reject_operation("load_collection", "query node unavailable");
        let provisioner = CollectionProvisioner::new(Arc::new(store));
        let (spec, index) = knowledge_base(4);

        let err = provisioner
            .replace_collection(&spec, &index)
            .await
            .unwrap_err();
        assert_eq!(stage_of(&err), Some(CollectionState::Indexed));
    }

    #[tokio::test]
    async fn test_drop_collection_reports_whether_anything_was_dropped() {
        let provisioner = CollectionProvisioner::new(Arc::new(InMemoryVectorStore::new()));
        let (spec, index) = knowledge_base(4);

        assert!(!provisioner.drop_collection("kb").await.unwrap());
        provisioner.replace_collection(&spec, &index).await.unwrap();
        assert!(provisioner.drop_collection("kb").await.unwrap());
        assert!(provisioner.collection_status("kb").await.unwrap().is_none());
    }
}
