//! In-memory vector store for tests and dry runs
//!
//! Honours the same contract as a real store: schemas and rows are enforced,
//! inserts stay invisible to `count` until `flush`, and search requires the
//! collection to be indexed and loaded. Search is a brute-force scan.

use crate::{error::StorageError, CollectionDescription, SearchHit, SearchRequest, VectorStore};
use async_trait::async_trait;
use kbseed_core::{
    error::{Error, Result},
    schema::{CollectionSpec, FieldValue, IndexSpec, MetricType, Row},
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Status code used for injected rejections
const REJECTED_CODE: i64 = 65535;

#[derive(Debug, Clone)]
struct MemoryCollection {
    spec: CollectionSpec,
    index: Option<IndexSpec>,
    loaded: bool,
    /// Flushed rows, keyed by generated id
    rows: Vec<(i64, Row)>,
    /// Inserted but not yet flushed
    pending: Vec<(i64, Row)>,
}

impl MemoryCollection {
    fn new(spec: CollectionSpec) -> Self {
        Self {
            spec,
            index: None,
            loaded: false,
            rows: Vec::new(),
            pending: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
struct MemoryData {
    collections: HashMap<String, MemoryCollection>,
    /// operation name -> rejection message
    rejections: HashMap<String, String>,
    next_id: i64,
}

impl MemoryData {
    fn collection(&self, name: &str) -> Result<&MemoryCollection> {
        self.collections
            .get(name)
            .ok_or_else(|| StorageError::CollectionNotFound(name.to_string()).into())
    }

    fn collection_mut(&mut self, name: &str) -> Result<&mut MemoryCollection> {
        self.collections
            .get_mut(name)
            .ok_or_else(|| StorageError::CollectionNotFound(name.to_string()).into())
    }

    /// Fail `operation` if a rejection was registered for it
    fn check_rejection(&self, operation: &str, rejected: fn(String) -> Error) -> Result<()> {
        match self.rejections.get(operation) {
            Some(message) => Err(StorageError::Rejected {
                code: REJECTED_CODE,
                message: message.clone(),
            }
            .into_core(rejected)),
            None => Ok(()),
        }
    }
}

/// Vector store kept entirely in process memory
#[derive(Clone, Default)]
pub struct InMemoryVectorStore {
    data: Arc<Mutex<MemoryData>>,
}

impl InMemoryVectorStore {
    /// Create a new, empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn data(&self) -> MutexGuard<'_, MemoryData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every later call of `operation` fail as a store-side rejection
    ///
    /// Operation names match the [`VectorStore`] method names, e.g.
    /// `"create_index"`.
    pub fn reject_operation(&self, operation: impl Into<String>, message: impl Into<String>) {
        self.data()
            .rejections
            .insert(operation.into(), message.into());
    }

    /// Names of all collections currently held
    pub fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.data().collections.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of inserted rows not yet flushed
    pub fn pending_count(&self, collection: &str) -> usize {
        self.data()
            .collections
            .get(collection)
            .map_or(0, |c| c.pending.len())
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn score(metric: MetricType, query: &[f32], vector: &[f32]) -> f32 {
    match metric {
        MetricType::Cosine => {
            let norms = dot(query, query).sqrt() * dot(vector, vector).sqrt();
            if norms == 0.0 {
                0.0
            } else {
                dot(query, vector) / norms
            }
        }
        MetricType::Ip => dot(query, vector),
        // Squared euclidean distance, as reported by Milvus
        MetricType::L2 => query.iter().zip(vector).map(|(x, y)| (x - y) * (x - y)).sum(),
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn has_collection(&self, name: &str) -> Result<bool> {
        let data = self.data();
        data.check_rejection("has_collection", Error::connection)?;
        Ok(data.collections.contains_key(name))
    }

    async fn drop_collection(&self, name: &str) -> Result<()> {
        let mut data = self.data();
        data.check_rejection("drop_collection", Error::connection)?;
        if data.collections.remove(name).is_some() {
            debug!(collection = name, "Dropped in-memory collection");
        }
        Ok(())
    }

    async fn create_collection(&self, spec: &CollectionSpec) -> Result<()> {
        let mut data = self.data();
        data.check_rejection("create_collection", Error::schema)?;
        spec.validate()?;

        if data.collections.contains_key(&spec.name) {
            return Err(Error::schema(format!(
                "Collection '{}' already exists",
                spec.name
            )));
        }

        data.collections
            .insert(spec.name.clone(), MemoryCollection::new(spec.clone()));
        Ok(())
    }

    async fn create_index(&self, collection: &str, index: &IndexSpec) -> Result<()> {
        let mut data = self.data();
        data.check_rejection("create_index", Error::index)?;
        let target = data.collection_mut(collection)?;
        index.validate_against(&target.spec)?;

        match &target.index {
            Some(existing) if existing != index => Err(Error::index(format!(
                "Collection '{collection}' already has a different index on '{}'",
                existing.field
            ))),
            _ => {
                target.index = Some(index.clone());
                Ok(())
            }
        }
    }

    async fn load_collection(&self, name: &str) -> Result<()> {
        let mut data = self.data();
        data.check_rejection("load_collection", Error::connection)?;
        let target = data.collection_mut(name)?;
        if target.index.is_none() {
            return Err(Error::index(format!(
                "Collection '{name}' has no vector index and cannot be loaded"
            )));
        }
        target.loaded = true;
        Ok(())
    }

    async fn describe_collection(&self, name: &str) -> Result<CollectionDescription> {
        let data = self.data();
        data.check_rejection("describe_collection", Error::connection)?;
        let target = data.collection(name)?;
        Ok(CollectionDescription {
            spec: target.spec.clone(),
            index: target.index.clone(),
            loaded: target.loaded,
        })
    }

    async fn insert(&self, collection: &str, rows: &[Row]) -> Result<usize> {
        let mut data = self.data();
        data.check_rejection("insert", Error::insertion)?;
        let spec = data.collection(collection)?.spec.clone();
        for row in rows {
            spec.validate_row(row)?;
        }

        let first_id = data.next_id + 1;
        data.next_id += rows.len() as i64;
        let target = data.collection_mut(collection)?;
        target.pending.extend(
            rows.iter()
                .cloned()
                .enumerate()
                .map(|(offset, row)| (first_id + offset as i64, row)),
        );
        Ok(rows.len())
    }

    async fn flush(&self, collection: &str) -> Result<()> {
        let mut data = self.data();
        data.check_rejection("flush", Error::insertion)?;
        let target = data.collection_mut(collection)?;
        let pending = std::mem::take(&mut target.pending);
        target.rows.extend(pending);
        Ok(())
    }

    async fn count(&self, collection: &str) -> Result<u64> {
        let data = self.data();
        data.check_rejection("count", Error::connection)?;
        Ok(data.collection(collection)?.rows.len() as u64)
    }

    async fn search(&self, collection: &str, request: &SearchRequest) -> Result<Vec<SearchHit>> {
        let data = self.data();
        data.check_rejection("search", Error::connection)?;
        let target = data.collection(collection)?;

        if !target.loaded {
            return Err(StorageError::NotLoaded(collection.to_string()).into());
        }

        let dim = target.spec.vector_dim().unwrap_or(0);
        if request.vector.len() != dim {
            return Err(Error::InvalidDimensions {
                expected: dim,
                actual: request.vector.len(),
            });
        }

        let mut hits: Vec<SearchHit> = target
            .rows
            .iter()
            .chain(target.pending.iter())
            .filter_map(|(id, row)| {
                let vector = row.get(&request.anns_field)?.as_vector()?;
                let fields = request
                    .output_fields
                    .iter()
                    .filter_map(|name| row.get(name).map(|v| (name.clone(), v.clone())))
                    .collect::<std::collections::BTreeMap<String, FieldValue>>();
                Some(SearchHit {
                    id: *id,
                    score: score(request.metric, &request.vector, vector),
                    fields,
                })
            })
            .collect();

        if request.metric.higher_is_closer() {
            hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        } else {
            hits.sort_by(|a, b| a.score.total_cmp(&b.score));
        }
        hits.truncate(request.limit);
        Ok(hits)
    }

    async fn health_check(&self) -> Result<()> {
        self.data()
            .check_rejection("health_check", Error::connection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kbseed_core::schema::{CATEGORY_FIELD, VECTOR_FIELD};
    use kbseed_core::KnowledgeRecord;

    async fn loaded_store(dim: usize) -> InMemoryVectorStore {
        let store = InMemoryVectorStore::new();
        store
            .create_collection(&CollectionSpec::knowledge_base("kb", dim, 2))
            .await
            .unwrap();
        store
            .create_index("kb", &IndexSpec::knowledge_base(MetricType::Cosine, 8))
            .await
            .unwrap();
        store.load_collection("kb").await.unwrap();
        store
    }

    fn row(vector: Vec<f32>, category: &str) -> Row {
        KnowledgeRecord::new("content", category, "title").to_row(vector)
    }

    fn request(vector: Vec<f32>, limit: usize) -> SearchRequest {
        SearchRequest {
            vector,
            anns_field: VECTOR_FIELD.to_string(),
            limit,
            metric: MetricType::Cosine,
            nprobe: 1,
            output_fields: vec![CATEGORY_FIELD.to_string()],
        }
    }

    #[tokio::test]
    async fn test_rows_are_counted_only_after_flush() {
        let store = loaded_store(2).await;
        store
            .insert("kb", &[row(vec![1.0, 0.0], "a"), row(vec![0.0, 1.0], "b")])
            .await
            .unwrap();
        assert_eq!(store.count("kb").await.unwrap(), 0);
        assert_eq!(store.pending_count("kb"), 2);

        store.flush("kb").await.unwrap();
        assert_eq!(store.count("kb").await.unwrap(), 2);
        assert_eq!(store.pending_count("kb"), 0);
    }

    #[tokio::test]
    async fn test_insert_enforces_schema() {
        let store = loaded_store(2).await;
        let err = store
            .insert("kb", &[row(vec![1.0, 0.0, 0.0], "a")])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidDimensions {
                expected: 2,
                actual: 3
            }
        ));
        assert_eq!(store.pending_count("kb"), 0);
    }

    #[tokio::test]
    async fn test_search_ranks_by_cosine_similarity() {
        let store = loaded_store(2).await;
        store
            .insert(
                "kb",
                &[
                    row(vec![1.0, 0.0], "east"),
                    row(vec![0.0, 1.0], "north"),
                    row(vec![1.0, 1.0], "north-east"),
                ],
            )
            .await
            .unwrap();
        store.flush("kb").await.unwrap();

        let hits = store.search("kb", &request(vec![0.0, 2.0], 2)).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(
            hits[0].fields.get(CATEGORY_FIELD),
            Some(&FieldValue::VarChar("north".to_string()))
        );
        assert!(hits[0].distance(MetricType::Cosine).abs() < 1e-6);
        assert_eq!(
            hits[1].fields.get(CATEGORY_FIELD),
            Some(&FieldValue::VarChar("north-east".to_string()))
        );
    }

    #[tokio::test]
    async fn test_search_requires_loaded_collection() {
        let store = InMemoryVectorStore::new();
        store
            .create_collection(&CollectionSpec::knowledge_base("kb", 2, 2))
            .await
            .unwrap();
        assert!(store.search("kb", &request(vec![1.0, 0.0], 1)).await.is_err());
    }

    #[tokio::test]
    async fn test_load_requires_index() {
        let store = InMemoryVectorStore::new();
        store
            .create_collection(&CollectionSpec::knowledge_base("kb", 2, 2))
            .await
            .unwrap();
        let err = store.load_collection("kb").await.unwrap_err();
        assert!(matches!(err, Error::Index(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_existing_name() {
        let store = loaded_store(2).await;
        let err = store
            .create_collection(&CollectionSpec::knowledge_base("kb", 2, 2))
            .await
            .unwrap_err();
        assert!(err.is_schema_error());
    }

    #[tokio::test]
    async fn test_drop_missing_collection_is_noop() {
        let store = InMemoryVectorStore::new();
        store.drop_collection("missing").await.unwrap();
        assert!(!store.has_collection("missing").await.unwrap());
    }

    #[tokio::test]
    async fn test_injected_rejection_uses_operation_error() {
        let store = InMemoryVectorStore::new();
        store.reject_operation("create_index", "index build failed");
        store
            .create_collection(&CollectionSpec::knowledge_base("kb", 2, 2))
            .await
            .unwrap();
        let err = store
            .create_index("kb", &IndexSpec::knowledge_base(MetricType::Cosine, 8))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Index(msg) if msg.contains("index build failed")));
    }
}
