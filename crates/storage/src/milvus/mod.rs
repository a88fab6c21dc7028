// Private module - only the store and its builder are exposed
mod builder;
mod client;
mod collections;
mod operations;
mod search;

pub use builder::MilvusStoreBuilder;

use crate::{CollectionDescription, SearchHit, SearchRequest, VectorStore};
use async_trait::async_trait;
use client::MilvusClient;
use kbseed_core::{
    error::Result,
    schema::{CollectionSpec, IndexSpec, Row},
};
use std::time::Duration;

/// Vector store backed by a Milvus server's RESTful API
pub struct MilvusStore {
    client: MilvusClient,
    load_poll_interval: Duration,
}

#[async_trait]
impl VectorStore for MilvusStore {
    async fn has_collection(&self, name: &str) -> Result<bool> {
        self.has(name).await
    }

    async fn drop_collection(&self, name: &str) -> Result<()> {
        self.remove(name).await
    }

    async fn create_collection(&self, spec: &CollectionSpec) -> Result<()> {
        self.create(spec).await
    }

    async fn create_index(&self, collection: &str, index: &IndexSpec) -> Result<()> {
        self.build_index(collection, index).await
    }

    async fn load_collection(&self, name: &str) -> Result<()> {
        self.load(name).await
    }

    async fn describe_collection(&self, name: &str) -> Result<CollectionDescription> {
        self.describe(name).await
    }

    async fn insert(&self, collection: &str, rows: &[Row]) -> Result<usize> {
        self.insert_rows(collection, rows).await
    }

    async fn flush(&self, collection: &str) -> Result<()> {
        self.flush_collection(collection).await
    }

    async fn count(&self, collection: &str) -> Result<u64> {
        self.row_count(collection).await
    }

    async fn search(&self, collection: &str, request: &SearchRequest) -> Result<Vec<SearchHit>> {
        self.search_vectors(collection, request).await
    }

    async fn health_check(&self) -> Result<()> {
        self.ping().await
    }
}
