//! Data calls: insert, flush, row count

use super::MilvusStore;
use kbseed_core::{
    error::{Error, Result},
    schema::Row,
};
use serde::{de::IgnoredAny, Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InsertRequest<'a> {
    collection_name: &'a str,
    data: &'a [Row],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsertData {
    insert_count: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatsData {
    row_count: u64,
}

impl MilvusStore {
    pub(super) async fn insert_rows(&self, collection: &str, rows: &[Row]) -> Result<usize> {
        if rows.is_empty() {
            return Ok(0);
        }

        let request = InsertRequest {
            collection_name: collection,
            data: rows,
        };

        let data: InsertData = self
            .client
            .call("entities/insert", &request)
            .await
            .map_err(|e| e.into_core(Error::Insertion))?;

        if data.insert_count != rows.len() {
            return Err(Error::insertion(format!(
                "Store accepted {} of {} rows for '{collection}'",
                data.insert_count,
                rows.len()
            )));
        }

        debug!(collection, rows = data.insert_count, "Inserted rows");
        Ok(data.insert_count)
    }

    pub(super) async fn flush_collection(&self, collection: &str) -> Result<()> {
        let _: IgnoredAny = self
            .client
            .call("collections/flush", &json!({ "collectionName": collection }))
            .await
            .map_err(|e| e.into_core(Error::Insertion))?;
        Ok(())
    }

    pub(super) async fn row_count(&self, collection: &str) -> Result<u64> {
        let data: StatsData = self
            .client
            .call(
                "collections/get_stats",
                &json!({ "collectionName": collection }),
            )
            .await?;
        Ok(data.row_count)
    }
}
