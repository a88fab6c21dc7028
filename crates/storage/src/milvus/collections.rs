//! Collection lifecycle calls: existence, drop, create, index, load, describe

use super::MilvusStore;
use crate::{error::StorageError, CollectionDescription};
use kbseed_core::{
    error::{Error, Result},
    schema::{CollectionSpec, DataType, FieldSchema, IndexSpec, IndexType, MetricType},
};
use serde::{de::IgnoredAny, Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

const LOAD_STATE_LOADED: &str = "LoadStateLoaded";
const LOAD_STATE_NOT_EXIST: &str = "LoadStateNotExist";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateCollectionRequest<'a> {
    collection_name: &'a str,
    schema: SchemaPayload,
    params: CollectionParams,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SchemaPayload {
    auto_id: bool,
    enable_dynamic_field: bool,
    fields: Vec<FieldPayload>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FieldPayload {
    field_name: String,
    data_type: &'static str,
    is_primary: bool,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    element_type_params: BTreeMap<&'static str, Value>,
}

impl From<&FieldSchema> for FieldPayload {
    fn from(field: &FieldSchema) -> Self {
        let (data_type, element_type_params) = match field.data_type {
            DataType::Int64 { .. } => ("Int64", BTreeMap::new()),
            DataType::FloatVector { dim } => (
                "FloatVector",
                BTreeMap::from([("dim", Value::String(dim.to_string()))]),
            ),
            DataType::VarChar { max_length } => (
                "VarChar",
                BTreeMap::from([("max_length", json!(max_length))]),
            ),
        };

        Self {
            field_name: field.name.clone(),
            data_type,
            is_primary: field.is_primary_key(),
            element_type_params,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CollectionParams {
    shards_num: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateIndexRequest<'a> {
    collection_name: &'a str,
    index_params: Vec<IndexParamPayload>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IndexParamPayload {
    field_name: String,
    index_name: String,
    metric_type: String,
    index_type: String,
    params: BTreeMap<String, Value>,
}

impl From<&IndexSpec> for IndexParamPayload {
    fn from(index: &IndexSpec) -> Self {
        let mut params: BTreeMap<String, Value> = index
            .params
            .iter()
            .map(|(k, v)| (k.clone(), json!(v)))
            .collect();
        params.insert(
            "index_type".to_string(),
            Value::String(index.index_type.to_string()),
        );

        Self {
            field_name: index.field.clone(),
            index_name: index.field.clone(),
            metric_type: index.metric.to_string(),
            index_type: index.index_type.to_string(),
            params,
        }
    }
}

#[derive(Debug, Deserialize)]
struct HasCollectionData {
    has: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoadStateData {
    load_state: String,
    #[serde(default)]
    load_progress: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DescribeCollectionData {
    collection_name: String,
    #[serde(default)]
    auto_id: bool,
    #[serde(default)]
    shards_num: Option<u32>,
    #[serde(default)]
    fields: Vec<DescribedField>,
    #[serde(default)]
    indexes: Vec<DescribedIndexRef>,
    #[serde(default)]
    load: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DescribedField {
    name: String,
    #[serde(rename = "type")]
    data_type: String,
    #[serde(default)]
    primary_key: bool,
    #[serde(default)]
    auto_id: bool,
    #[serde(default)]
    params: Vec<KeyValue>,
}

#[derive(Debug, Deserialize)]
struct KeyValue {
    key: String,
    value: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DescribedIndexRef {
    field_name: String,
    index_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DescribedIndex {
    field_name: String,
    #[serde(default)]
    index_type: Option<String>,
    #[serde(default)]
    metric_type: Option<String>,
}

/// Read a numeric element parameter that Milvus may report as text
fn numeric_param(params: &[KeyValue], key: &str) -> Option<usize> {
    params
        .iter()
        .find(|kv| kv.key == key)
        .and_then(|kv| match &kv.value {
            Value::Number(n) => n.as_u64().map(|n| n as usize),
            Value::String(s) => s.parse().ok(),
            _ => None,
        })
}

fn field_from_description(
    field: &DescribedField,
    collection_auto_id: bool,
) -> Result<FieldSchema> {
    let data_type = match field.data_type.as_str() {
        "Int64" => DataType::Int64 {
            primary_key: field.primary_key,
            auto_id: field.auto_id || (field.primary_key && collection_auto_id),
        },
        "FloatVector" => DataType::FloatVector {
            dim: numeric_param(&field.params, "dim").ok_or_else(|| {
                Error::schema(format!("Vector field '{}' reports no dimension", field.name))
            })?,
        },
        "VarChar" => DataType::VarChar {
            max_length: numeric_param(&field.params, "max_length").ok_or_else(|| {
                Error::schema(format!("Text field '{}' reports no max length", field.name))
            })?,
        },
        other => {
            return Err(Error::schema(format!(
                "Field '{}' has unsupported type '{other}'",
                field.name
            )))
        }
    };

    Ok(FieldSchema {
        name: field.name.clone(),
        data_type,
    })
}

impl MilvusStore {
    pub(super) async fn has(&self, name: &str) -> Result<bool> {
        let data: HasCollectionData = self
            .client
            .call("collections/has", &json!({ "collectionName": name }))
            .await?;
        Ok(data.has)
    }

    pub(super) async fn remove(&self, name: &str) -> Result<()> {
        let _: IgnoredAny = self
            .client
            .call("collections/drop", &json!({ "collectionName": name }))
            .await?;
        info!(alias = %self.client.alias(), collection = name, "Dropped collection");
        Ok(())
    }

    pub(super) async fn create(&self, spec: &CollectionSpec) -> Result<()> {
        let request = CreateCollectionRequest {
            collection_name: &spec.name,
            schema: SchemaPayload {
                auto_id: spec.primary_field().is_some_and(|f| f.is_auto_id()),
                enable_dynamic_field: false,
                fields: spec.fields.iter().map(FieldPayload::from).collect(),
            },
            params: CollectionParams {
                shards_num: spec.shard_count,
            },
        };

        let _: IgnoredAny = self
            .client
            .call("collections/create", &request)
            .await
            .map_err(|e| e.into_core(Error::Schema))?;
        Ok(())
    }

    pub(super) async fn build_index(&self, collection: &str, index: &IndexSpec) -> Result<()> {
        let request = CreateIndexRequest {
            collection_name: collection,
            index_params: vec![IndexParamPayload::from(index)],
        };

        let _: IgnoredAny = self
            .client
            .call("indexes/create", &request)
            .await
            .map_err(|e| e.into_core(Error::Index))?;
        Ok(())
    }

    /// Request a load and wait until Milvus reports the collection loaded
    pub(super) async fn load(&self, name: &str) -> Result<()> {
        let _: IgnoredAny = self
            .client
            .call("collections/load", &json!({ "collectionName": name }))
            .await?;

        let deadline = Instant::now() + Duration::from_millis(self.client.timeout_ms());
        loop {
            let state: LoadStateData = self
                .client
                .call(
                    "collections/get_load_state",
                    &json!({ "collectionName": name }),
                )
                .await?;

            match state.load_state.as_str() {
                LOAD_STATE_LOADED => return Ok(()),
                LOAD_STATE_NOT_EXIST => {
                    return Err(StorageError::CollectionNotFound(name.to_string()).into())
                }
                other => {
                    debug!(
                        collection = name,
                        state = other,
                        progress = state.load_progress.unwrap_or(0),
                        "Waiting for collection to load"
                    );
                }
            }

            if Instant::now() >= deadline {
                return Err(StorageError::Timeout(self.client.timeout_ms()).into());
            }
            tokio::time::sleep(self.load_poll_interval).await;
        }
    }

    pub(super) async fn describe(&self, name: &str) -> Result<CollectionDescription> {
        let data: DescribeCollectionData = self
            .client
            .call("collections/describe", &json!({ "collectionName": name }))
            .await?;

        let fields = data
            .fields
            .iter()
            .map(|f| field_from_description(f, data.auto_id))
            .collect::<Result<Vec<_>>>()?;

        let index = match data.indexes.first() {
            Some(index_ref) => Some(self.describe_index(name, index_ref).await?),
            None => None,
        };

        Ok(CollectionDescription {
            spec: CollectionSpec {
                name: data.collection_name,
                fields,
                shard_count: data.shards_num.unwrap_or(1),
            },
            index,
            loaded: data.load.as_deref() == Some(LOAD_STATE_LOADED),
        })
    }

    async fn describe_index(
        &self,
        collection: &str,
        index_ref: &DescribedIndexRef,
    ) -> Result<IndexSpec> {
        let described: Vec<DescribedIndex> = self
            .client
            .call(
                "indexes/describe",
                &json!({ "collectionName": collection, "indexName": index_ref.index_name }),
            )
            .await?;

        let index = described
            .into_iter()
            .find(|i| i.field_name == index_ref.field_name)
            .ok_or_else(|| {
                Error::index(format!(
                    "Index '{}' on collection '{collection}' was not described",
                    index_ref.index_name
                ))
            })?;

        let index_type = index
            .index_type
            .as_deref()
            .and_then(|t| t.parse::<IndexType>().ok())
            .ok_or_else(|| {
                Error::index(format!(
                    "Index '{}' has unsupported type {:?}",
                    index_ref.index_name, index.index_type
                ))
            })?;
        let metric = index
            .metric_type
            .as_deref()
            .and_then(|m| m.parse::<MetricType>().ok())
            .ok_or_else(|| {
                Error::index(format!(
                    "Index '{}' has unsupported metric {:?}",
                    index_ref.index_name, index.metric_type
                ))
            })?;

        // Tuning parameters are not part of the REST description
        Ok(IndexSpec {
            field: index.field_name,
            index_type,
            metric,
            params: BTreeMap::new(),
        })
    }

    pub(super) async fn ping(&self) -> Result<()> {
        let _: IgnoredAny = self
            .client
            .call("collections/list", &json!({}))
            .await
            .map_err(|e| Error::connection(format!("Milvus health check failed: {e}")))?;
        Ok(())
    }
}
