//! Nearest-neighbour search

use super::MilvusStore;
use crate::{error::StorageError, SearchHit, SearchRequest};
use kbseed_core::{error::Result, schema::FieldValue};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchPayload<'a> {
    collection_name: &'a str,
    data: [&'a [f32]; 1],
    anns_field: &'a str,
    limit: usize,
    output_fields: &'a [String],
    search_params: Value,
}

/// Milvus reports int64 ids as numbers, or as strings when they exceed the
/// JSON safe-integer range
fn parse_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn hit_from_entity(
    mut entity: Map<String, Value>,
) -> std::result::Result<SearchHit, StorageError> {
    let id = entity
        .remove("id")
        .as_ref()
        .and_then(parse_id)
        .ok_or_else(|| StorageError::SerializationError("search hit without id".to_string()))?;
    let score = entity
        .remove("distance")
        .and_then(|d| d.as_f64())
        .ok_or_else(|| {
            StorageError::SerializationError("search hit without distance".to_string())
        })? as f32;

    let fields: BTreeMap<String, FieldValue> = entity
        .into_iter()
        .filter_map(|(name, value)| serde_json::from_value(value).ok().map(|v| (name, v)))
        .collect();

    Ok(SearchHit { id, score, fields })
}

impl MilvusStore {
    pub(super) async fn search_vectors(
        &self,
        collection: &str,
        request: &SearchRequest,
    ) -> Result<Vec<SearchHit>> {
        let payload = SearchPayload {
            collection_name: collection,
            data: [request.vector.as_slice()],
            anns_field: &request.anns_field,
            limit: request.limit,
            output_fields: &request.output_fields,
            search_params: json!({
                "metricType": request.metric.to_string(),
                "params": { "nprobe": request.nprobe },
            }),
        };

        let entities: Vec<Map<String, Value>> =
            self.client.call("entities/search", &payload).await?;

        let hits = entities
            .into_iter()
            .map(hit_from_entity)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(hits)
    }
}
