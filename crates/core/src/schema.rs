//! Collection schema and vector index data model
//!
//! [`CollectionSpec`] and [`IndexSpec`] describe the physical collection a
//! provisioning run creates. Both are validated locally before anything is
//! sent to a store, and [`CollectionSpec::validate_row`] is the single place
//! rows are checked against the schema.

use crate::error::{Error, Result};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use strum_macros::{Display, EnumString};

/// Primary key field of the knowledge-base schema
pub const ID_FIELD: &str = "id";
/// Vector field of the knowledge-base schema
pub const VECTOR_FIELD: &str = "embedding";
pub const CONTENT_FIELD: &str = "content";
pub const CATEGORY_FIELD: &str = "category";
pub const TITLE_FIELD: &str = "title";

/// Byte limits of the knowledge-base text fields
pub const CONTENT_MAX_LENGTH: usize = 65535;
pub const CATEGORY_MAX_LENGTH: usize = 100;
pub const TITLE_MAX_LENGTH: usize = 500;

/// Largest byte length a VarChar field may declare
pub const MAX_VARCHAR_LENGTH: usize = 65535;
/// Largest vector dimension a collection may declare
pub const MAX_VECTOR_DIM: usize = 32768;
/// Valid range for the IVF `nlist` cluster count
pub const NLIST_RANGE: std::ops::RangeInclusive<i64> = 1..=65536;

/// Storage type of a single field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DataType {
    Int64 { primary_key: bool, auto_id: bool },
    FloatVector { dim: usize },
    VarChar { max_length: usize },
}

/// A named, typed field of a collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,
    #[serde(flatten)]
    pub data_type: DataType,
}

impl FieldSchema {
    /// Auto-generated 64-bit integer primary key
    pub fn auto_id_primary_key(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: DataType::Int64 {
                primary_key: true,
                auto_id: true,
            },
        }
    }

    pub fn float_vector(name: impl Into<String>, dim: usize) -> Self {
        Self {
            name: name.into(),
            data_type: DataType::FloatVector { dim },
        }
    }

    pub fn varchar(name: impl Into<String>, max_length: usize) -> Self {
        Self {
            name: name.into(),
            data_type: DataType::VarChar { max_length },
        }
    }

    pub fn is_primary_key(&self) -> bool {
        matches!(
            self.data_type,
            DataType::Int64 {
                primary_key: true,
                ..
            }
        )
    }

    pub fn is_auto_id(&self) -> bool {
        matches!(self.data_type, DataType::Int64 { auto_id: true, .. })
    }

    pub fn is_vector(&self) -> bool {
        matches!(self.data_type, DataType::FloatVector { .. })
    }
}

/// Description of the collection to create
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(setter(into))]
pub struct CollectionSpec {
    /// Collection name, unique within the store
    pub name: String,

    /// Ordered field layout
    pub fields: Vec<FieldSchema>,

    /// Store-side shard count, passed through unchanged
    #[builder(default = "2")]
    pub shard_count: u32,
}

impl CollectionSpec {
    /// The knowledge-base layout: id, embedding[dim], content, category, title
    pub fn knowledge_base(name: impl Into<String>, dim: usize, shard_count: u32) -> Self {
        Self {
            name: name.into(),
            fields: vec![
                FieldSchema::auto_id_primary_key(ID_FIELD),
                FieldSchema::float_vector(VECTOR_FIELD, dim),
                FieldSchema::varchar(CONTENT_FIELD, CONTENT_MAX_LENGTH),
                FieldSchema::varchar(CATEGORY_FIELD, CATEGORY_MAX_LENGTH),
                FieldSchema::varchar(TITLE_FIELD, TITLE_MAX_LENGTH),
            ],
            shard_count,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn primary_field(&self) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.is_primary_key())
    }

    pub fn vector_field(&self) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.is_vector())
    }

    /// Dimension of the vector field, if the schema has one
    pub fn vector_dim(&self) -> Option<usize> {
        self.fields.iter().find_map(|f| match f.data_type {
            DataType::FloatVector { dim } => Some(dim),
            _ => None,
        })
    }

    /// Names of the scalar fields returned alongside search hits
    pub fn output_fields(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|f| !f.is_vector() && !f.is_primary_key())
            .map(|f| f.name.clone())
            .collect()
    }

    /// Check the structural rules every collection must satisfy
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::schema("Collection name cannot be empty"));
        }

        if self.shard_count == 0 {
            return Err(Error::schema(format!(
                "Collection '{}' must have at least one shard",
                self.name
            )));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.name.trim().is_empty() {
                return Err(Error::schema("Field name cannot be empty"));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(Error::schema(format!(
                    "Duplicate field '{}' in collection '{}'",
                    field.name, self.name
                )));
            }

            match field.data_type {
                DataType::FloatVector { dim } if dim == 0 || dim > MAX_VECTOR_DIM => {
                    return Err(Error::schema(format!(
                        "Vector field '{}' has dimension {dim}, must be between 1 and {MAX_VECTOR_DIM}",
                        field.name
                    )));
                }
                DataType::VarChar { max_length }
                    if max_length == 0 || max_length > MAX_VARCHAR_LENGTH =>
                {
                    return Err(Error::schema(format!(
                        "Text field '{}' has max length {max_length}, must be between 1 and {MAX_VARCHAR_LENGTH}",
                        field.name
                    )));
                }
                DataType::Int64 {
                    primary_key: false,
                    auto_id: true,
                } => {
                    return Err(Error::schema(format!(
                        "Field '{}' is auto-generated but not a primary key",
                        field.name
                    )));
                }
                _ => {}
            }
        }

        let primary_keys = self.fields.iter().filter(|f| f.is_primary_key()).count();
        if primary_keys != 1 {
            return Err(Error::schema(format!(
                "Collection '{}' must have exactly one primary key field, found {primary_keys}",
                self.name
            )));
        }

        let vectors = self.fields.iter().filter(|f| f.is_vector()).count();
        if vectors != 1 {
            return Err(Error::schema(format!(
                "Collection '{}' must have exactly one vector field, found {vectors}",
                self.name
            )));
        }

        Ok(())
    }

    /// Check a row against this schema
    ///
    /// Auto-generated keys must be absent, every other field present, and
    /// vectors exactly `dim` long. Text limits are measured in UTF-8 bytes.
    pub fn validate_row(&self, row: &Row) -> Result<()> {
        for (name, value) in row {
            let field = self.field(name).ok_or_else(|| {
                Error::schema(format!(
                    "Unknown field '{name}' for collection '{}'",
                    self.name
                ))
            })?;

            match (&field.data_type, value) {
                (DataType::Int64 { auto_id: true, .. }, _) => {
                    return Err(Error::schema(format!(
                        "Field '{name}' is auto-generated and must not be supplied"
                    )));
                }
                (DataType::Int64 { .. }, FieldValue::Int64(_)) => {}
                (DataType::FloatVector { dim }, FieldValue::FloatVector(vector)) => {
                    if vector.len() != *dim {
                        return Err(Error::InvalidDimensions {
                            expected: *dim,
                            actual: vector.len(),
                        });
                    }
                }
                (DataType::VarChar { max_length }, FieldValue::VarChar(text)) => {
                    if text.len() > *max_length {
                        return Err(Error::schema(format!(
                            "Field '{name}' is {} bytes, exceeds max length {max_length}",
                            text.len()
                        )));
                    }
                }
                (expected, actual) => {
                    return Err(Error::schema(format!(
                        "Field '{name}' expects {expected:?}, got {} value",
                        actual.type_name()
                    )));
                }
            }
        }

        if let Some(missing) = self
            .fields
            .iter()
            .find(|f| !f.is_auto_id() && !row.contains_key(&f.name))
        {
            return Err(Error::schema(format!(
                "Missing value for field '{}'",
                missing.name
            )));
        }

        Ok(())
    }
}

/// Vector index algorithm
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum IndexType {
    #[strum(serialize = "FLAT")]
    #[serde(rename = "FLAT")]
    Flat,
    /// Inverted-file index with flat (unquantized) cluster storage
    #[strum(serialize = "IVF_FLAT")]
    #[serde(rename = "IVF_FLAT")]
    IvfFlat,
}

/// Distance function used to rank neighbours
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum MetricType {
    #[strum(serialize = "COSINE")]
    #[serde(rename = "COSINE")]
    Cosine,
    #[strum(serialize = "L2")]
    #[serde(rename = "L2")]
    L2,
    /// Inner product
    #[strum(serialize = "IP")]
    #[serde(rename = "IP")]
    Ip,
}

impl MetricType {
    /// Whether larger scores mean closer vectors
    pub fn higher_is_closer(self) -> bool {
        !matches!(self, MetricType::L2)
    }
}

/// Description of the vector index to build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSpec {
    /// Vector field the index covers
    pub field: String,
    pub index_type: IndexType,
    pub metric: MetricType,
    /// Algorithm tuning values, e.g. `nlist`
    #[serde(default)]
    pub params: BTreeMap<String, i64>,
}

impl IndexSpec {
    pub fn ivf_flat(field: impl Into<String>, metric: MetricType, nlist: i64) -> Self {
        Self {
            field: field.into(),
            index_type: IndexType::IvfFlat,
            metric,
            params: BTreeMap::from([("nlist".to_string(), nlist)]),
        }
    }

    /// IVF_FLAT on the knowledge-base vector field
    pub fn knowledge_base(metric: MetricType, nlist: i64) -> Self {
        Self::ivf_flat(VECTOR_FIELD, metric, nlist)
    }

    pub fn nlist(&self) -> Option<i64> {
        self.params.get("nlist").copied()
    }

    /// Check this index can be built on `spec`
    pub fn validate_against(&self, spec: &CollectionSpec) -> Result<()> {
        let field = spec.field(&self.field).ok_or_else(|| {
            Error::index(format!(
                "Index field '{}' does not exist in collection '{}'",
                self.field, spec.name
            ))
        })?;

        if !field.is_vector() {
            return Err(Error::index(format!(
                "Index field '{}' is not a vector field",
                self.field
            )));
        }

        if self.index_type == IndexType::IvfFlat {
            let nlist = self
                .nlist()
                .ok_or_else(|| Error::index("IVF_FLAT index requires an 'nlist' parameter"))?;
            if !NLIST_RANGE.contains(&nlist) {
                return Err(Error::index(format!(
                    "nlist {nlist} out of range [{}, {}]",
                    NLIST_RANGE.start(),
                    NLIST_RANGE.end()
                )));
            }
        }

        Ok(())
    }
}

/// A single value in a row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int64(i64),
    FloatVector(Vec<f32>),
    VarChar(String),
}

impl FieldValue {
    fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Int64(_) => "Int64",
            FieldValue::FloatVector(_) => "FloatVector",
            FieldValue::VarChar(_) => "VarChar",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::VarChar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&[f32]> {
        match self {
            FieldValue::FloatVector(v) => Some(v),
            _ => None,
        }
    }
}

/// Field name to value, ordered by field name
pub type Row = BTreeMap<String, FieldValue>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kb_spec() -> CollectionSpec {
        CollectionSpec::knowledge_base("knowledge_base", 4, 2)
    }

    fn kb_row(vector: Vec<f32>) -> Row {
        Row::from([
            (VECTOR_FIELD.to_string(), FieldValue::FloatVector(vector)),
            (
                CONTENT_FIELD.to_string(),
                FieldValue::VarChar("content".to_string()),
            ),
            (
                CATEGORY_FIELD.to_string(),
                FieldValue::VarChar("category".to_string()),
            ),
            (
                TITLE_FIELD.to_string(),
                FieldValue::VarChar("title".to_string()),
            ),
        ])
    }

    #[test]
    fn test_knowledge_base_layout() {
        let spec = CollectionSpec::knowledge_base("knowledge_base", 1536, 2);
        spec.validate().unwrap();

        let names: Vec<&str> = spec.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id", "embedding", "content", "category", "title"]);
        assert_eq!(spec.vector_dim(), Some(1536));
        assert_eq!(
            spec.field(TITLE_FIELD).map(|f| f.data_type),
            Some(DataType::VarChar { max_length: 500 })
        );
        assert_eq!(spec.output_fields(), vec!["content", "category", "title"]);
    }

    #[test]
    fn test_builder_defaults_shard_count() {
        let spec = CollectionSpecBuilder::default()
            .name("docs")
            .fields(vec![
                FieldSchema::auto_id_primary_key("pk"),
                FieldSchema::float_vector("vec", 8),
            ])
            .build()
            .unwrap();
        assert_eq!(spec.shard_count, 2);
        spec.validate().unwrap();
    }

    #[test]
    fn test_validate_requires_single_vector_field() {
        let mut spec = kb_spec();
        spec.fields.push(FieldSchema::float_vector("second", 4));
        let err = spec.validate().unwrap_err();
        assert!(err.to_string().contains("exactly one vector field"));

        spec.fields.retain(|f| !f.is_vector());
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_validate_requires_single_primary_key() {
        let mut spec = kb_spec();
        spec.fields.remove(0);
        let err = spec.validate().unwrap_err();
        assert!(err.to_string().contains("exactly one primary key"));
    }

    #[test]
    fn test_validate_rejects_zero_dimension_and_duplicates() {
        assert!(CollectionSpec::knowledge_base("kb", 0, 2).validate().is_err());

        let mut spec = kb_spec();
        spec.fields.push(FieldSchema::varchar(TITLE_FIELD, 10));
        assert!(spec.validate().unwrap_err().to_string().contains("Duplicate"));
    }

    #[test]
    fn test_validate_row_accepts_well_formed_row() {
        kb_spec()
            .validate_row(&kb_row(vec![0.1, 0.2, 0.3, 0.4]))
            .unwrap();
    }

    #[test]
    fn test_validate_row_rejects_wrong_dimension() {
        let err = kb_spec()
            .validate_row(&kb_row(vec![0.1, 0.2, 0.3]))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidDimensions {
                expected: 4,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_validate_row_measures_text_in_bytes() {
        let spec = kb_spec();
        let mut row = kb_row(vec![0.0; 4]);
        // 34 three-byte characters: 34 chars but 102 bytes
        row.insert(
            CATEGORY_FIELD.to_string(),
            FieldValue::VarChar("交".repeat(34)),
        );
        let err = spec.validate_row(&row).unwrap_err();
        assert!(err.to_string().contains("102 bytes"));
    }

    #[test]
    fn test_validate_row_rejects_supplied_auto_id_and_missing_fields() {
        let spec = kb_spec();

        let mut row = kb_row(vec![0.0; 4]);
        row.insert(ID_FIELD.to_string(), FieldValue::Int64(7));
        assert!(spec.validate_row(&row).is_err());

        let mut row = kb_row(vec![0.0; 4]);
        row.remove(TITLE_FIELD);
        let err = spec.validate_row(&row).unwrap_err();
        assert!(err.to_string().contains("Missing value for field 'title'"));

        let mut row = kb_row(vec![0.0; 4]);
        row.insert("extra".to_string(), FieldValue::Int64(1));
        assert!(spec.validate_row(&row).is_err());
    }

    #[test]
    fn test_index_validation() {
        let spec = kb_spec();
        IndexSpec::knowledge_base(MetricType::Cosine, 128)
            .validate_against(&spec)
            .unwrap();

        let on_text = IndexSpec::ivf_flat(CONTENT_FIELD, MetricType::Cosine, 128);
        assert!(on_text.validate_against(&spec).is_err());

        let bad_nlist = IndexSpec::knowledge_base(MetricType::Cosine, 0);
        assert!(bad_nlist.validate_against(&spec).is_err());

        let mut missing_nlist = IndexSpec::knowledge_base(MetricType::Cosine, 128);
        missing_nlist.params.clear();
        assert!(missing_nlist.validate_against(&spec).is_err());
    }

    #[test]
    fn test_index_and_metric_names() {
        assert_eq!(IndexType::IvfFlat.to_string(), "IVF_FLAT");
        assert_eq!("ivf_flat".parse::<IndexType>().unwrap(), IndexType::IvfFlat);
        assert_eq!("cosine".parse::<MetricType>().unwrap(), MetricType::Cosine);
        assert!(MetricType::Cosine.higher_is_closer());
        assert!(!MetricType::L2.higher_is_closer());
    }
}
