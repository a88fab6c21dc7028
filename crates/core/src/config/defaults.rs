//! Default values and functions for configuration

// Default constants
pub(crate) const DEFAULT_MYSQL_HOST: &str = "localhost";
pub(crate) const DEFAULT_MYSQL_USER: &str = "root";
pub(crate) const DEFAULT_MYSQL_DATABASE: &str = "smart_transportation";
pub(crate) const DEFAULT_MYSQL_CHARSET: &str = "utf8mb4";
pub(crate) const DEFAULT_VECTOR_STORE_PROVIDER: &str = "milvus";
pub(crate) const DEFAULT_MILVUS_HOST: &str = "localhost";
pub(crate) const DEFAULT_CONNECTION_ALIAS: &str = "default";
pub(crate) const DEFAULT_MILVUS_DATABASE: &str = "default";
pub(crate) const DEFAULT_COLLECTION_NAME: &str = "knowledge_base";
pub(crate) const DEFAULT_INDEX_TYPE: &str = "IVF_FLAT";
pub(crate) const DEFAULT_METRIC: &str = "COSINE";
pub(crate) const DEFAULT_EMBEDDING_PROVIDER: &str = "openai";
pub(crate) const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub(crate) const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1";

/// Dimension produced by the embedding model used across the system
pub const DEFAULT_VECTOR_DIMENSION: usize = 1536;

pub(crate) fn default_true() -> bool {
    true
}

pub(crate) fn default_mysql_host() -> String {
    DEFAULT_MYSQL_HOST.to_string()
}

pub(crate) fn default_mysql_port() -> u16 {
    3306
}

pub(crate) fn default_mysql_user() -> String {
    DEFAULT_MYSQL_USER.to_string()
}

pub(crate) fn default_mysql_database() -> String {
    DEFAULT_MYSQL_DATABASE.to_string()
}

pub(crate) fn default_mysql_charset() -> String {
    DEFAULT_MYSQL_CHARSET.to_string()
}

pub(crate) fn default_connect_timeout_ms() -> u64 {
    10000
}

pub(crate) fn default_vector_store_provider() -> String {
    DEFAULT_VECTOR_STORE_PROVIDER.to_string()
}

pub(crate) fn default_milvus_host() -> String {
    DEFAULT_MILVUS_HOST.to_string()
}

pub(crate) fn default_milvus_port() -> u16 {
    19530
}

pub(crate) fn default_connection_alias() -> String {
    DEFAULT_CONNECTION_ALIAS.to_string()
}

pub(crate) fn default_milvus_database() -> String {
    DEFAULT_MILVUS_DATABASE.to_string()
}

pub(crate) fn default_vector_store_timeout_ms() -> u64 {
    30000
}

pub(crate) fn default_collection_name() -> String {
    DEFAULT_COLLECTION_NAME.to_string()
}

pub(crate) fn default_vector_dimension() -> usize {
    DEFAULT_VECTOR_DIMENSION
}

pub(crate) fn default_shard_count() -> u32 {
    2
}

pub(crate) fn default_index_type() -> String {
    DEFAULT_INDEX_TYPE.to_string()
}

pub(crate) fn default_metric() -> String {
    DEFAULT_METRIC.to_string()
}

pub(crate) fn default_nlist() -> i64 {
    128
}

pub(crate) fn default_nprobe() -> i64 {
    10
}

pub(crate) fn default_embedding_provider() -> String {
    DEFAULT_EMBEDDING_PROVIDER.to_string()
}

pub(crate) fn default_embedding_model() -> String {
    DEFAULT_EMBEDDING_MODEL.to_string()
}

pub(crate) fn default_api_base_url() -> Option<String> {
    Some(DEFAULT_API_BASE_URL.to_string())
}

pub(crate) fn default_texts_per_api_request() -> usize {
    16
}
