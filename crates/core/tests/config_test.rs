use kbseed_core::config::{Config, VectorStoreConfig};
use kbseed_core::schema::{CollectionSpecBuilder, FieldSchema};

#[test]
fn test_vector_store_config_defaults() {
    let config = VectorStoreConfig::default();
    assert_eq!(config.provider, "milvus");
    assert_eq!(config.host, "localhost");
    assert_eq!(config.port, 19530);
    assert_eq!(config.alias, "default");
    assert_eq!(config.database, "default");
    assert_eq!(config.timeout_ms, 30000);
    assert!(config.token.is_none());
}

#[test]
fn test_config_validation_vector_store_provider() {
    let mut config = Config::default();

    // Valid providers
    config.vector_store.provider = "milvus".to_string();
    assert!(config.validate().is_ok());

    config.vector_store.provider = "memory".to_string();
    assert!(config.validate().is_ok());

    // Invalid provider
    config.vector_store.provider = "invalid".to_string();
    let result = config.validate();
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("Invalid vector store provider"));
}

#[test]
fn test_config_validation_dimension() {
    let mut config = Config::default();

    for dim in [1, 768, 1536, 4096] {
        config.collection.dimension = dim;
        config.embeddings.embedding_dimension = dim;
        assert!(config.validate().is_ok(), "dimension {dim} should be valid");
    }

    config.collection.dimension = 0;
    config.embeddings.embedding_dimension = 0;
    let result = config.validate();
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("Invalid collection.dimension"));
}

#[test]
fn test_config_validation_embedding_provider() {
    let mut config = Config::default();

    config.embeddings.provider = "placeholder".to_string();
    assert!(config.validate().is_ok());

    config.embeddings.provider = "unknown".to_string();
    let result = config.validate();
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("Invalid embeddings provider"));
}

#[test]
fn test_metric_names_are_case_insensitive() {
    let mut config = Config::default();
    config.collection.metric = "cosine".to_string();
    config.collection.index_type = "ivf_flat".to_string();
    assert!(config.validate().is_ok());
}

#[test]
fn test_builder_defaults_two_shards() {
    let spec = CollectionSpecBuilder::default()
        .name("built")
        .fields(vec![
            FieldSchema::auto_id_primary_key("id"),
            FieldSchema::float_vector("embedding", 4),
        ])
        .build()
        .unwrap();
    assert_eq!(spec.shard_count, 2);
    spec.validate().unwrap();
}
