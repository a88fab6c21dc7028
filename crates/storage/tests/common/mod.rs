//! Shared helpers for storage integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use kbseed_core::{
    error::Result,
    schema::{CollectionSpec, IndexSpec, MetricType},
};
use kbseed_embeddings::EmbeddingProvider;

/// Dimension of the production knowledge-base collection
pub const KB_DIM: usize = 1536;

/// Knowledge-base layout with a unique collection name
pub fn knowledge_base(dim: usize) -> (CollectionSpec, IndexSpec) {
    let name = format!("kb_{}", uuid::Uuid::new_v4().simple());
    (
        CollectionSpec::knowledge_base(name, dim, 2),
        IndexSpec::knowledge_base(MetricType::Cosine, 128),
    )
}

/// Embeds text deterministically, so the same text always maps to the same vector
pub struct HashEmbeddingProvider {
    dim: usize,
}

impl HashEmbeddingProvider {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        // FNV-1a seed, then a 64-bit LCG stream mapped onto [-1, 1)
        let mut state = text.bytes().fold(0xcbf2_9ce4_8422_2325_u64, |h, b| {
            (h ^ u64::from(b)).wrapping_mul(0x0000_0100_0000_01b3)
        });
        (0..self.dim)
            .map(|_| {
                state = state
                    .wrapping_mul(6_364_136_223_846_793_005)
                    .wrapping_add(1_442_695_040_888_963_407);
                ((state >> 40) as f32 / (1u64 << 24) as f32) * 2.0 - 1.0
            })
            .collect()
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.vector_for(text))
    }

    fn embedding_dimension(&self) -> usize {
        self.dim
    }

    fn model_name(&self) -> &str {
        "hash"
    }
}

/// Always returns vectors of the wrong length
pub struct MisreportingProvider {
    pub reported: usize,
    pub actual: usize,
}

#[async_trait]
impl EmbeddingProvider for MisreportingProvider {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(vec![0.5; self.actual])
    }

    fn embedding_dimension(&self) -> usize {
        self.reported
    }

    fn model_name(&self) -> &str {
        "misreporting"
    }
}
