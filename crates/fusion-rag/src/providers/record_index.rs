//! Record index provider trait

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ChunkRecord, RetrievalHit};

/// Trait for a namespace-scoped similarity index that embeds records at
/// upsert time and searches by query text.
///
/// Implementations:
/// - `PineconeIndex`: remote index speaking the Pinecone records API
#[async_trait]
pub trait RecordIndex: Send + Sync {
    /// Write a batch of records. A record whose `_id` already exists is
    /// overwritten, which is what makes upsert idempotent per chunk.
    async fn upsert_records(&self, namespace: &str, records: &[ChunkRecord]) -> Result<()>;

    /// Similarity search returning up to `top_k` hits, best first.
    async fn search_records(
        &self,
        namespace: &str,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<RetrievalHit>>;

    /// Check if the index is reachable
    async fn health_check(&self) -> Result<bool>;

    /// Provider name for logging
    fn name(&self) -> &str;
}
