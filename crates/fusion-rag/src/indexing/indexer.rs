//! Upserts chunked document units into the dense and sparse indexes

use std::sync::Arc;

use crate::error::Result;
use crate::ingestion::TextChunker;
use crate::providers::RecordIndex;
use crate::types::{ChunkRecord, UnitMetadata};

/// Writes chunk records into both indexes under a shared namespace so a
/// fused lookup can later merge by identifier.
pub struct ChunkIndexer {
    dense: Arc<dyn RecordIndex>,
    sparse: Arc<dyn RecordIndex>,
    namespace: String,
    chunker: TextChunker,
}

impl ChunkIndexer {
    /// Create a new indexer
    pub fn new(
        dense: Arc<dyn RecordIndex>,
        sparse: Arc<dyn RecordIndex>,
        namespace: impl Into<String>,
        chunker: TextChunker,
    ) -> Self {
        Self {
            dense,
            sparse,
            namespace: namespace.into(),
            chunker,
        }
    }

    /// Chunk `text` and upsert one record per chunk into both indexes.
    ///
    /// Returns the number of chunk records written (per index). Both writes
    /// must succeed; a failure on either side fails the whole call rather
    /// than leaving one index silently behind the other.
    pub async fn upsert(&self, text: &str, meta: &UnitMetadata) -> Result<usize> {
        let chunks = self.chunker.split(text);
        if chunks.is_empty() {
            return Ok(0);
        }

        let records = Self::build_records(&chunks, meta);

        tokio::try_join!(
            self.dense.upsert_records(&self.namespace, &records),
            self.sparse.upsert_records(&self.namespace, &records),
        )?;

        tracing::info!(
            "Inserted {} records for doc{}#p{}",
            records.len(),
            meta.document_number,
            meta.unit_position()
        );

        Ok(records.len())
    }

    /// Build records with `doc{n}#p{position}#c{index}` identifiers and the
    /// unit's metadata flattened onto each one.
    fn build_records(chunks: &[String], meta: &UnitMetadata) -> Vec<ChunkRecord> {
        let position = meta.unit_position();

        chunks
            .iter()
            .enumerate()
            .map(|(index, text)| {
                ChunkRecord::new(
                    format!("doc{}#p{}#c{}", meta.document_number, position, index),
                    text.clone(),
                    meta.to_fields(),
                )
            })
            .collect()
    }
}
