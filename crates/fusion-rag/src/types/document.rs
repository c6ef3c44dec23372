//! Ingested-document registry types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ingestion::FileFormat;

/// Registry entry for one ingested file.
///
/// The registry is keyed by content hash, which makes document numbering
/// storage-derived: re-uploading identical content reuses the original
/// number, so chunk identifiers land on the same records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Stable identifier used in chunk ids (`doc{n}#...`)
    pub document_number: u64,
    /// Original filename as uploaded
    pub filename: String,
    /// Where the uploaded bytes were persisted
    pub saved_path: PathBuf,
    /// SHA-256 of the uploaded bytes
    pub content_hash: String,
    /// Detected file format
    pub file_format: FileFormat,
    /// File size in bytes
    pub file_size: u64,
    /// Units the extractor produced
    pub units: u32,
    /// Chunk records written (per index)
    pub chunks: u32,
    /// Ingestion timestamp
    pub ingested_at: DateTime<Utc>,
}
