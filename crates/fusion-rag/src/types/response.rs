//! API response types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::RetrievedChunk;

/// Per-file processing outcome for an upload.
///
/// Extraction failures land here with `success: false` so one bad file never
/// aborts the batch; index write failures abort the request instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileResult {
    /// Original filename as uploaded
    pub filename: String,
    /// Whether the file was extracted and indexed
    pub success: bool,
    /// Human-readable failure message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Where the uploaded bytes were persisted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_to: Option<String>,
    /// Document number assigned from the registry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_number: Option<u64>,
    /// Full extracted text
    #[serde(default)]
    pub text: String,
    /// Document-level extraction metadata
    #[serde(default)]
    pub metadata: Map<String, Value>,
    /// Units the extractor produced
    #[serde(default)]
    pub units: u32,
    /// Chunk records written (per index)
    #[serde(default)]
    pub chunks_indexed: u32,
}

impl FileResult {
    /// Build a structured failure result
    pub fn failure(filename: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            success: false,
            error: Some(error.into()),
            saved_to: None,
            document_number: None,
            text: String::new(),
            metadata: Map::new(),
            units: 0,
            chunks_indexed: 0,
        }
    }
}

/// Response for `POST /api/upload`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    /// True when at least one file was indexed
    pub success: bool,
    /// Per-file outcomes in upload order
    pub results: Vec<FileResult>,
    /// Chunk records written across all files (per index)
    pub total_chunks_indexed: u32,
    /// Wall-clock processing time
    pub processing_time_ms: u64,
}

/// Response for `GET /api/supported-formats`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportedFormatsResponse {
    pub supported_formats: Vec<String>,
    pub total_formats: usize,
}

/// Response for `POST /api/query`
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    /// Generated answer
    pub answer: String,
    /// Retrieved chunks in fused rank order
    pub chunks: Vec<RetrievedChunk>,
    /// Number of chunks retrieved
    pub chunks_retrieved: usize,
    /// Wall-clock processing time
    pub processing_time_ms: u64,
}
