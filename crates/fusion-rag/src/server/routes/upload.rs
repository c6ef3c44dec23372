//! File upload and ingestion endpoint

use axum::{
    extract::{Multipart, State},
    Json,
};
use std::path::Path;
use std::time::Instant;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::ingestion::hash_content;
use crate::server::state::AppState;
use crate::types::{
    response::{FileResult, UploadResponse},
    DocumentRecord,
};

/// POST /api/upload - Upload and index files.
///
/// Extraction failures become structured per-file results so one bad file
/// never aborts the batch. Index write failures abort the request: a partial
/// write would silently change retrieval correctness.
pub async fn upload_files(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let start = Instant::now();
    let mut results = Vec::new();
    let mut total_chunks = 0u32;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::Internal(format!("Failed to read multipart field: {}", e)))?
    {
        let filename = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("file_{}.bin", Uuid::new_v4()));

        let data = match field.bytes().await {
            Ok(data) => data,
            Err(e) => {
                results.push(FileResult::failure(
                    filename,
                    format!("Failed to read file: {}", e),
                ));
                continue;
            }
        };

        tracing::info!("Processing upload: {} ({} bytes)", filename, data.len());

        match ingest_file(&state, &filename, &data).await {
            Ok(result) => {
                total_chunks += result.chunks_indexed;
                results.push(result);
            }
            Err(e) => match e {
                // Partial index writes must not be reported as per-file
                // failures; the whole request fails.
                Error::IndexWrite(_) => return Err(e),
                _ => {
                    tracing::warn!("Failed to ingest {}: {}", filename, e);
                    results.push(FileResult::failure(filename, e.to_string()));
                }
            },
        }
    }

    let processing_time_ms = start.elapsed().as_millis() as u64;

    Ok(Json(UploadResponse {
        success: results.iter().any(|r| r.success),
        total_chunks_indexed: total_chunks,
        processing_time_ms,
        results,
    }))
}

/// Persist, extract, and index one uploaded file
async fn ingest_file(state: &AppState, filename: &str, data: &[u8]) -> Result<FileResult> {
    // Keep only the final path component so uploads cannot escape the dir
    let safe_name = Path::new(filename)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("upload.bin");
    let saved_path = state.config().server.upload_dir.join(safe_name);
    tokio::fs::write(&saved_path, data).await?;

    let content_hash = hash_content(data);
    let document_number = state.assign_document_number(&content_hash);

    let extracted = state.extractor().extract(filename, data, document_number)?;

    let mut chunks_indexed = 0u32;
    for unit in &extracted.units {
        chunks_indexed += state.indexer().upsert(&unit.text, &unit.metadata).await? as u32;
    }

    state.record_document(DocumentRecord {
        document_number,
        filename: filename.to_string(),
        saved_path: saved_path.clone(),
        content_hash,
        file_format: extracted.format.clone(),
        file_size: data.len() as u64,
        units: extracted.units.len() as u32,
        chunks: chunks_indexed,
        ingested_at: chrono::Utc::now(),
    });

    tracing::info!(
        "Ingested '{}' as doc{}: {} units, {} chunks",
        filename,
        document_number,
        extracted.units.len(),
        chunks_indexed
    );

    Ok(FileResult {
        filename: filename.to_string(),
        success: true,
        error: None,
        saved_to: Some(saved_path.display().to_string()),
        document_number: Some(document_number),
        text: extracted.text,
        metadata: extracted.metadata,
        units: extracted.units.len() as u32,
        chunks_indexed,
    })
}
