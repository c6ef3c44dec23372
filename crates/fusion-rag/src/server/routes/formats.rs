//! Supported-format listing endpoint

use axum::Json;

use crate::ingestion::FileFormat;
use crate::types::response::SupportedFormatsResponse;

/// GET /api/supported-formats - List accepted file extensions
pub async fn supported_formats() -> Json<SupportedFormatsResponse> {
    let supported_formats: Vec<String> = FileFormat::SUPPORTED_EXTENSIONS
        .iter()
        .map(|ext| ext.to_string())
        .collect();

    Json(SupportedFormatsResponse {
        total_formats: supported_formats.len(),
        supported_formats,
    })
}
