//! API routes for the RAG server

pub mod documents;
pub mod formats;
pub mod query;
pub mod upload;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        // Ingestion - with larger body limit for file uploads
        .route(
            "/upload",
            post(upload::upload_files).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        // Format listing
        .route("/supported-formats", get(formats::supported_formats))
        // Query
        .route("/query", post(query::query_rag))
        // Document registry
        .route("/documents", get(documents::list_documents))
        // Info
        .route("/info", get(info))
}

/// API info endpoint
async fn info() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "name": "fusion-rag",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Hybrid-retrieval RAG service with multi-format document ingestion",
        "endpoints": {
            "POST /api/upload": "Upload and index documents",
            "GET /api/supported-formats": "List supported file extensions",
            "POST /api/query": "Ask a question over the indexed documents",
            "GET /api/documents": "List ingested documents",
        },
        "features": {
            "hybrid_search": "Dense and sparse similarity fused by a weighting coefficient",
            "deduplication": "Content-hash based document numbering",
            "grounded_answers": "LLM answers strictly from retrieved context",
        }
    }))
}
