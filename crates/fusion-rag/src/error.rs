//! Error types for the RAG service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for RAG operations
pub type Result<T> = std::result::Result<T, Error>;

/// RAG service errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unknown or unhandled file extension
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Format-specific extraction failure (corrupt file, unreadable encoding)
    #[error("Failed to extract '{filename}': {message}")]
    Extraction { filename: String, message: String },

    /// An upsert to a vector index failed
    #[error("Index write failed: {0}")]
    IndexWrite(String),

    /// A similarity search failed
    #[error("Search failed: {0}")]
    Search(String),

    /// Chat model call failed or returned malformed output
    #[error("Generation failed: {0}")]
    Generation(String),

    /// Document not found
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an extraction error
    pub fn extraction(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Extraction {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create an index write error
    pub fn index_write(message: impl Into<String>) -> Self {
        Self::IndexWrite(message.into())
    }

    /// Create a search error
    pub fn search(message: impl Into<String>) -> Self {
        Self::Search(message.into())
    }

    /// Create a generation error
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            Error::Config(msg) => (StatusCode::BAD_REQUEST, "config_error", msg.clone()),
            Error::UnsupportedFormat(ext) => (
                StatusCode::BAD_REQUEST,
                "unsupported_format",
                format!("Unsupported file format: {}", ext),
            ),
            Error::Extraction { filename, message } => (
                StatusCode::BAD_REQUEST,
                "extraction_error",
                format!("Failed to extract '{}': {}", filename, message),
            ),
            Error::IndexWrite(msg) => (StatusCode::BAD_GATEWAY, "index_write_error", msg.clone()),
            Error::Search(msg) => (StatusCode::BAD_GATEWAY, "search_error", msg.clone()),
            Error::Generation(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "generation_error", msg.clone())
            }
            Error::DocumentNotFound(id) => (
                StatusCode::NOT_FOUND,
                "not_found",
                format!("Document not found: {}", id),
            ),
            Error::Io(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "io_error",
                err.to_string(),
            ),
            Error::Json(err) => (StatusCode::BAD_REQUEST, "json_error", err.to_string()),
            Error::Http(err) => (StatusCode::BAD_GATEWAY, "http_error", err.to_string()),
            Error::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg.clone())
            }
        };

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}
