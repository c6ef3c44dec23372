//! Document registry endpoint

use axum::{extract::State, Json};

use crate::server::state::AppState;
use crate::types::DocumentRecord;

/// GET /api/documents - List all ingested documents
pub async fn list_documents(State(state): State<AppState>) -> Json<Vec<DocumentRecord>> {
    Json(state.list_documents())
}
