//! Query endpoint: hybrid retrieval plus grounded generation

use axum::{extract::State, Json};
use std::time::Instant;

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{query::QueryRequest, response::QueryResponse};

/// POST /api/query - Answer a question over the indexed documents.
///
/// Retrieval and generation failures surface as explicit errors; an empty
/// retrieval is not one of them. "No relevant context" is a valid state and
/// the generator is still asked, so the model can say the context holds no
/// answer rather than this endpoint fabricating one.
pub async fn query_rag(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>> {
    let start = Instant::now();

    tracing::info!("Query: \"{}\"", request.question);

    let retrieval = &state.config().retrieval;
    let top_k = request.top_k.unwrap_or(retrieval.default_top_k);
    let alpha = request.alpha.unwrap_or(retrieval.default_alpha);

    let chunks = state
        .retriever()
        .retrieve(&request.question, top_k, alpha)
        .await?;

    if chunks.is_empty() {
        tracing::info!("No matching context retrieved, answering from empty context");
    }

    let answer = state.generator().generate(&request.question, &chunks).await?;

    let processing_time_ms = start.elapsed().as_millis() as u64;

    tracing::info!(
        "Query completed in {}ms with {} chunks",
        processing_time_ms,
        chunks.len()
    );

    Ok(Json(QueryResponse {
        answer,
        chunks_retrieved: chunks.len(),
        chunks,
        processing_time_ms,
    }))
}
