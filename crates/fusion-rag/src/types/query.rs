//! Query request types

use serde::{Deserialize, Serialize};

/// Query request for the RAG endpoint.
///
/// `top_k` and `alpha` fall back to the configured retrieval defaults when
/// omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The question to answer
    pub question: String,

    /// Number of chunks to retrieve
    #[serde(default)]
    pub top_k: Option<usize>,

    /// Dense-side fusion weight, 0.0 (sparse only) to 1.0 (dense only)
    #[serde(default)]
    pub alpha: Option<f32>,
}

impl QueryRequest {
    /// Create a new query
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            top_k: None,
            alpha: None,
        }
    }

    /// Set the number of results to retrieve
    pub fn with_top_k(mut self, k: usize) -> Self {
        self.top_k = Some(k);
        self
    }

    /// Set the fusion weight
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = Some(alpha);
        self
    }
}
