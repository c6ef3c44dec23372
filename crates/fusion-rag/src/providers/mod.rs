//! Provider abstractions for the external collaborators: record indexes and
//! the chat model.

pub mod chat;
pub mod openai;
pub mod pinecone;
pub mod record_index;

pub use chat::ChatModel;
pub use record_index::RecordIndex;

use std::time::Duration;
use tokio::time::sleep;

use crate::error::Result;

/// Retry an operation with exponential backoff.
///
/// Shared by the HTTP clients so transient network failures do not surface
/// as hard errors on the first attempt.
pub(crate) async fn retry_request<F, Fut, T>(max_retries: u32, operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut last_error = None;

    for attempt in 0..=max_retries {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                last_error = Some(e);
                if attempt < max_retries {
                    let delay = Duration::from_secs(2u64.pow(attempt));
                    tracing::warn!(
                        "Request failed (attempt {}/{}), retrying in {:?}",
                        attempt + 1,
                        max_retries + 1,
                        delay
                    );
                    sleep(delay).await;
                }
            }
        }
    }

    Err(last_error
        .unwrap_or_else(|| crate::error::Error::Internal("Unknown request error".to_string())))
}
