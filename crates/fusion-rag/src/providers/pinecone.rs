//! Pinecone records API client
//!
//! Talks to one index host. Records are embedded server-side at upsert, and
//! searches take query text, so no embedding model runs in this process.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::IndexConfig;
use crate::error::{Error, Result};
use crate::types::{ChunkRecord, RetrievalHit};

use super::record_index::RecordIndex;
use super::retry_request;

/// Client for one Pinecone-style record index
pub struct PineconeIndex {
    /// HTTP client
    client: Client,
    /// Index base URL
    host: String,
    /// API key sent as the `Api-Key` header
    api_key: Option<String>,
    /// Maximum retries
    max_retries: u32,
    /// Label used in logs ("dense" or "sparse")
    label: String,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: SearchQuery<'a>,
}

#[derive(Serialize)]
struct SearchQuery<'a> {
    inputs: SearchInputs<'a>,
    top_k: usize,
}

#[derive(Serialize)]
struct SearchInputs<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct SearchResponse {
    result: SearchResultBody,
}

#[derive(Deserialize)]
struct SearchResultBody {
    #[serde(default)]
    hits: Vec<RetrievalHit>,
}

impl PineconeIndex {
    /// Create a client for one index host
    pub fn new(label: impl Into<String>, host: impl Into<String>, config: &IndexConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            host: host.into().trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            max_retries: config.max_retries,
            label: label.into(),
        }
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        let mut builder = self.client.request(method, url);
        if let Some(key) = &self.api_key {
            builder = builder.header("Api-Key", key);
        }
        builder
    }

    /// Serialize records as NDJSON, one record per line
    fn to_ndjson(records: &[ChunkRecord]) -> Result<String> {
        let mut body = String::new();
        for record in records {
            body.push_str(&serde_json::to_string(record)?);
            body.push('\n');
        }
        Ok(body)
    }
}

#[async_trait]
impl RecordIndex for PineconeIndex {
    async fn upsert_records(&self, namespace: &str, records: &[ChunkRecord]) -> Result<()> {
        let url = format!("{}/records/namespaces/{}/upsert", self.host, namespace);
        let body = Self::to_ndjson(records)?;
        let label = self.label.clone();

        retry_request(self.max_retries, || {
            let url = url.clone();
            let body = body.clone();
            let label = label.clone();

            async move {
                let response = self
                    .request(reqwest::Method::POST, &url)
                    .header("Content-Type", "application/x-ndjson")
                    .body(body)
                    .send()
                    .await
                    .map_err(|e| Error::IndexWrite(format!("{} upsert request failed: {}", label, e)))?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(Error::IndexWrite(format!(
                        "{} upsert failed: HTTP {} - {}",
                        label, status, body
                    )));
                }

                Ok(())
            }
        })
        .await?;

        tracing::debug!("Upserted {} records into {} index", records.len(), self.label);
        Ok(())
    }

    async fn search_records(
        &self,
        namespace: &str,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<RetrievalHit>> {
        let url = format!("{}/records/namespaces/{}/search", self.host, namespace);
        let label = self.label.clone();

        retry_request(self.max_retries, || {
            let url = url.clone();
            let label = label.clone();

            async move {
                let request = SearchRequest {
                    query: SearchQuery {
                        inputs: SearchInputs { text: query },
                        top_k,
                    },
                };

                let response = self
                    .request(reqwest::Method::POST, &url)
                    .json(&request)
                    .send()
                    .await
                    .map_err(|e| Error::Search(format!("{} search request failed: {}", label, e)))?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(Error::Search(format!(
                        "{} search failed: HTTP {} - {}",
                        label, status, body
                    )));
                }

                let search_response: SearchResponse = response
                    .json()
                    .await
                    .map_err(|e| Error::Search(format!("{} search response malformed: {}", label, e)))?;

                Ok(search_response.result.hits)
            }
        })
        .await
    }

    async fn health_check(&self) -> Result<bool> {
        match self.request(reqwest::Method::GET, &self.host).send().await {
            Ok(response) => Ok(!response.status().is_server_error()),
            Err(_) => Ok(false),
        }
    }

    fn name(&self) -> &str {
        &self.label
    }
}
