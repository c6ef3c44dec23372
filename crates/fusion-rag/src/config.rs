//! Configuration for the RAG service

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RagConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Dense/sparse index configuration
    #[serde(default)]
    pub index: IndexConfig,
    /// Chat model configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    /// Extraction configuration
    #[serde(default)]
    pub extraction: ExtractionConfig,
}

impl RagConfig {
    /// Load configuration from a TOML file, then overlay environment secrets.
    ///
    /// Missing file sections fall back to their defaults. `PINECONE_API_KEY`,
    /// `DENSE_INDEX_HOST`, `SPARSE_INDEX_HOST`, and `OPENAI_API_KEY` override
    /// whatever the file contains so secrets stay out of checked-in config.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                toml::from_str(&content)
                    .map_err(|e| Error::Config(format!("Invalid config file: {}", e)))?
            }
            None => Self::default(),
        };
        config.overlay_env();
        config.validate()?;
        Ok(config)
    }

    fn overlay_env(&mut self) {
        if let Ok(host) = std::env::var("DENSE_INDEX_HOST") {
            self.index.dense_host = host;
        }
        if let Ok(host) = std::env::var("SPARSE_INDEX_HOST") {
            self.index.sparse_host = host;
        }
        if let Ok(key) = std::env::var("PINECONE_API_KEY") {
            self.index.api_key = Some(key);
        }
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            self.llm.api_key = Some(key);
        }
    }

    /// Check invariants that would otherwise surface deep in the pipeline.
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(Error::Config(
                "chunking.chunk_size must be greater than zero".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.retrieval.default_alpha) {
            return Err(Error::Config(format!(
                "retrieval.default_alpha must be within [0, 1], got {}",
                self.retrieval.default_alpha
            )));
        }
        if self.retrieval.default_top_k == 0 {
            return Err(Error::Config(
                "retrieval.default_top_k must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum upload size in bytes (default: 100MB)
    pub max_upload_size: usize,
    /// Directory for persisted uploads
    pub upload_dir: PathBuf,
    /// Directory for the document registry
    pub data_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
            .join("fusion-rag");

        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            enable_cors: true,
            max_upload_size: 100 * 1024 * 1024, // 100MB
            upload_dir: data_dir.join("uploads"),
            data_dir,
        }
    }
}

/// Dense and sparse record-index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Base URL of the dense (semantic embedding) index
    pub dense_host: String,
    /// Base URL of the sparse (lexical) index
    pub sparse_host: String,
    /// Logical partition both indexes share, so fused lookups merge by id
    pub namespace: String,
    /// API key sent with every index request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    pub max_retries: u32,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            dense_host: String::new(),
            sparse_host: String::new(),
            namespace: "default".to_string(),
            api_key: None,
            timeout_secs: 30,
            max_retries: 2,
        }
    }
}

/// Chat model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// API base URL
    pub base_url: String,
    /// Generation model name
    pub model: String,
    /// Maximum tokens in the generated answer
    pub max_tokens: u32,
    /// Sampling temperature (low for near-deterministic answers)
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    pub max_retries: u32,
    /// Bearer token for the API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4.1-mini".to_string(),
            max_tokens: 512,
            temperature: 0.2,
            timeout_secs: 60,
            max_retries: 2,
            api_key: None,
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Target chunk size in characters
    pub chunk_size: usize,
    /// Overlap between chunks in characters
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 400,
            chunk_overlap: 0,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of chunks to retrieve when a query does not say otherwise
    pub default_top_k: usize,
    /// Dense-side fusion weight when a query does not say otherwise
    pub default_alpha: f32,
    /// Upper bound on the concatenated context passed to the model
    pub max_context_chars: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_top_k: 5,
            default_alpha: 0.7,
            max_context_chars: 6000,
        }
    }
}

/// Extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Run tesseract OCR on image uploads
    pub ocr_enabled: bool,
    /// OCR language passed to tesseract
    pub ocr_language: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            ocr_enabled: true,
            ocr_language: "eng".to_string(),
        }
    }
}
