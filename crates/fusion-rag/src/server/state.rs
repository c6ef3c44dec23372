//! Shared application state

use dashmap::DashMap;
use parking_lot::RwLock;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::Result;
use crate::generation::AnswerGenerator;
use crate::indexing::ChunkIndexer;
use crate::ingestion::{DocumentExtractor, TextChunker};
use crate::providers::{openai::OpenAiChat, pinecone::PineconeIndex, ChatModel, RecordIndex};
use crate::retrieval::HybridRetriever;
use crate::types::DocumentRecord;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: RagConfig,
    /// Document extractor
    extractor: DocumentExtractor,
    /// Dual-index chunk writer
    indexer: ChunkIndexer,
    /// Hybrid retriever
    retriever: HybridRetriever,
    /// Answer generator
    generator: AnswerGenerator,
    /// Dense index handle (kept for health probes)
    dense: Arc<dyn RecordIndex>,
    /// Sparse index handle (kept for health probes)
    sparse: Arc<dyn RecordIndex>,
    /// Chat model handle (kept for health probes)
    chat: Arc<dyn ChatModel>,
    /// Ingested files keyed by content hash (persisted to disk)
    documents: DashMap<String, DocumentRecord>,
    /// Path to the registry file
    documents_path: PathBuf,
    /// Next document number to hand out
    next_document_number: AtomicU64,
    /// Ready state
    ready: RwLock<bool>,
}

impl AppState {
    /// Create application state with the configured remote providers
    pub fn new(config: RagConfig) -> Result<Self> {
        config.validate()?;

        let dense: Arc<dyn RecordIndex> = Arc::new(PineconeIndex::new(
            "dense",
            &config.index.dense_host,
            &config.index,
        ));
        let sparse: Arc<dyn RecordIndex> = Arc::new(PineconeIndex::new(
            "sparse",
            &config.index.sparse_host,
            &config.index,
        ));
        let chat: Arc<dyn ChatModel> = Arc::new(OpenAiChat::new(&config.llm));

        Self::with_providers(config, dense, sparse, chat)
    }

    /// Create application state over explicit providers.
    ///
    /// `new` delegates here; tests inject in-memory providers the same way.
    pub fn with_providers(
        config: RagConfig,
        dense: Arc<dyn RecordIndex>,
        sparse: Arc<dyn RecordIndex>,
        chat: Arc<dyn ChatModel>,
    ) -> Result<Self> {
        tracing::info!("Initializing application state...");

        fs::create_dir_all(&config.server.data_dir)?;
        fs::create_dir_all(&config.server.upload_dir)?;

        let chunker = TextChunker::new(config.chunking.chunk_size)?;

        let indexer = ChunkIndexer::new(
            Arc::clone(&dense),
            Arc::clone(&sparse),
            config.index.namespace.clone(),
            chunker,
        );
        let retriever = HybridRetriever::new(
            Arc::clone(&dense),
            Arc::clone(&sparse),
            config.index.namespace.clone(),
        );
        let generator =
            AnswerGenerator::new(Arc::clone(&chat), config.retrieval.max_context_chars);
        let extractor = DocumentExtractor::new(&config.extraction);

        let documents_path = config.server.data_dir.join("documents.json");
        let documents = Self::load_documents(&documents_path);
        let next_document_number = documents
            .iter()
            .map(|entry| entry.value().document_number + 1)
            .max()
            .unwrap_or(0);
        tracing::info!(
            "Loaded {} documents from registry (next document number: {})",
            documents.len(),
            next_document_number
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                extractor,
                indexer,
                retriever,
                generator,
                dense,
                sparse,
                chat,
                documents,
                documents_path,
                next_document_number: AtomicU64::new(next_document_number),
                ready: RwLock::new(true),
            }),
        })
    }

    /// Load the document registry from disk
    fn load_documents(path: &PathBuf) -> DashMap<String, DocumentRecord> {
        let documents = DashMap::new();

        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match serde_json::from_str::<Vec<DocumentRecord>>(&content) {
                    Ok(records) => {
                        for record in records {
                            documents.insert(record.content_hash.clone(), record);
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse documents.json: {}", e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read documents.json: {}", e);
                }
            }
        }

        documents
    }

    /// Save the document registry to disk
    fn save_documents(&self) {
        let mut records: Vec<DocumentRecord> = self
            .inner
            .documents
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by_key(|record| record.document_number);

        match serde_json::to_string_pretty(&records) {
            Ok(content) => {
                if let Err(e) = fs::write(&self.inner.documents_path, content) {
                    tracing::error!("Failed to save documents.json: {}", e);
                }
            }
            Err(e) => {
                tracing::error!("Failed to serialize documents: {}", e);
            }
        }
    }

    /// Get configuration
    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    /// Get the document extractor
    pub fn extractor(&self) -> &DocumentExtractor {
        &self.inner.extractor
    }

    /// Get the chunk indexer
    pub fn indexer(&self) -> &ChunkIndexer {
        &self.inner.indexer
    }

    /// Get the hybrid retriever
    pub fn retriever(&self) -> &HybridRetriever {
        &self.inner.retriever
    }

    /// Get the answer generator
    pub fn generator(&self) -> &AnswerGenerator {
        &self.inner.generator
    }

    /// Get the dense index handle
    pub fn dense_index(&self) -> &Arc<dyn RecordIndex> {
        &self.inner.dense
    }

    /// Get the sparse index handle
    pub fn sparse_index(&self) -> &Arc<dyn RecordIndex> {
        &self.inner.sparse
    }

    /// Get the chat model handle
    pub fn chat_model(&self) -> &Arc<dyn ChatModel> {
        &self.inner.chat
    }

    /// Check if the server is ready
    pub fn is_ready(&self) -> bool {
        *self.inner.ready.read()
    }

    /// Set ready state
    pub fn set_ready(&self, ready: bool) {
        *self.inner.ready.write() = ready;
    }

    /// Assign a document number for the given content hash.
    ///
    /// Identical content keeps its original number, so re-uploads rewrite
    /// the same chunk identifiers instead of duplicating records. New
    /// content gets the next number from an atomic counter seeded off the
    /// persisted registry.
    pub fn assign_document_number(&self, content_hash: &str) -> u64 {
        if let Some(existing) = self.inner.documents.get(content_hash) {
            return existing.document_number;
        }
        self.inner
            .next_document_number
            .fetch_add(1, Ordering::SeqCst)
    }

    /// Record an ingested document (persisted to disk)
    pub fn record_document(&self, record: DocumentRecord) {
        self.inner
            .documents
            .insert(record.content_hash.clone(), record);
        self.save_documents();
    }

    /// List all ingested documents ordered by document number
    pub fn list_documents(&self) -> Vec<DocumentRecord> {
        let mut records: Vec<DocumentRecord> = self
            .inner
            .documents
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by_key(|record| record.document_number);
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;

    use crate::ingestion::FileFormat;
    use crate::types::{ChunkRecord, RetrievalHit};

    struct NullIndex;

    #[async_trait]
    impl RecordIndex for NullIndex {
        async fn upsert_records(&self, _: &str, _: &[ChunkRecord]) -> Result<()> {
            Ok(())
        }
        async fn search_records(&self, _: &str, _: &str, _: usize) -> Result<Vec<RetrievalHit>> {
            Ok(Vec::new())
        }
        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }
        fn name(&self) -> &str {
            "null"
        }
    }

    struct NullModel;

    #[async_trait]
    impl ChatModel for NullModel {
        async fn complete(&self, _: &str, _: &str) -> Result<String> {
            Ok(String::new())
        }
        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }
        fn name(&self) -> &str {
            "null"
        }
        fn model(&self) -> &str {
            "null"
        }
    }

    fn test_state() -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let mut config = RagConfig::default();
        config.server.data_dir = dir.path().to_path_buf();
        config.server.upload_dir = dir.path().join("uploads");

        let state = AppState::with_providers(
            config,
            Arc::new(NullIndex),
            Arc::new(NullIndex),
            Arc::new(NullModel),
        )
        .unwrap();
        (state, dir)
    }

    fn record(number: u64, hash: &str) -> DocumentRecord {
        DocumentRecord {
            document_number: number,
            filename: format!("file{}.txt", number),
            saved_path: PathBuf::from(format!("/tmp/file{}.txt", number)),
            content_hash: hash.to_string(),
            file_format: FileFormat::Txt,
            file_size: 10,
            units: 1,
            chunks: 1,
            ingested_at: Utc::now(),
        }
    }

    #[test]
    fn test_numbers_are_sequential_for_new_content() {
        let (state, _dir) = test_state();
        let first = state.assign_document_number("hash-a");
        state.record_document(record(first, "hash-a"));
        let second = state.assign_document_number("hash-b");
        assert_eq!(first, 0);
        assert_eq!(second, 1);
    }

    #[test]
    fn test_same_content_reuses_its_number() {
        let (state, _dir) = test_state();
        let first = state.assign_document_number("hash-a");
        state.record_document(record(first, "hash-a"));
        assert_eq!(state.assign_document_number("hash-a"), first);
    }

    #[test]
    fn test_registry_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = RagConfig::default();
        config.server.data_dir = dir.path().to_path_buf();
        config.server.upload_dir = dir.path().join("uploads");

        {
            let state = AppState::with_providers(
                config.clone(),
                Arc::new(NullIndex),
                Arc::new(NullIndex),
                Arc::new(NullModel),
            )
            .unwrap();
            let number = state.assign_document_number("hash-a");
            state.record_document(record(number, "hash-a"));
        }

        let reloaded = AppState::with_providers(
            config,
            Arc::new(NullIndex),
            Arc::new(NullIndex),
            Arc::new(NullModel),
        )
        .unwrap();
        assert_eq!(reloaded.list_documents().len(), 1);
        // Known content keeps its number, new content continues the sequence
        assert_eq!(reloaded.assign_document_number("hash-a"), 0);
        assert_eq!(reloaded.assign_document_number("hash-b"), 1);
    }
}
