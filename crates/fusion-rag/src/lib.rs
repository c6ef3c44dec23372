//! fusion-rag: Hybrid-retrieval RAG service with multi-format document ingestion
//!
//! This crate ingests heterogeneous documents (text, PDF, DOCX, spreadsheets,
//! CSV, images via OCR), splits the extracted text into bounded chunks, and
//! upserts chunk records into a paired dense and sparse vector index. Queries
//! run both similarity searches in parallel, fuse the per-chunk scores with a
//! weighting coefficient, and feed the top-ranked chunk texts to a chat model
//! for grounded answer generation.

pub mod config;
pub mod error;
pub mod generation;
pub mod indexing;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use types::{
    record::{ChunkRecord, RetrievalHit, RetrievedChunk},
    unit::{DocumentUnit, UnitMetadata},
};
