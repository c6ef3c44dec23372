//! Chunk identifier derivation and dual-index upsert

pub mod indexer;

pub use indexer::ChunkIndexer;
