//! Hybrid retrieval over the dense and sparse indexes

pub mod hybrid;

pub use hybrid::HybridRetriever;
