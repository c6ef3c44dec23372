//! Document ingestion: format dispatch, extraction, and chunking

pub mod chunker;
pub mod extractor;
pub mod format;
pub mod ocr;

pub use chunker::TextChunker;
pub use extractor::{hash_content, DocumentExtractor, ExtractedDocument};
pub use format::FileFormat;
