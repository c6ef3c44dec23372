//! Document units emitted by the extractor

use serde_json::{json, Map, Value};

/// One text fragment extracted from a source document: a whole file, a page,
/// or a paragraph. Units are transient; they exist only between extraction
/// and chunking.
#[derive(Debug, Clone)]
pub struct DocumentUnit {
    /// Addressing and payload metadata
    pub metadata: UnitMetadata,
    /// Raw extracted text
    pub text: String,
}

impl DocumentUnit {
    /// Create a new unit
    pub fn new(metadata: UnitMetadata, text: String) -> Self {
        Self { metadata, text }
    }
}

/// Addressing and payload metadata for a document unit.
///
/// `page_number` and `paragraph_number` are mutually exclusive. Units with
/// neither (plain text files, CSV, OCR output) sit at position 0.
#[derive(Debug, Clone, Default)]
pub struct UnitMetadata {
    /// Identifies the source document
    pub document_number: u64,
    /// Position within the document for paginated formats (1-indexed)
    pub page_number: Option<u64>,
    /// Position within the document for paragraph-structured formats (1-indexed)
    pub paragraph_number: Option<u64>,
    /// Extractor-supplied payload fields (file name, size, type, counts)
    pub extra: Map<String, Value>,
}

impl UnitMetadata {
    /// Create metadata for a document
    pub fn new(document_number: u64) -> Self {
        Self {
            document_number,
            ..Default::default()
        }
    }

    /// Set the page number, clearing any paragraph number
    pub fn with_page(mut self, page: u64) -> Self {
        self.page_number = Some(page);
        self.paragraph_number = None;
        self
    }

    /// Set the paragraph number, clearing any page number
    pub fn with_paragraph(mut self, paragraph: u64) -> Self {
        self.paragraph_number = Some(paragraph);
        self.page_number = None;
        self
    }

    /// Attach an extractor payload field
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Position used in chunk identifiers: page number if present, else
    /// paragraph number, else 0.
    pub fn unit_position(&self) -> u64 {
        self.page_number
            .or(self.paragraph_number)
            .unwrap_or(0)
    }

    /// Flattened payload fields replicated verbatim onto every chunk record
    /// this unit produces.
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut fields = self.extra.clone();
        fields.insert("document_number".to_string(), json!(self.document_number));
        if let Some(page) = self.page_number {
            fields.insert("page_number".to_string(), json!(page));
        }
        if let Some(paragraph) = self.paragraph_number {
            fields.insert("paragraph_number".to_string(), json!(paragraph));
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_position_prefers_page() {
        let meta = UnitMetadata::new(3).with_page(7);
        assert_eq!(meta.unit_position(), 7);
    }

    #[test]
    fn test_unit_position_falls_back_to_paragraph() {
        let meta = UnitMetadata::new(3).with_paragraph(4);
        assert_eq!(meta.unit_position(), 4);
    }

    #[test]
    fn test_unit_position_defaults_to_zero() {
        let meta = UnitMetadata::new(3);
        assert_eq!(meta.unit_position(), 0);
    }

    #[test]
    fn test_page_and_paragraph_are_exclusive() {
        let meta = UnitMetadata::new(0).with_paragraph(2).with_page(5);
        assert_eq!(meta.page_number, Some(5));
        assert_eq!(meta.paragraph_number, None);
    }

    #[test]
    fn test_to_fields_carries_addressing_and_extra() {
        let meta = UnitMetadata::new(1)
            .with_page(2)
            .with_field("file_name", serde_json::json!("report.pdf"));
        let fields = meta.to_fields();
        assert_eq!(fields["document_number"], 1);
        assert_eq!(fields["page_number"], 2);
        assert_eq!(fields["file_name"], "report.pdf");
        assert!(!fields.contains_key("paragraph_number"));
    }
}
