//! Multi-format document extraction

use calamine::Reader;
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};

use crate::config::ExtractionConfig;
use crate::error::{Error, Result};
use crate::types::{DocumentUnit, UnitMetadata};

use super::format::FileFormat;
use super::ocr;

/// Everything extracted from one uploaded file
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    /// Detected file format
    pub format: FileFormat,
    /// Full extracted text (units joined in document order)
    pub text: String,
    /// Document-level metadata (file name, size, type, per-format counts)
    pub metadata: Map<String, Value>,
    /// Units in document order; each unit's metadata replicates the
    /// document-level fields
    pub units: Vec<DocumentUnit>,
}

/// Position of a raw unit within its document
enum UnitPosition {
    Whole,
    Page(u64),
    Paragraph(u64),
}

/// One extracted fragment before document metadata is stamped on
struct RawUnit {
    position: UnitPosition,
    text: String,
    fields: Map<String, Value>,
}

impl RawUnit {
    fn whole(text: String) -> Self {
        Self {
            position: UnitPosition::Whole,
            text,
            fields: Map::new(),
        }
    }

    fn page(page: u64, text: String) -> Self {
        Self {
            position: UnitPosition::Page(page),
            text,
            fields: Map::new(),
        }
    }

    fn paragraph(paragraph: u64, text: String) -> Self {
        Self {
            position: UnitPosition::Paragraph(paragraph),
            text,
            fields: Map::new(),
        }
    }
}

/// Converts uploaded bytes into document units, one extraction routine per
/// supported format.
pub struct DocumentExtractor {
    ocr_enabled: bool,
    ocr_language: String,
}

impl DocumentExtractor {
    /// Create a new extractor
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            ocr_enabled: config.ocr_enabled,
            ocr_language: config.ocr_language.clone(),
        }
    }

    /// Extract units from an uploaded file.
    ///
    /// `document_number` is the caller-assigned identifier stamped on every
    /// unit; the extractor itself keeps no numbering state.
    pub fn extract(
        &self,
        filename: &str,
        data: &[u8],
        document_number: u64,
    ) -> Result<ExtractedDocument> {
        let extension = filename.rsplit('.').next().unwrap_or("").to_lowercase();
        let format = FileFormat::from_filename(filename);

        if !format.is_supported() {
            return Err(Error::UnsupportedFormat(format!(".{}", extension)));
        }

        let (raw_units, mut metadata) = match format {
            FileFormat::Txt | FileFormat::Markdown => Self::extract_text(data)?,
            FileFormat::Pdf => Self::extract_pdf(filename, data)?,
            FileFormat::Docx => Self::extract_docx(filename, data)?,
            FileFormat::Doc => {
                return Err(Error::extraction(
                    filename,
                    "Legacy .doc is not supported. Convert to .docx and re-upload",
                ));
            }
            FileFormat::Xlsx | FileFormat::Xls => Self::extract_spreadsheet(filename, data)?,
            FileFormat::Csv => Self::extract_csv(filename, data)?,
            FileFormat::Image => self.extract_image(filename, data)?,
            FileFormat::Unknown => {
                return Err(Error::UnsupportedFormat(format!(".{}", extension)));
            }
        };

        metadata.insert("file_name".to_string(), json!(filename));
        metadata.insert("file_size".to_string(), json!(data.len() as u64));
        metadata.insert("file_type".to_string(), json!(format!(".{}", extension)));

        let text = raw_units
            .iter()
            .map(|unit| unit.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let units = raw_units
            .into_iter()
            .map(|raw| {
                let mut meta = UnitMetadata::new(document_number);
                match raw.position {
                    UnitPosition::Whole => {}
                    UnitPosition::Page(page) => meta = meta.with_page(page),
                    UnitPosition::Paragraph(paragraph) => meta = meta.with_paragraph(paragraph),
                }
                let mut extra = metadata.clone();
                extra.extend(raw.fields);
                meta.extra = extra;
                DocumentUnit::new(meta, raw.text)
            })
            .collect();

        Ok(ExtractedDocument {
            format,
            text,
            metadata,
            units,
        })
    }

    /// Plain text and Markdown: one unit, UTF-8 with lossy fallback
    fn extract_text(data: &[u8]) -> Result<(Vec<RawUnit>, Map<String, Value>)> {
        let (content, encoding) = match std::str::from_utf8(data) {
            Ok(text) => (text.to_string(), "utf-8"),
            Err(_) => (String::from_utf8_lossy(data).to_string(), "utf-8 (lossy)"),
        };

        let (line_count, word_count) = line_and_word_counts(&content);

        let mut metadata = Map::new();
        metadata.insert("encoding".to_string(), json!(encoding));
        metadata.insert("line_count".to_string(), json!(line_count));
        metadata.insert("word_count".to_string(), json!(word_count));

        Ok((vec![RawUnit::whole(content)], metadata))
    }

    /// PDF: one unit per page via lopdf, whole-document pdf-extract fallback
    fn extract_pdf(filename: &str, data: &[u8]) -> Result<(Vec<RawUnit>, Map<String, Value>)> {
        let mut raw_units = Vec::new();
        let mut page_count = 0u64;

        match lopdf::Document::load_mem(data) {
            Ok(doc) => {
                let pages = doc.get_pages();
                page_count = pages.len() as u64;
                for (&page_number, _) in pages.iter() {
                    match doc.extract_text(&[page_number]) {
                        Ok(text) => {
                            let cleaned = clean_extracted(&text);
                            if !cleaned.is_empty() {
                                raw_units.push(RawUnit::page(page_number as u64, cleaned));
                            }
                        }
                        Err(e) => {
                            tracing::debug!("No text on page {} of '{}': {}", page_number, filename, e);
                        }
                    }
                }
            }
            Err(e) => {
                tracing::warn!("lopdf could not load '{}': {}", filename, e);
            }
        }

        // Whole-document fallback for PDFs lopdf cannot read page by page
        if raw_units.is_empty() {
            let text = pdf_extract::extract_text_from_mem(data)
                .map_err(|e| Error::extraction(filename, format!("Failed to extract PDF text: {}", e)))?;
            let cleaned = clean_extracted(&text);
            if cleaned.is_empty() {
                return Err(Error::extraction(
                    filename,
                    "No text content could be extracted from PDF",
                ));
            }
            if page_count == 0 {
                page_count = 1;
            }
            raw_units.push(RawUnit::page(1, cleaned));
        }

        let mut metadata = Map::new();
        metadata.insert("page_count".to_string(), json!(page_count));
        Ok((raw_units, metadata))
    }

    /// DOCX: one unit per non-empty paragraph, numbered over all paragraphs
    fn extract_docx(filename: &str, data: &[u8]) -> Result<(Vec<RawUnit>, Map<String, Value>)> {
        let doc = docx_rs::read_docx(data).map_err(|e| Error::extraction(filename, e.to_string()))?;

        let mut raw_units = Vec::new();
        let mut paragraph_count = 0u64;

        for child in doc.document.children {
            if let docx_rs::DocumentChild::Paragraph(paragraph) = child {
                paragraph_count += 1;
                let mut text = String::new();
                for child in paragraph.children {
                    if let docx_rs::ParagraphChild::Run(run) = child {
                        for child in run.children {
                            if let docx_rs::RunChild::Text(t) = child {
                                text.push_str(&t.text);
                            }
                        }
                    }
                }
                let text = text.trim();
                if !text.is_empty() {
                    raw_units.push(RawUnit::paragraph(paragraph_count, text.to_string()));
                }
            }
        }

        if raw_units.is_empty() {
            return Err(Error::extraction(
                filename,
                "No text content could be extracted from DOCX",
            ));
        }

        let mut metadata = Map::new();
        metadata.insert("paragraph_count".to_string(), json!(paragraph_count));
        Ok((raw_units, metadata))
    }

    /// Excel: one unit per sheet, rows joined with " | "
    fn extract_spreadsheet(
        filename: &str,
        data: &[u8],
    ) -> Result<(Vec<RawUnit>, Map<String, Value>)> {
        let cursor = std::io::Cursor::new(data);
        let mut workbook = calamine::open_workbook_auto_from_rs(cursor)
            .map_err(|e| Error::extraction(filename, e.to_string()))?;

        let mut raw_units = Vec::new();
        let sheet_names = workbook.sheet_names().to_vec();

        for (index, sheet_name) in sheet_names.iter().enumerate() {
            if let Ok(range) = workbook.worksheet_range(sheet_name) {
                let mut sheet_content = format!("Sheet: {}\n", sheet_name);

                for row in range.rows() {
                    let row_text: Vec<String> = row
                        .iter()
                        .map(|cell| match cell {
                            calamine::Data::Empty => String::new(),
                            calamine::Data::String(s) => s.clone(),
                            calamine::Data::Float(f) => f.to_string(),
                            calamine::Data::Int(i) => i.to_string(),
                            calamine::Data::Bool(b) => b.to_string(),
                            calamine::Data::DateTime(dt) => dt.to_string(),
                            _ => String::new(),
                        })
                        .collect();

                    if !row_text.iter().all(|s| s.is_empty()) {
                        sheet_content.push_str(&row_text.join(" | "));
                        sheet_content.push('\n');
                    }
                }

                let mut unit = RawUnit::page((index + 1) as u64, sheet_content.trim_end().to_string());
                unit.fields
                    .insert("sheet_name".to_string(), json!(sheet_name));
                raw_units.push(unit);
            }
        }

        if raw_units.is_empty() {
            return Err(Error::extraction(
                filename,
                "No sheets could be read from spreadsheet",
            ));
        }

        let mut metadata = Map::new();
        metadata.insert("sheet_count".to_string(), json!(sheet_names.len()));
        metadata.insert("sheet_names".to_string(), json!(sheet_names));
        Ok((raw_units, metadata))
    }

    /// CSV: one unit, header and rows joined with " | "
    fn extract_csv(filename: &str, data: &[u8]) -> Result<(Vec<RawUnit>, Map<String, Value>)> {
        let mut reader = csv::Reader::from_reader(data);
        let mut content = String::new();
        let mut columns: Vec<String> = Vec::new();

        if let Ok(headers) = reader.headers() {
            columns = headers.iter().map(|h| h.to_string()).collect();
            content.push_str(&columns.join(" | "));
            content.push('\n');
        }

        let mut row_count = 0u64;
        for result in reader.records() {
            let record = result.map_err(|e| Error::extraction(filename, e.to_string()))?;
            content.push_str(&record.iter().collect::<Vec<_>>().join(" | "));
            content.push('\n');
            row_count += 1;
        }

        if content.trim().is_empty() {
            return Err(Error::extraction(filename, "CSV file is empty"));
        }

        let mut metadata = Map::new();
        metadata.insert("row_count".to_string(), json!(row_count));
        metadata.insert("column_count".to_string(), json!(columns.len()));
        metadata.insert("columns".to_string(), json!(columns));

        Ok((
            vec![RawUnit::whole(content.trim_end().to_string())],
            metadata,
        ))
    }

    /// Image: one unit via tesseract OCR
    fn extract_image(&self, filename: &str, data: &[u8]) -> Result<(Vec<RawUnit>, Map<String, Value>)> {
        if !self.ocr_enabled {
            return Err(Error::extraction(
                filename,
                "Image OCR is disabled in configuration",
            ));
        }

        let text = ocr::image_to_text(data, &self.ocr_language)
            .map_err(|e| Error::extraction(filename, e.to_string()))?;
        let text = text.trim().to_string();

        let (line_count, word_count) = line_and_word_counts(&text);

        let mut metadata = Map::new();
        metadata.insert("line_count".to_string(), json!(line_count));
        metadata.insert("word_count".to_string(), json!(word_count));

        Ok((vec![RawUnit::whole(text)], metadata))
    }
}

/// SHA-256 hex digest of uploaded bytes, used as the registry key
pub fn hash_content(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

fn line_and_word_counts(text: &str) -> (usize, usize) {
    (text.lines().count(), text.split_whitespace().count())
}

/// Drop null bytes and collapse blank lines left behind by PDF extraction
fn clean_extracted(text: &str) -> String {
    text.replace('\0', "")
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractionConfig;

    fn extractor() -> DocumentExtractor {
        DocumentExtractor::new(&ExtractionConfig::default())
    }

    #[test]
    fn test_text_extraction() {
        let data = b"first line\nsecond line with words\n";
        let extracted = extractor().extract("notes.txt", data, 7).unwrap();

        assert_eq!(extracted.format, FileFormat::Txt);
        assert_eq!(extracted.units.len(), 1);

        let unit = &extracted.units[0];
        assert_eq!(unit.metadata.document_number, 7);
        assert_eq!(unit.metadata.unit_position(), 0);
        assert_eq!(unit.metadata.extra["file_name"], "notes.txt");
        assert_eq!(unit.metadata.extra["file_type"], ".txt");
        assert_eq!(unit.metadata.extra["file_size"], data.len() as u64);
        assert_eq!(unit.metadata.extra["line_count"], 2);
        assert_eq!(unit.metadata.extra["word_count"], 6);
    }

    #[test]
    fn test_csv_extraction() {
        let data = b"name,age\nalice,30\nbob,25\n";
        let extracted = extractor().extract("people.csv", data, 0).unwrap();

        assert_eq!(extracted.units.len(), 1);
        assert!(extracted.text.starts_with("name | age"));
        assert!(extracted.text.contains("alice | 30"));
        assert_eq!(extracted.metadata["row_count"], 2);
        assert_eq!(extracted.metadata["column_count"], 2);
    }

    #[test]
    fn test_unknown_format_rejected() {
        let err = extractor().extract("archive.zip", b"PK", 0).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[test]
    fn test_legacy_doc_reports_extraction_failure() {
        let err = extractor().extract("old.doc", b"\xd0\xcf", 0).unwrap_err();
        assert!(matches!(err, Error::Extraction { .. }));
    }

    #[test]
    fn test_ocr_disabled_reports_extraction_failure() {
        let extractor = DocumentExtractor::new(&ExtractionConfig {
            ocr_enabled: false,
            ocr_language: "eng".to_string(),
        });
        let err = extractor.extract("scan.png", b"\x89PNG", 0).unwrap_err();
        assert!(matches!(err, Error::Extraction { .. }));
    }

    #[test]
    fn test_hash_content_is_stable() {
        assert_eq!(hash_content(b"abc"), hash_content(b"abc"));
        assert_ne!(hash_content(b"abc"), hash_content(b"abd"));
        assert_eq!(hash_content(b"abc").len(), 64);
    }

    #[test]
    fn test_clean_extracted_strips_noise() {
        let raw = "  heading  \n\n\0\n   body text   \n";
        assert_eq!(clean_extracted(raw), "heading\nbody text");
    }
}
