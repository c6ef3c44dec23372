//! Supported file formats

use serde::{Deserialize, Serialize};

/// Supported file formats, dispatched by extension.
///
/// Each variant maps to one extraction routine; there is no dynamic handler
/// lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    /// Plain text file
    Txt,
    /// Markdown file (ingested as plain text)
    Markdown,
    /// PDF document
    Pdf,
    /// Microsoft Word document (.docx)
    Docx,
    /// Legacy Microsoft Word document (.doc) - recognized but not extractable
    Doc,
    /// Excel spreadsheet (.xlsx)
    Xlsx,
    /// Legacy Excel spreadsheet (.xls)
    Xls,
    /// CSV file
    Csv,
    /// Image (extracted via OCR)
    Image,
    /// Unknown file format
    Unknown,
}

impl FileFormat {
    /// Extensions the upload endpoint accepts, with leading dots
    pub const SUPPORTED_EXTENSIONS: [&'static str; 14] = [
        ".txt", ".md", ".pdf", ".docx", ".doc", ".xlsx", ".xls", ".csv", ".jpg", ".jpeg", ".png",
        ".gif", ".bmp", ".tiff",
    ];

    /// Detect format from a file extension (without the dot)
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "txt" => Self::Txt,
            "md" => Self::Markdown,
            "pdf" => Self::Pdf,
            "docx" => Self::Docx,
            "doc" => Self::Doc,
            "xlsx" => Self::Xlsx,
            "xls" => Self::Xls,
            "csv" => Self::Csv,
            "jpg" | "jpeg" | "png" | "gif" | "bmp" | "tiff" | "tif" => Self::Image,
            _ => Self::Unknown,
        }
    }

    /// Detect format from a filename
    pub fn from_filename(filename: &str) -> Self {
        let extension = filename.rsplit('.').next().unwrap_or("");
        if extension == filename {
            // No dot at all
            return Self::Unknown;
        }
        Self::from_extension(extension)
    }

    /// Check if this format has an extraction routine
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Get display name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Txt => "Text File",
            Self::Markdown => "Markdown",
            Self::Pdf => "PDF",
            Self::Docx => "Word Document (.docx)",
            Self::Doc => "Word Document (.doc)",
            Self::Xlsx => "Excel Spreadsheet (.xlsx)",
            Self::Xls => "Excel Spreadsheet (.xls)",
            Self::Csv => "CSV",
            Self::Image => "Image",
            Self::Unknown => "Unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_by_extension() {
        assert_eq!(FileFormat::from_filename("report.pdf"), FileFormat::Pdf);
        assert_eq!(FileFormat::from_filename("notes.TXT"), FileFormat::Txt);
        assert_eq!(FileFormat::from_filename("a.b.docx"), FileFormat::Docx);
        assert_eq!(FileFormat::from_filename("scan.jpeg"), FileFormat::Image);
        assert_eq!(FileFormat::from_filename("sheet.xls"), FileFormat::Xls);
    }

    #[test]
    fn test_unknown_extensions() {
        assert_eq!(FileFormat::from_filename("archive.zip"), FileFormat::Unknown);
        assert_eq!(FileFormat::from_filename("no_extension"), FileFormat::Unknown);
        assert!(!FileFormat::Unknown.is_supported());
    }

    #[test]
    fn test_supported_extensions_round_trip() {
        for ext in FileFormat::SUPPORTED_EXTENSIONS {
            let format = FileFormat::from_extension(ext.trim_start_matches('.'));
            assert!(format.is_supported(), "{} should be supported", ext);
        }
    }
}
