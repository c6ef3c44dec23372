//! Tesseract-based OCR for image uploads

use std::process::Command;

use crate::error::{Error, Result};

/// Check if tesseract OCR is available on this host
pub fn is_available() -> bool {
    Command::new("tesseract")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Extract text from image bytes using the tesseract CLI.
///
/// The bytes are written to a temporary directory, fed to
/// `tesseract <image> stdout -l <language>`, and the directory is cleaned up
/// when the guard drops.
pub fn image_to_text(data: &[u8], language: &str) -> Result<String> {
    if !is_available() {
        return Err(Error::Internal(
            "Image OCR requires tesseract. Install with: apt install tesseract-ocr".to_string(),
        ));
    }

    let temp_dir = tempfile::tempdir()
        .map_err(|e| Error::Internal(format!("Failed to create temp dir: {}", e)))?;
    let image_path = temp_dir.path().join("input.png");
    std::fs::write(&image_path, data)
        .map_err(|e| Error::Internal(format!("Failed to write temp image: {}", e)))?;

    let output = Command::new("tesseract")
        .arg(&image_path)
        .arg("stdout")
        .arg("-l")
        .arg(language)
        .output()
        .map_err(|e| Error::Internal(format!("tesseract failed: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Internal(format!("tesseract error: {}", stderr)));
    }

    let text = String::from_utf8_lossy(&output.stdout).to_string();

    if text.trim().is_empty() {
        return Err(Error::Internal(
            "OCR produced no text from image".to_string(),
        ));
    }

    tracing::info!("Image OCR extracted {} characters", text.len());
    Ok(text)
}
