use std::path::Path;

use thiserror::Error;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff"];

pub const NO_TEXT: &str = "[No text]";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("no OCR engine is configured for image file '{0}'")]
    OcrUnavailable(String),
    #[error("no PDF text engine is configured for '{0}'")]
    PdfUnavailable(String),
    #[error("'{0}' is not UTF-8 text")]
    NotText(String),
}

/// Pulls readable text out of an uploaded lab document.
///
/// Extraction may be CPU heavy, so callers run it on the blocking pool.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, filename: &str, bytes: &[u8]) -> Result<String, ExtractionError>;
}

/// Handles text-based uploads. Images and PDFs are reported as unsupported so
/// a real OCR engine can be slotted in behind [`TextExtractor`].
#[derive(Debug, Clone, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, filename: &str, bytes: &[u8]) -> Result<String, ExtractionError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|value| value.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            return Err(ExtractionError::OcrUnavailable(filename.to_owned()));
        }
        if extension == "pdf" {
            return Err(ExtractionError::PdfUnavailable(filename.to_owned()));
        }

        let text = std::str::from_utf8(bytes)
            .map_err(|_| ExtractionError::NotText(filename.to_owned()))?
            .trim();
        if text.is_empty() {
            return Ok(NO_TEXT.to_owned());
        }
        Ok(text.to_owned())
    }
}

/// Keeps only the final path component and replaces anything outside
/// `[A-Za-z0-9._-]` with `_`.
pub fn sanitize_filename(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect::<String>();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_owned()
    } else {
        cleaned.to_owned()
    }
}
