//! Text extraction — turns an uploaded file into plain text.
//!
//! Extraction never fails from the caller's point of view: every backend error
//! is logged and reported as empty text, which callers treat as "nothing to
//! analyse".
//!
//! `AppState` holds an `Arc<dyn DocumentExtractor>`; `FileExtractor` is the
//! production backend.

pub mod ocr;
pub mod pdf;
pub mod spreadsheet;

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use crate::extraction::ocr::OcrEngine;

/// Supported upload types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Pdf,
    Image,
    Spreadsheet,
}

impl DocumentKind {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "png" | "jpg" | "jpeg" => Some(DocumentKind::Image),
            "xlsx" => Some(DocumentKind::Spreadsheet),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("OCR error: {0}")]
    Ocr(String),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("Extraction task aborted: {0}")]
    Aborted(#[from] tokio::task::JoinError),
}

/// Extraction seam. Implementations must swallow their own errors.
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    /// Plain text of the file, or an empty string when nothing could be read.
    async fn extract(&self, path: &Path, kind: DocumentKind) -> String;
}

/// Production extractor: pdf-extract, Tesseract and calamine.
pub struct FileExtractor {
    ocr: OcrEngine,
}

impl FileExtractor {
    pub fn new(ocr: OcrEngine) -> Self {
        Self { ocr }
    }

    async fn try_extract(&self, path: &Path, kind: DocumentKind) -> Result<String, ExtractError> {
        match kind {
            DocumentKind::Pdf => pdf::extract_pdf_text(path).await,
            DocumentKind::Image => self.ocr.recognize(path).await,
            DocumentKind::Spreadsheet => spreadsheet::extract_workbook_text(path).await,
        }
    }
}

#[async_trait]
impl DocumentExtractor for FileExtractor {
    async fn extract(&self, path: &Path, kind: DocumentKind) -> String {
        match self.try_extract(path, kind).await {
            Ok(text) => {
                debug!(
                    "Extracted {} chars from {} ({kind:?})",
                    text.len(),
                    path.display()
                );
                text
            }
            Err(e) => {
                warn!("Error extracting text from {}: {e}", path.display());
                String::new()
            }
        }
    }
}
