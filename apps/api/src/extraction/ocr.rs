//! Image OCR through the Tesseract command-line tool.
//!
//! The engine is lazy: nothing is spawned until the first image arrives, and
//! the availability probe runs once per process.

use std::path::Path;

use tokio::process::Command;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::extraction::ExtractError;

pub struct OcrEngine {
    binary: String,
    lang: String,
    available: OnceCell<bool>,
}

impl OcrEngine {
    pub fn new(binary: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            lang: lang.into(),
            available: OnceCell::new(),
        }
    }

    /// Whether the OCR binary can be executed. Probed on first call only.
    pub async fn is_available(&self) -> bool {
        *self
            .available
            .get_or_init(|| async {
                let ok = Command::new(&self.binary)
                    .arg("--version")
                    .output()
                    .await
                    .map(|out| out.status.success())
                    .unwrap_or(false);
                if ok {
                    info!("OCR engine ready ({})", self.binary);
                } else {
                    warn!(
                        "{} not found - install tesseract-ocr for image support",
                        self.binary
                    );
                }
                ok
            })
            .await
    }

    /// Recognised text fragments joined with single spaces, in reported order.
    pub async fn recognize(&self, path: &Path) -> Result<String, ExtractError> {
        if !self.is_available().await {
            return Err(ExtractError::Ocr(format!(
                "OCR engine '{}' is not available",
                self.binary
            )));
        }

        let output = Command::new(&self.binary)
            .arg(path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.lang)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractError::Ocr(stderr.trim().to_string()));
        }

        Ok(join_fragments(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Each non-empty output line is one fragment.
fn join_fragments(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
