//! PDF text-layer extraction via `pdf-extract`.

use std::path::Path;

use crate::extraction::ExtractError;

/// Text of every page in order, each non-empty page followed by a newline.
/// Scanned pages without a text layer contribute nothing.
pub async fn extract_pdf_text(path: &Path) -> Result<String, ExtractError> {
    let bytes = tokio::fs::read(path).await?;

    // pdf-extract is synchronous and may panic on malformed input; a panic
    // surfaces here as a JoinError.
    let pages = tokio::task::spawn_blocking(move || {
        pdf_extract::extract_text_from_mem_by_pages(&bytes)
    })
    .await?
    .map_err(|e| ExtractError::Pdf(e.to_string()))?;

    Ok(join_pages(&pages))
}

fn join_pages(pages: &[String]) -> String {
    let mut text = String::new();
    for page in pages {
        let page = page.trim();
        if page.is_empty() {
            continue;
        }
        text.push_str(page);
        text.push('\n');
    }
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_pages_skips_blank_pages() {
        let pages = vec![
            "  Jane Doe\nSenior Engineer ".to_string(),
            "\n\n".to_string(),
            "Rust, Kubernetes".to_string(),
        ];
        assert_eq!(join_pages(&pages), "Jane Doe\nSenior Engineer\nRust, Kubernetes");
    }

    #[test]
    fn test_join_pages_all_blank() {
        assert_eq!(join_pages(&["".to_string(), " ".to_string()]), "");
    }

    #[tokio::test]
    async fn test_non_pdf_bytes_are_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.pdf");
        std::fs::write(&path, b"hello").unwrap();
        assert!(extract_pdf_text(&path).await.is_err());
    }
}
