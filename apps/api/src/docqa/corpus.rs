//! Gathers the Q&A corpus from uploads and server folders.
//!
//! Text accumulates in one pool per document kind. Every file that yields
//! text appends the current snapshot of its kind's pool to the document list,
//! so later documents of a kind contain all earlier text of that kind.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::extraction::{DocumentExtractor, DocumentKind};
use crate::llm_client::ImageAttachment;

/// A file selected for the Q&A corpus.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub kind: DocumentKind,
    /// Set for files saved in the uploads directory.
    pub preview_url: Option<String>,
}

#[derive(Debug, Default)]
pub struct Corpus {
    pub documents: Vec<String>,
    pub images: Vec<ImageAttachment>,
    pub previews: Vec<String>,
}

/// Supported regular files directly inside each comma-separated folder,
/// sorted by name. Entries that are not directories are ignored.
pub async fn scan_folders(folder_input: &str) -> Vec<SourceFile> {
    let folders: Vec<PathBuf> = folder_input
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(PathBuf::from)
        .collect();

    let scan = tokio::task::spawn_blocking(move || {
        folders
            .iter()
            .flat_map(|dir| list_folder(dir))
            .collect::<Vec<_>>()
    });
    match scan.await {
        Ok(files) => files,
        Err(e) => {
            warn!("Folder scan aborted: {e}");
            Vec::new()
        }
    }
}

fn list_folder(dir: &Path) -> Vec<SourceFile> {
    if !dir.is_dir() {
        debug!("Ignoring folder input '{}': not a directory", dir.display());
        return Vec::new();
    }

    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Error listing {}: {e}", dir.display());
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let kind = DocumentKind::from_path(entry.path())?;
            Some(SourceFile {
                path: entry.into_path(),
                kind,
                preview_url: None,
            })
        })
        .collect()
}

/// Extracts every file and builds the document list, model images and
/// preview URLs.
pub async fn build_corpus(extractor: &dyn DocumentExtractor, files: &[SourceFile]) -> Corpus {
    let mut corpus = Corpus::default();
    let mut pools: HashMap<DocumentKind, String> = HashMap::new();

    for file in files {
        let text = extractor.extract(&file.path, file.kind).await;

        if file.kind == DocumentKind::Image {
            match tokio::fs::read(&file.path).await {
                Ok(data) => {
                    let ext = file
                        .path
                        .extension()
                        .and_then(|e| e.to_str())
                        .unwrap_or_default();
                    match ImageAttachment::from_extension(ext, data.into()) {
                        Some(image) => corpus.images.push(image),
                        None => warn!("Not attaching {}: unknown image type", file.path.display()),
                    }
                    if let Some(url) = &file.preview_url {
                        corpus.previews.push(url.clone());
                    }
                }
                Err(e) => warn!("Cannot read image {}: {e}", file.path.display()),
            }
        }

        if text.trim().is_empty() {
            continue;
        }
        let pool = pools.entry(file.kind).or_default();
        pool.push_str(&text);
        if file.kind != DocumentKind::Spreadsheet {
            pool.push('\n');
        }
        corpus.documents.push(pool.clone());
    }

    corpus
}
