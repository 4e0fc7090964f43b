use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::extraction::DocumentKind;

/// A file received in a multipart form. Lives for one request.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Filename as sent by the browser.
    pub original_name: String,
    pub bytes: Bytes,
}

impl Upload {
    pub fn new(original_name: impl Into<String>, bytes: Bytes) -> Self {
        Self {
            original_name: original_name.into(),
            bytes,
        }
    }

    /// Lowercased extension of the original filename, if any.
    pub fn extension(&self) -> Option<String> {
        file_extension(&self.original_name)
    }

    /// Supported document kind, or `None` for unsupported files.
    pub fn kind(&self) -> Option<DocumentKind> {
        self.extension().as_deref().and_then(DocumentKind::from_extension)
    }

    /// Filesystem-safe version of the original filename.
    pub fn safe_name(&self) -> String {
        sanitize_filename(&self.original_name)
    }

    /// Writes the payload to `dir/<prefix><safe name>` and returns the path.
    pub async fn persist(&self, dir: &Path, prefix: &str) -> std::io::Result<PathBuf> {
        let path = dir.join(format!("{prefix}{}", self.safe_name()));
        tokio::fs::write(&path, &self.bytes).await?;
        Ok(path)
    }
}

/// Lowercased extension of a filename or path.
pub fn file_extension(name: &str) -> Option<String> {
    let (_, ext) = name.rsplit_once('.')?;
    (!ext.is_empty()).then(|| ext.to_ascii_lowercase())
}

/// Reduces a client-supplied filename to ASCII letters, digits, `_`, `.` and `-`.
/// Path separators and whitespace runs become `_`; leading/trailing `.`/`_` are
/// stripped so the result can never escape the uploads directory. An ASCII
/// alphanumeric extension is always kept, even when the stem is lost.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let extension = base
        .rsplit_once('.')
        .filter(|(stem, ext)| {
            !stem.is_empty() && !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|(_, ext)| ext);

    let Some(ext) = extension else {
        return sanitize_stem(name);
    };
    let stem = &name[..name.len() - ext.len() - 1];
    format!("{}.{ext}", sanitize_stem(stem))
}

fn sanitize_stem(name: &str) -> String {
    let ascii: String = name
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed.to_string()
    }
}
