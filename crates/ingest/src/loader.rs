use std::path::Path;

use tokio::process::Command;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::LoadError;
use crate::page::Page;

/// Label used when a document provides no usable file name.
pub const UNKNOWN_SOURCE: &str = "unknown source";

const SUPPORTED_EXTENSIONS: [&str; 3] = ["pdf", "txt", "md"];

/// Reads corpus files and extracts per-page text with source metadata.
pub struct DocumentLoader;

impl DocumentLoader {
    /// Load every supported document directly under `dir` (no recursion).
    ///
    /// Files that fail to parse are logged and skipped so one corrupt
    /// document does not abort ingestion of the rest of the corpus. Files
    /// are visited in name order to keep chunk numbering reproducible.
    pub async fn load_directory(dir: &Path) -> Result<Vec<Page>, LoadError> {
        let exists = tokio::fs::try_exists(dir).await.map_err(|e| LoadError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;
        if !exists {
            return Err(LoadError::Io {
                path: dir.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "corpus directory not found",
                ),
            });
        }

        let mut pages = Vec::new();

        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let path = entry.path();
            let extension = path
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase)
                .unwrap_or_default();
            if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
                debug!(file = %path.display(), "ignoring unsupported file");
                continue;
            }

            match Self::load_file(path).await {
                Ok(file_pages) => {
                    info!(
                        file = %path.display(),
                        pages = file_pages.len(),
                        "loaded document"
                    );
                    pages.extend(file_pages);
                }
                Err(err) => {
                    warn!(file = %path.display(), error = %err, "skipping unreadable document");
                }
            }
        }

        Ok(pages)
    }

    /// Extract the pages of a single document file.
    pub async fn load_file(path: &Path) -> Result<Vec<Page>, LoadError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let source = source_name(path);

        match extension.as_str() {
            "pdf" => Self::load_pdf(path, source).await,
            "txt" | "md" => Self::load_text(path, source).await,
            _ => Err(LoadError::UnsupportedFormat(extension)),
        }
    }

    async fn load_text(path: &Path, source: String) -> Result<Vec<Page>, LoadError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| LoadError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        if text.trim().is_empty() {
            return Err(LoadError::EmptyDocument(path.to_path_buf()));
        }

        Ok(vec![Page::new(text, source, Some(1))])
    }

    /// Extract PDF text with `pdftotext`, one [`Page`] per form-feed-separated
    /// page so page numbers stay attached to the extracted text.
    async fn load_pdf(path: &Path, source: String) -> Result<Vec<Page>, LoadError> {
        let output = Command::new("pdftotext")
            .arg("-layout")
            .arg("-enc")
            .arg("UTF-8")
            .arg(path)
            .arg("-")
            .output()
            .await
            .map_err(|e| LoadError::PdfExtract {
                path: path.to_path_buf(),
                message: format!("{e} (is poppler installed?)"),
            })?;

        if !output.status.success() {
            let message = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(LoadError::PdfExtract {
                path: path.to_path_buf(),
                message,
            });
        }

        let text = String::from_utf8_lossy(&output.stdout);
        let pages: Vec<Page> = text
            .split('\u{c}')
            .enumerate()
            .filter(|(_, page_text)| !page_text.trim().is_empty())
            .map(|(i, page_text)| {
                Page::new(page_text.to_string(), source.clone(), Some(i as u32 + 1))
            })
            .collect();

        if pages.is_empty() {
            return Err(LoadError::EmptyDocument(path.to_path_buf()));
        }

        Ok(pages)
    }
}

fn source_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| UNKNOWN_SOURCE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn loads_plain_text_as_single_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        tokio::fs::write(&path, "Good standing requires a 3.0 GPA.")
            .await
            .unwrap();

        let pages = DocumentLoader::load_file(&path).await.unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].source, "notes.txt");
        assert_eq!(pages[0].page_number, Some(1));
    }

    #[tokio::test]
    async fn rejects_unsupported_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheet.xlsx");
        tokio::fs::write(&path, b"not a document").await.unwrap();

        let result = DocumentLoader::load_file(&path).await;
        assert!(matches!(result, Err(LoadError::UnsupportedFormat(_))));
    }

    #[tokio::test]
    async fn rejects_empty_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        tokio::fs::write(&path, "   \n").await.unwrap();

        let result = DocumentLoader::load_file(&path).await;
        assert!(matches!(result, Err(LoadError::EmptyDocument(_))));
    }

    #[tokio::test]
    async fn directory_load_skips_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("good.txt"), "Readable document text.")
            .await
            .unwrap();
        // Garbage bytes: pdftotext either fails to parse this or is not
        // installed at all; both paths must leave the rest of the corpus
        // intact.
        tokio::fs::write(dir.path().join("broken.pdf"), b"\x00\x01not a pdf")
            .await
            .unwrap();

        let pages = DocumentLoader::load_directory(dir.path()).await.unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].source, "good.txt");
    }

    #[tokio::test]
    async fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let result = DocumentLoader::load_directory(&missing).await;
        assert!(matches!(result, Err(LoadError::Io { .. })));
    }
}
