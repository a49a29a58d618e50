use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning corpus files into chunks.
///
/// Per-file variants are logged and skipped during directory ingestion so a
/// single corrupt document never takes down the whole corpus.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("unsupported file format: .{0}")]
    UnsupportedFormat(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("pdftotext failed for {path}: {message}")]
    PdfExtract { path: PathBuf, message: String },

    #[error("no text extracted from {0}")]
    EmptyDocument(PathBuf),

    #[error("chunk overlap {overlap} must be smaller than chunk size {size}")]
    InvalidChunking { size: usize, overlap: usize },
}
