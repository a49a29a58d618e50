use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building, loading, or searching the embedding index.
#[derive(Error, Debug)]
pub enum IndexError {
    /// The embedding provider rejected or failed a request. A build-time
    /// occurrence aborts the whole build; nothing is partially persisted.
    #[error("embedding provider error: {0}")]
    Embedding(String),

    #[error("no persisted index found at {0}")]
    NotFound(PathBuf),

    #[error(
        "persisted index was built with embedding model '{persisted}' but \
         '{configured}' is configured; delete the index file to rebuild"
    )]
    ModelMismatch {
        persisted: String,
        configured: String,
    },

    #[error("unsupported index format version {0}")]
    UnsupportedVersion(u32),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("corpus load error: {0}")]
    Load(#[from] ingest::LoadError),

    #[error("index storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("index serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}
