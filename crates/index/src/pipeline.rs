use std::path::PathBuf;

use tracing::info;

use ingest::{Chunker, ChunkerConfig, DocumentLoader};

use crate::embeddings::EmbeddingClient;
use crate::error::IndexError;
use crate::store::VectorIndex;

/// Where the corpus lives and where the index is persisted.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub docs_dir: PathBuf,
    pub index_path: PathBuf,
    pub chunking: ChunkerConfig,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            docs_dir: PathBuf::from("data/docs"),
            index_path: PathBuf::from("data/index/index.json"),
            chunking: ChunkerConfig::default(),
        }
    }
}

/// Obtain a ready-to-query index.
///
/// Reuses the persisted index when one exists at the configured path; the
/// loader and chunker are not touched in that case. Otherwise runs
/// load -> chunk -> build and persists the result. Safe to call repeatedly:
/// the second call is cheap because it hits the persisted path. There is no
/// staleness check against corpus content; delete the index file after
/// editing the corpus to force a rebuild.
pub async fn ingest(
    config: &IngestConfig,
    embedding_client: EmbeddingClient,
) -> Result<VectorIndex, IndexError> {
    if tokio::fs::try_exists(&config.index_path).await? {
        info!(path = %config.index_path.display(), "reusing persisted index");
        return VectorIndex::load(&config.index_path, embedding_client).await;
    }

    let pages = DocumentLoader::load_directory(&config.docs_dir).await?;
    let chunker = Chunker::new(config.chunking.clone())?;
    let chunks = chunker.chunk_pages(&pages);
    info!(
        pages = pages.len(),
        chunks = chunks.len(),
        "building embedding index from corpus"
    );

    VectorIndex::build(&chunks, embedding_client, &config.index_path).await
}
