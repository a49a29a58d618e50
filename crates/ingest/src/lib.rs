pub mod chunk;
pub mod chunker;
pub mod error;
pub mod loader;
pub mod page;

pub use chunk::Chunk;
pub use chunker::{Chunker, ChunkerConfig};
pub use error::LoadError;
pub use loader::{DocumentLoader, UNKNOWN_SOURCE};
pub use page::Page;

use std::path::Path;

/// Load every supported document under `dir` and split it into retrieval
/// chunks.
pub async fn ingest_directory(
    dir: &Path,
    config: ChunkerConfig,
) -> Result<Vec<Chunk>, LoadError> {
    let pages = DocumentLoader::load_directory(dir).await?;
    let chunker = Chunker::new(config)?;
    Ok(chunker.chunk_pages(&pages))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn directory_ingestion_produces_ordered_chunks() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(
            dir.path().join("policy.txt"),
            "Plagiarism is a violation of the academic integrity policy. ".repeat(30),
        )
        .await
        .unwrap();

        let chunks = ingest_directory(dir.path(), ChunkerConfig::default())
            .await
            .unwrap();
        assert!(!chunks.is_empty());
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.chunk_index, i);
            assert_eq!(chunk.source, "policy.txt");
        }
    }
}
