use std::cmp::Ordering;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use ingest::Chunk;

use crate::embeddings::EmbeddingClient;
use crate::error::IndexError;

/// On-disk format version; bump when the persisted layout changes.
pub const INDEX_FORMAT_VERSION: u32 = 1;

/// Chunks per embedding request. Batches run sequentially so record order
/// always matches chunk order.
const EMBED_BATCH_SIZE: usize = 64;

/// One stored passage: its embedding plus the text and metadata needed to
/// rebuild a citation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRecord {
    pub vector: Vec<f32>,
    pub text: String,
    pub source: String,
    pub page_number: Option<u32>,
}

#[derive(Serialize, Deserialize)]
struct PersistedIndex {
    version: u32,
    model: String,
    records: Vec<IndexRecord>,
}

/// Persistent embedding index over the corpus chunks.
///
/// Built once per corpus version, then loaded read-only. Search embeds the
/// query with the same client the build used and ranks every record by
/// cosine similarity.
pub struct VectorIndex {
    model: String,
    records: Vec<IndexRecord>,
    embedding_client: EmbeddingClient,
}

impl VectorIndex {
    /// Embed every chunk and persist the result to `path`.
    ///
    /// Any provider failure aborts the whole build; a partially embedded
    /// index is never written.
    pub async fn build(
        chunks: &[Chunk],
        embedding_client: EmbeddingClient,
        path: &Path,
    ) -> Result<Self, IndexError> {
        let mut records = Vec::with_capacity(chunks.len());

        for batch in chunks.chunks(EMBED_BATCH_SIZE) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let vectors = embedding_client.embed_batch(&texts).await?;
            for (chunk, vector) in batch.iter().zip(vectors) {
                records.push(IndexRecord {
                    vector,
                    text: chunk.text.clone(),
                    source: chunk.source.clone(),
                    page_number: chunk.page_number,
                });
            }
            debug!(embedded = records.len(), total = chunks.len(), "embedding progress");
        }

        let index = Self::from_records(records, embedding_client);
        index.persist(path).await?;
        info!(records = index.len(), path = %path.display(), "persisted embedding index");
        Ok(index)
    }

    /// Reconstruct an index from persisted storage without contacting the
    /// embedding provider.
    pub async fn load(path: &Path, embedding_client: EmbeddingClient) -> Result<Self, IndexError> {
        if !tokio::fs::try_exists(path).await? {
            return Err(IndexError::NotFound(path.to_path_buf()));
        }

        let data = tokio::fs::read_to_string(path).await?;
        let persisted: PersistedIndex = serde_json::from_str(&data)?;

        if persisted.version != INDEX_FORMAT_VERSION {
            return Err(IndexError::UnsupportedVersion(persisted.version));
        }
        if persisted.model != embedding_client.model() {
            return Err(IndexError::ModelMismatch {
                persisted: persisted.model,
                configured: embedding_client.model().to_string(),
            });
        }

        info!(records = persisted.records.len(), path = %path.display(), "loaded embedding index");
        Ok(Self {
            model: persisted.model,
            records: persisted.records,
            embedding_client,
        })
    }

    /// Assemble an index from precomputed records.
    pub fn from_records(records: Vec<IndexRecord>, embedding_client: EmbeddingClient) -> Self {
        Self {
            model: embedding_client.model().to_string(),
            records,
            embedding_client,
        }
    }

    /// Write the index to `path`, creating parent directories as needed.
    pub async fn persist(&self, path: &Path) -> Result<(), IndexError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let persisted = PersistedIndex {
            version: INDEX_FORMAT_VERSION,
            model: self.model.clone(),
            records: self.records.clone(),
        };
        let data = serde_json::to_string(&persisted)?;
        tokio::fs::write(path, data).await?;
        Ok(())
    }

    /// Return the `k` records most similar to `query`, best first.
    ///
    /// Ties keep insertion order. Rejects `k == 0` and blank queries before
    /// any network call.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<IndexRecord>, IndexError> {
        if query.trim().is_empty() {
            return Err(IndexError::InvalidArgument(
                "query must not be empty".to_string(),
            ));
        }
        validate_k(k)?;

        let query_vector = self.embedding_client.embed(query).await?;
        self.search_with_vector(&query_vector, k)
    }

    /// Rank records against a precomputed query vector.
    pub fn search_with_vector(
        &self,
        query_vector: &[f32],
        k: usize,
    ) -> Result<Vec<IndexRecord>, IndexError> {
        validate_k(k)?;

        let mut scored: Vec<(f32, &IndexRecord)> = self
            .records
            .iter()
            .map(|record| (cosine_similarity(query_vector, &record.vector), record))
            .collect();

        // Stable sort: records with equal scores keep insertion order.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(_, record)| record.clone())
            .collect())
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn validate_k(k: usize) -> Result<(), IndexError> {
    if k == 0 {
        return Err(IndexError::InvalidArgument(
            "k must be at least 1".to_string(),
        ));
    }
    Ok(())
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> EmbeddingClient {
        EmbeddingClient::new(
            "http://localhost:0/v1".to_string(),
            "test-model".to_string(),
            "test-key".to_string(),
        )
    }

    fn record(vector: Vec<f32>, text: &str, page: u32) -> IndexRecord {
        IndexRecord {
            vector,
            text: text.to_string(),
            source: "handbook.pdf".to_string(),
            page_number: Some(page),
        }
    }

    #[test]
    fn search_ranks_by_cosine_similarity() {
        let index = VectorIndex::from_records(
            vec![
                record(vec![0.0, 1.0], "orthogonal", 1),
                record(vec![1.0, 0.0], "aligned", 2),
                record(vec![0.7, 0.7], "diagonal", 3),
            ],
            test_client(),
        );

        let results = index.search_with_vector(&[1.0, 0.0], 2).unwrap();
        assert_eq!(results[0].text, "aligned");
        assert_eq!(results[1].text, "diagonal");
    }

    #[test]
    fn ties_keep_insertion_order() {
        let index = VectorIndex::from_records(
            vec![
                record(vec![1.0, 0.0], "first", 1),
                record(vec![2.0, 0.0], "second", 2),
                record(vec![3.0, 0.0], "third", 3),
            ],
            test_client(),
        );

        // All three score 1.0 against the query direction.
        let results = index.search_with_vector(&[1.0, 0.0], 3).unwrap();
        let texts: Vec<&str> = results.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, ["first", "second", "third"]);
    }

    #[test]
    fn zero_k_is_rejected() {
        let index = VectorIndex::from_records(vec![record(vec![1.0], "only", 1)], test_client());
        let result = index.search_with_vector(&[1.0], 0);
        assert!(matches!(result, Err(IndexError::InvalidArgument(_))));
    }

    #[test]
    fn k_larger_than_corpus_returns_everything() {
        let index = VectorIndex::from_records(
            vec![
                record(vec![1.0, 0.0], "a", 1),
                record(vec![0.0, 1.0], "b", 2),
            ],
            test_client(),
        );
        let results = index.search_with_vector(&[1.0, 0.0], 10).unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn persisted_index_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");

        let original = VectorIndex::from_records(
            vec![
                record(vec![0.9, 0.1], "good standing requires a 3.0 GPA", 12),
                record(vec![0.1, 0.9], "plagiarism sanctions", 4),
            ],
            test_client(),
        );
        original.persist(&path).await.unwrap();

        let reloaded = VectorIndex::load(&path, test_client()).await.unwrap();
        assert_eq!(reloaded.len(), original.len());
        assert_eq!(reloaded.model(), "test-model");

        let query = [0.8_f32, 0.2];
        assert_eq!(
            original.search_with_vector(&query, 2).unwrap(),
            reloaded.search_with_vector(&query, 2).unwrap()
        );
    }

    #[tokio::test]
    async fn load_fails_without_persisted_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        let result = VectorIndex::load(&path, test_client()).await;
        assert!(matches!(result, Err(IndexError::NotFound(_))));
    }

    #[tokio::test]
    async fn load_fails_on_model_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");

        let index = VectorIndex::from_records(vec![record(vec![1.0], "text", 1)], test_client());
        index.persist(&path).await.unwrap();

        let other_client = EmbeddingClient::new(
            "http://localhost:0/v1".to_string(),
            "different-model".to_string(),
            "test-key".to_string(),
        );
        let result = VectorIndex::load(&path, other_client).await;
        assert!(matches!(result, Err(IndexError::ModelMismatch { .. })));
    }
}
