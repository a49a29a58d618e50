use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A bounded-length passage of page text, the unit of retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub chunk_id: String,
    pub text: String,
    /// Inherited from the originating page.
    pub source: String,
    /// Page of the originating text window.
    pub page_number: Option<u32>,
    /// Position within the corpus, used for internal ordering only.
    pub chunk_index: usize,
}

impl Chunk {
    pub fn new(
        text: String,
        source: String,
        page_number: Option<u32>,
        chunk_index: usize,
    ) -> Self {
        let chunk_id = Self::generate_chunk_id(&source, page_number, chunk_index, &text);

        Self {
            chunk_id,
            text,
            source,
            page_number,
            chunk_index,
        }
    }

    /// Stable content-derived id, identical across repeated ingestion runs.
    fn generate_chunk_id(
        source: &str,
        page_number: Option<u32>,
        chunk_index: usize,
        text: &str,
    ) -> String {
        let mut hasher = Sha256::new();
        hasher.update(source.as_bytes());
        hasher.update(page_number.unwrap_or(0).to_le_bytes());
        hasher.update(chunk_index.to_le_bytes());
        hasher.update(text.as_bytes());
        let result = hasher.finalize();
        hex::encode(&result[..16])
    }
}
