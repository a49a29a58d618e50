use std::path::PathBuf;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use index::{EmbeddingClient, IngestConfig};
use ingest::ChunkerConfig;
use query::{ChatClient, DEFAULT_TOP_K};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub corpus: CorpusConfig,
    pub embedding: EmbeddingConfig,
    pub chat: ChatConfig,
    pub retrieval: RetrievalConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// Directory scanned for corpus documents at ingestion time.
    pub docs_dir: PathBuf,
    /// Where the embedding index is persisted. Delete this file after
    /// editing the corpus to force a rebuild.
    pub index_path: PathBuf,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    pub base_url: String,
    pub model: String,
    /// Low temperature keeps answers close to the retrieved context.
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    pub top_k: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            corpus: CorpusConfig {
                docs_dir: PathBuf::from("data/docs"),
                index_path: PathBuf::from("data/index/index.json"),
                chunk_size: 1000,
                chunk_overlap: 150,
            },
            embedding: EmbeddingConfig {
                base_url: "https://api.openai.com/v1".to_string(),
                model: "text-embedding-3-small".to_string(),
            },
            chat: ChatConfig {
                base_url: "https://api.openai.com/v1".to_string(),
                model: "gpt-4.1-mini".to_string(),
                temperature: 0.1,
            },
            retrieval: RetrievalConfig {
                top_k: DEFAULT_TOP_K,
            },
        }
    }
}

impl AppConfig {
    /// Defaults with environment overrides for the values that differ
    /// between deployments.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var("DOCS_DIR") {
            config.corpus.docs_dir = PathBuf::from(dir);
        }
        if let Ok(path) = std::env::var("INDEX_PATH") {
            config.corpus.index_path = PathBuf::from(path);
        }
        if let Ok(url) = std::env::var("OPENAI_BASE_URL") {
            config.embedding.base_url = url.clone();
            config.chat.base_url = url;
        }
        if let Ok(model) = std::env::var("EMBEDDING_MODEL") {
            config.embedding.model = model;
        }
        if let Ok(model) = std::env::var("CHAT_MODEL") {
            config.chat.model = model;
        }

        config
    }

    /// The provider key is read from the environment only, never persisted
    /// or logged.
    pub fn api_key() -> anyhow::Result<String> {
        std::env::var("OPENAI_API_KEY").context("OPENAI_API_KEY is not set")
    }

    pub fn ingest_config(&self) -> IngestConfig {
        IngestConfig {
            docs_dir: self.corpus.docs_dir.clone(),
            index_path: self.corpus.index_path.clone(),
            chunking: ChunkerConfig {
                chunk_size: self.corpus.chunk_size,
                chunk_overlap: self.corpus.chunk_overlap,
            },
        }
    }

    pub fn embedding_client(&self, api_key: &str) -> EmbeddingClient {
        EmbeddingClient::new(
            self.embedding.base_url.clone(),
            self.embedding.model.clone(),
            api_key.to_string(),
        )
    }

    pub fn chat_client(&self, api_key: &str) -> ChatClient {
        ChatClient::new(
            self.chat.base_url.clone(),
            self.chat.model.clone(),
            api_key.to_string(),
            self.chat.temperature,
        )
    }
}
