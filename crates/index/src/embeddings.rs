use serde::{Deserialize, Serialize};

use crate::error::IndexError;

/// Client for an OpenAI-compatible `/embeddings` endpoint.
///
/// The same client must be used at build time and query time; the index
/// records its model identifier and refuses to load under a different one.
#[derive(Clone)]
pub struct EmbeddingClient {
    base_url: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl EmbeddingClient {
    pub fn new(base_url: String, model: String, api_key: String) -> Self {
        Self {
            base_url,
            model,
            api_key,
            client: reqwest::Client::new(),
        }
    }

    /// Model identifier, persisted alongside the index records.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate an embedding for one text.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, IndexError> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| IndexError::Embedding("provider returned no embeddings".to_string()))
    }

    /// Generate embeddings for a batch of texts.
    ///
    /// The provider returns vectors in input order, which the index build
    /// relies on for deterministic record ordering.
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, IndexError> {
        let url = format!("{}/embeddings", self.base_url);
        let request = EmbeddingRequest {
            model: &self.model,
            input: texts,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(IndexError::Embedding(format!(
                "embedding request failed with {status}: {body}"
            )));
        }

        let parsed: EmbeddingResponse = response.json().await?;
        if parsed.data.len() != texts.len() {
            return Err(IndexError::Embedding(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                parsed.data.len()
            )));
        }

        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_reports_its_model() {
        let client = EmbeddingClient::new(
            "https://api.openai.com/v1".to_string(),
            "text-embedding-3-small".to_string(),
            "test-key".to_string(),
        );
        assert_eq!(client.model(), "text-embedding-3-small");
    }
}
