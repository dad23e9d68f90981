//! Remote embedding provider over an OpenAI-compatible HTTP API
//!
//! Used as the default when semantic chunking is requested without an
//! explicit provider. The API key comes from the config or, failing that,
//! the `OPENAI_API_KEY` environment variable.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::EmbeddingConfig;
use crate::error::{Error, Result};

use super::embedding::EmbeddingProvider;

/// Embedding provider backed by a remote `/embeddings` endpoint
pub struct RemoteEmbedder {
    client: Client,
    config: EmbeddingConfig,
    api_key: String,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingRow>,
}

#[derive(Deserialize)]
struct EmbeddingRow {
    embedding: Vec<f32>,
}

impl RemoteEmbedder {
    /// Create a new remote embedder. Fails when no API key is available,
    /// which counts as a splitter construction failure upstream.
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or_else(|| {
                Error::Embedding(
                    "no API key configured and OPENAI_API_KEY is not set".to_string(),
                )
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
            api_key,
        })
    }

    fn request(&self, input: &[String]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/embeddings", self.config.base_url.trim_end_matches('/'));
        let body = EmbeddingRequest {
            model: &self.config.model,
            input,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(Error::Embedding(format!(
                "embedding API returned {status}: {body}"
            )));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .map_err(|e| Error::Embedding(format!("failed to decode embedding response: {e}")))?;

        if parsed.data.len() != input.len() {
            return Err(Error::Embedding(format!(
                "embedding API returned {} vectors for {} inputs",
                parsed.data.len(),
                input.len()
            )));
        }

        Ok(parsed.data.into_iter().map(|row| row.embedding).collect())
    }
}

impl EmbeddingProvider for RemoteEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let input = [text.to_string()];
        let mut vectors = self.request(&input)?;
        vectors
            .pop()
            .ok_or_else(|| Error::Embedding("embedding API returned no vectors".to_string()))
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request(texts)
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    fn name(&self) -> &str {
        "remote"
    }
}
