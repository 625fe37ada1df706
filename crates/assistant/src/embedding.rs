//! Query embedding.
//!
//! [`HttpEmbedder`] talks to an OpenAI-compatible `/embeddings` endpoint, which
//! text-embeddings-inference and most hosted providers expose.

use crate::error::RagError;
use async_trait::async_trait;
use juridoc_core::config;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Turns a query string into a dense vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Name of the embedding model; must match the one the dense index was built with.
    fn model(&self) -> &str;

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>, RagError>;
}

/// Configuration for [`HttpEmbedder`].
#[derive(Debug, Clone)]
pub struct EmbedderConfig {
    /// Full endpoint URL, e.g. `http://127.0.0.1:8080/v1/embeddings`.
    pub url: String,
    pub model: String,
    /// Prepended to every query before embedding.
    pub query_instruction: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl EmbedderConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            model: config::DEFAULT_EMBEDDING_MODEL.to_string(),
            query_instruction: config::DEFAULT_QUERY_INSTRUCTION.to_string(),
            api_key: None,
            timeout: Duration::from_secs(config::REQUEST_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Embedding client for OpenAI-compatible endpoints.
pub struct HttpEmbedder {
    config: EmbedderConfig,
    client: Client,
}

impl HttpEmbedder {
    pub fn new(config: EmbedderConfig) -> Result<Self, RagError> {
        if config.url.trim().is_empty() {
            return Err(RagError::Configuration(
                "embedding endpoint URL is required".to_string(),
            ));
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RagError::Configuration(format!("cannot build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    fn model(&self) -> &str {
        &self.config.model
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>, RagError> {
        let body = EmbeddingRequest {
            model: &self.config.model,
            input: vec![format!("{}{}", self.config.query_instruction, query)],
        };
        let mut request = self.client.post(&self.config.url).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| RagError::Embedding(format!("request failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(RagError::Embedding(format!("HTTP {status}: {text}")));
        }
        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| RagError::Embedding(format!("invalid response: {e}")))?;

        let embedding = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| RagError::Embedding("response contained no embedding".to_string()))?;
        tracing::debug!(dimension = embedding.len(), "Embedded query");
        Ok(embedding)
    }
}
