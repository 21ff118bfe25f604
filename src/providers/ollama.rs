//! Ollama HTTP client and provider implementations

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{Error, Result};
use crate::providers::embedding::EmbeddingProvider;
use crate::providers::llm::LlmProvider;

const SERVICE: &str = "ollama";

/// Timeout for single-item embedding calls
pub const EMBED_TIMEOUT: Duration = Duration::from_secs(120);
/// Timeout for bulk embedding and generation calls
pub const BULK_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Low-level client for an Ollama-compatible API
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Embed one text with the given model
    pub async fn embed(&self, model: &str, text: &str, timeout: Duration) -> Result<Vec<f32>> {
        let response = self
            .http
            .post(format!("{}/api/embeddings", self.base_url))
            .timeout(timeout)
            .json(&EmbeddingRequest {
                model,
                prompt: text,
            })
            .send()
            .await
            .map_err(|e| Error::transport(SERVICE, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::upstream(SERVICE, status.as_u16(), body));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| Error::invalid_response(SERVICE, e.to_string()))?;
        if parsed.embedding.is_empty() {
            return Err(Error::invalid_response(SERVICE, "empty embedding"));
        }
        Ok(parsed.embedding)
    }

    /// Generate a non-streaming completion
    pub async fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        let response = self
            .http
            .post(format!("{}/api/generate", self.base_url))
            .timeout(BULK_TIMEOUT)
            .json(&GenerateRequest {
                model,
                prompt,
                stream: false,
                options: json!({ "num_ctx": 1024 }),
            })
            .send()
            .await
            .map_err(|e| Error::transport(SERVICE, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::upstream(SERVICE, status.as_u16(), body));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::invalid_response(SERVICE, e.to_string()))?;
        Ok(parsed.response)
    }

    /// Check whether the API answers at all
    pub async fn is_reachable(&self) -> bool {
        self.http
            .get(format!("{}/api/tags", self.base_url))
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }
}

/// Embedding provider backed by an [`OllamaClient`]
pub struct OllamaEmbedder {
    client: Arc<OllamaClient>,
    model: String,
    dimension: usize,
}

impl OllamaEmbedder {
    /// `dimension` comes from the startup probe and stays fixed
    pub fn new(client: Arc<OllamaClient>, model: impl Into<String>, dimension: usize) -> Self {
        Self {
            client,
            model: model.into(),
            dimension,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        self.client.embed(&self.model, text, EMBED_TIMEOUT).await
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            if text.trim().is_empty() {
                vectors.push(vec![0.0; self.dimension]);
            } else {
                // longer budget than single-item calls since these run in
                // back-to-back batches
                vectors.push(self.client.embed(&self.model, text, BULK_TIMEOUT).await?);
            }
        }
        Ok(vectors)
    }
}

/// Generation provider backed by an [`OllamaClient`]
pub struct OllamaLlm {
    client: Arc<OllamaClient>,
    model: String,
}

impl OllamaLlm {
    pub fn new(client: Arc<OllamaClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaLlm {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.client.generate(&self.model, prompt).await
    }
}
