//! Qdrant REST gateway

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;

use crate::error::{Error, Result};
use crate::providers::vector_store::{ScoredChunk, VectorStoreProvider};
use crate::types::{ChunkPayload, Point};

const SERVICE: &str = "qdrant";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const UPSERT_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Deserialize)]
struct CollectionInfoResponse {
    result: CollectionInfo,
}

#[derive(Debug, Deserialize)]
struct CollectionInfo {
    config: CollectionConfig,
}

#[derive(Debug, Deserialize)]
struct CollectionConfig {
    params: CollectionParams,
}

#[derive(Debug, Deserialize)]
struct CollectionParams {
    vectors: VectorParams,
}

#[derive(Debug, Deserialize)]
struct VectorParams {
    size: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    result: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    score: f32,
    payload: ChunkPayload,
}

/// REST client for a Qdrant-compatible vector index
pub struct QdrantStore {
    http: reqwest::Client,
    base_url: String,
    collection: String,
}

impl QdrantStore {
    pub fn new(base_url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            collection: collection.into(),
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/collections/{}", self.base_url, self.collection)
    }

    /// Dimensionality of the existing collection, or `None` if absent
    async fn existing_dimension(&self) -> Result<Option<usize>> {
        let response = self
            .http
            .get(self.collection_url())
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| Error::transport(SERVICE, e))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let info: CollectionInfoResponse = response
                    .json()
                    .await
                    .map_err(|e| Error::invalid_response(SERVICE, e.to_string()))?;
                Ok(Some(info.result.config.params.vectors.size))
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(Error::upstream(SERVICE, status.as_u16(), body))
            }
        }
    }
}

#[async_trait]
impl VectorStoreProvider for QdrantStore {
    async fn ensure_collection(&self, dimension: usize) -> Result<()> {
        if let Some(existing) = self.existing_dimension().await? {
            if existing != dimension {
                return Err(Error::DimensionMismatch {
                    collection: self.collection.clone(),
                    existing,
                    probed: dimension,
                });
            }
            tracing::debug!(
                collection = %self.collection,
                dimension,
                "collection already exists"
            );
            return Ok(());
        }

        let response = self
            .http
            .put(self.collection_url())
            .timeout(REQUEST_TIMEOUT)
            .json(&json!({
                "vectors": { "size": dimension, "distance": "Cosine" }
            }))
            .send()
            .await
            .map_err(|e| Error::transport(SERVICE, e))?;

        let status = response.status();
        // CONFLICT means another process created it between the check and
        // the create, which is fine
        if status.is_success() || status == StatusCode::CONFLICT {
            tracing::info!(collection = %self.collection, dimension, "collection ready");
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(Error::upstream(SERVICE, status.as_u16(), body))
        }
    }

    async fn upsert(&self, points: &[Point]) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }

        let response = self
            .http
            .put(format!("{}/points?wait=true", self.collection_url()))
            .timeout(UPSERT_TIMEOUT)
            .json(&json!({ "points": points }))
            .send()
            .await
            .map_err(|e| Error::transport(SERVICE, e))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(Error::upstream(SERVICE, status.as_u16(), body))
        }
    }

    async fn search(&self, vector: &[f32], limit: usize) -> Result<Vec<ScoredChunk>> {
        let response = self
            .http
            .post(format!("{}/points/search", self.collection_url()))
            .timeout(REQUEST_TIMEOUT)
            .json(&json!({
                "vector": vector,
                "limit": limit,
                "with_payload": true,
            }))
            .send()
            .await
            .map_err(|e| Error::transport(SERVICE, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::upstream(SERVICE, status.as_u16(), body));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| Error::invalid_response(SERVICE, e.to_string()))?;
        Ok(parsed
            .result
            .into_iter()
            .map(|hit| ScoredChunk {
                score: hit.score,
                payload: hit.payload,
            })
            .collect())
    }
}
