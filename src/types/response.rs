//! Response bodies for the HTTP surface

use serde::Serialize;

use crate::config::{AppConfig, RuntimeSettings};

/// Response for `GET /config` and `POST /config`
#[derive(Debug, Clone, Serialize)]
pub struct ConfigResponse {
    pub ok: bool,
    pub embed_batch: usize,
    pub upsert_batch: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub embed_model: String,
    pub generate_model: String,
    pub collection: String,
}

impl ConfigResponse {
    pub fn new(config: &AppConfig, settings: &RuntimeSettings) -> Self {
        Self {
            ok: true,
            embed_batch: settings.embed_batch,
            upsert_batch: settings.upsert_batch,
            chunk_size: settings.chunk_size,
            chunk_overlap: settings.chunk_overlap,
            embed_model: config.embed_model.clone(),
            generate_model: config.generate_model.clone(),
            collection: config.collection.clone(),
        }
    }
}

/// Response for `POST /ingest`
#[derive(Debug, Clone, Serialize)]
pub struct IngestResponse {
    pub ok: bool,
    pub project: String,
    pub chunks: usize,
    pub files: Vec<String>,
}

/// Response for `POST /ingest_urls` and `POST /ingest_sharepoint`
#[derive(Debug, Clone, Serialize)]
pub struct UrlIngestResponse {
    pub ok: bool,
    pub project: String,
    pub fetched: usize,
    pub chunks: usize,
}

/// One provenance entry in a chat answer
#[derive(Debug, Clone, Serialize)]
pub struct ChatSource {
    pub score: f32,
    pub file: String,
}

/// Response for `POST /chat`
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub answer: String,
    pub sources: Vec<ChatSource>,
}
