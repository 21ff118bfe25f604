//! Request bodies for the HTTP surface

use serde::Deserialize;

fn default_project() -> String {
    "default".to_string()
}

fn default_top_k() -> usize {
    4
}

/// Body for `POST /ingest_urls`
#[derive(Debug, Clone, Deserialize)]
pub struct IngestUrlsRequest {
    #[serde(default = "default_project")]
    pub project: String,
    pub urls: Vec<String>,
    /// Optional bearer token forwarded on each fetch
    #[serde(default)]
    pub bearer: Option<String>,
}

/// Body for `POST /ingest_sharepoint`
#[derive(Debug, Clone, Deserialize)]
pub struct SharePointRequest {
    #[serde(default = "default_project")]
    pub project: String,
    pub share_url: String,
    pub bearer: String,
}

/// Body for `POST /chat`
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub question: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Accepted for forward compatibility; not applied as a retrieval filter
    #[serde(default = "default_project")]
    pub project: String,
}
