//! Service configuration
//!
//! Connection settings come from the environment at startup and never change.
//! Ingestion tunables live in a [`RuntimeSettings`] snapshot that `POST
//! /config` replaces atomically; handlers clone the snapshot once at entry
//! so a patch mid-request cannot tear a read.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

fn default_ollama_base_url() -> String {
    "http://ollama:11434".to_string()
}

fn default_embed_model() -> String {
    "nomic-embed-text:latest".to_string()
}

fn default_generate_model() -> String {
    "llama3.1:8b".to_string()
}

fn default_qdrant_url() -> String {
    "http://localhost:6333".to_string()
}

fn default_collection() -> String {
    "docs".to_string()
}

fn default_graph_base() -> String {
    "https://graph.microsoft.com/v1.0".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Connection configuration, fixed for the lifetime of the process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the Ollama-compatible API
    #[serde(default = "default_ollama_base_url")]
    pub ollama_base_url: String,
    /// Model used for embeddings
    #[serde(default = "default_embed_model")]
    pub embed_model: String,
    /// Model used for answer generation
    #[serde(default = "default_generate_model")]
    pub generate_model: String,
    /// Base URL of the Qdrant-compatible REST API
    #[serde(default = "default_qdrant_url")]
    pub qdrant_url: String,
    /// Collection holding document vectors
    #[serde(default = "default_collection")]
    pub collection: String,
    /// Base URL of the Microsoft Graph-compatible API
    #[serde(default = "default_graph_base")]
    pub graph_base: String,
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ollama_base_url: default_ollama_base_url(),
            embed_model: default_embed_model(),
            generate_model: default_generate_model(),
            qdrant_url: default_qdrant_url(),
            collection: default_collection(),
            graph_base: default_graph_base(),
            host: default_host(),
            port: default_port(),
        }
    }
}

impl AppConfig {
    /// Load connection settings from the environment, falling back to defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(v) = std::env::var("OLLAMA_BASE_URL") {
            config.ollama_base_url = v;
        }
        if let Ok(v) = std::env::var("EMBED_MODEL") {
            config.embed_model = v;
        }
        if let Ok(v) = std::env::var("GEN_MODEL") {
            config.generate_model = v;
        }
        if let Ok(v) = std::env::var("QDRANT_URL") {
            config.qdrant_url = v;
        }
        if let Ok(v) = std::env::var("COLLECTION") {
            config.collection = v;
        }
        if let Ok(v) = std::env::var("GRAPH_BASE") {
            config.graph_base = v;
        }
        if let Ok(v) = std::env::var("HOST") {
            config.host = v;
        }
        if let Some(v) = std::env::var("PORT").ok().and_then(|p| p.parse().ok()) {
            config.port = v;
        }
        config
    }
}

/// Runtime-tunable ingestion settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeSettings {
    /// Number of texts embedded per batch
    pub embed_batch: usize,
    /// Number of points written to the vector store per upsert call
    pub upsert_batch: usize,
    /// Sliding-window chunk size in characters
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            embed_batch: 32,
            upsert_batch: 256,
            chunk_size: 800,
            chunk_overlap: 120,
        }
    }
}

/// A partial update to [`RuntimeSettings`]
///
/// Accepts the uppercase environment-variable spellings as aliases so the
/// patch body can mirror the deployment configuration keys.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsPatch {
    #[serde(default, alias = "EMBED_BATCH")]
    pub embed_batch: Option<usize>,
    #[serde(default, alias = "UPSERT_BATCH")]
    pub upsert_batch: Option<usize>,
    #[serde(default, alias = "CHUNK_SIZE")]
    pub chunk_size: Option<usize>,
    #[serde(default, alias = "CHUNK_OVERLAP")]
    pub chunk_overlap: Option<usize>,
}

impl RuntimeSettings {
    /// Load tunables from the environment, falling back to defaults.
    ///
    /// Unparseable values are ignored; invalid combinations fall back too.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let read = |name: &str, fallback: usize| -> usize {
            std::env::var(name)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(fallback)
        };
        let candidate = Self {
            embed_batch: read("EMBED_BATCH", defaults.embed_batch),
            upsert_batch: read("UPSERT_BATCH", defaults.upsert_batch),
            chunk_size: read("CHUNK_SIZE", defaults.chunk_size),
            chunk_overlap: read("CHUNK_OVERLAP", defaults.chunk_overlap),
        };
        if candidate.validate().is_ok() {
            candidate
        } else {
            tracing::warn!("invalid ingestion settings in environment, using defaults");
            defaults
        }
    }

    /// Check internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.embed_batch == 0 {
            return Err(Error::Config("embed_batch must be positive".to_string()));
        }
        if self.upsert_batch == 0 {
            return Err(Error::Config("upsert_batch must be positive".to_string()));
        }
        if self.chunk_size < 128 {
            return Err(Error::Config("chunk_size must be at least 128".to_string()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(Error::Config(
                "chunk_overlap must be smaller than chunk_size".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply a patch field by field.
    ///
    /// Each field is tried against a copy of the current settings; a field
    /// whose value would make the settings invalid is skipped and reported,
    /// while valid fields still take effect.
    pub fn apply(&self, patch: &SettingsPatch) -> (Self, Vec<&'static str>) {
        let mut next = self.clone();
        let mut rejected = Vec::new();

        if let Some(v) = patch.embed_batch {
            let mut trial = next.clone();
            trial.embed_batch = v;
            if trial.validate().is_ok() {
                next = trial;
            } else {
                rejected.push("embed_batch");
            }
        }
        if let Some(v) = patch.upsert_batch {
            let mut trial = next.clone();
            trial.upsert_batch = v;
            if trial.validate().is_ok() {
                next = trial;
            } else {
                rejected.push("upsert_batch");
            }
        }
        if let Some(v) = patch.chunk_size {
            let mut trial = next.clone();
            trial.chunk_size = v;
            if trial.validate().is_ok() {
                next = trial;
            } else {
                rejected.push("chunk_size");
            }
        }
        if let Some(v) = patch.chunk_overlap {
            let mut trial = next.clone();
            trial.chunk_overlap = v;
            if trial.validate().is_ok() {
                next = trial;
            } else {
                rejected.push("chunk_overlap");
            }
        }

        (next, rejected)
    }
}
