//! Document ingestion and retrieval-augmented generation service.
//!
//! Ingests PDFs, Office documents, spreadsheets, HTML, and plain text from
//! uploads, URLs, or Microsoft Graph share links; chunks and embeds the
//! extracted text via an Ollama-compatible API; stores vectors in a
//! Qdrant-compatible index; and answers questions grounded in the stored
//! chunks.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod types;

pub use config::{AppConfig, RuntimeSettings, SettingsPatch};
pub use error::{Error, Result};
