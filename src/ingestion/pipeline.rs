//! Shared ingestion pipeline
//!
//! All three ingestion entry points feed documents through the same path:
//! extract, chunk, embed in batches, upsert in batches. Chunks carry their
//! project and source-file tags from creation, so vectors are paired with
//! metadata by zipping equal-length sequences rather than by index
//! arithmetic across batch boundaries.

use std::sync::Arc;

use bytes::Bytes;

use crate::config::RuntimeSettings;
use crate::error::Result;
use crate::ingestion::chunker::TextChunker;
use crate::ingestion::extractor::{ExtractionMethod, TextExtractor};
use crate::providers::embedding::EmbeddingProvider;
use crate::providers::vector_store::VectorStoreProvider;
use crate::types::{Chunk, Point};

/// A document with its raw bytes, ready for extraction
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub filename: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// Per-document result of an ingestion run
#[derive(Debug, Clone)]
pub enum DocumentOutcome {
    Ingested { file: String, chunks: usize },
    Skipped { file: String, reason: String },
}

impl DocumentOutcome {
    pub fn file(&self) -> &str {
        match self {
            Self::Ingested { file, .. } | Self::Skipped { file, .. } => file,
        }
    }
}

/// Aggregated outcomes of one ingestion run
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub outcomes: Vec<DocumentOutcome>,
}

impl IngestReport {
    pub fn push_skipped(&mut self, file: impl Into<String>, reason: impl Into<String>) {
        self.outcomes.push(DocumentOutcome::Skipped {
            file: file.into(),
            reason: reason.into(),
        });
    }

    /// Total chunks written across all ingested documents
    pub fn total_chunks(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| match o {
                DocumentOutcome::Ingested { chunks, .. } => *chunks,
                DocumentOutcome::Skipped { .. } => 0,
            })
            .sum()
    }

    /// Number of documents that produced at least a chunk accounting entry
    pub fn ingested_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, DocumentOutcome::Ingested { .. }))
            .count()
    }

    /// Names of every attempted document, ingested or skipped
    pub fn files(&self) -> Vec<String> {
        self.outcomes.iter().map(|o| o.file().to_string()).collect()
    }
}

/// Ingestion orchestrator over an embedder and a vector store
pub struct IngestPipeline {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStoreProvider>,
}

impl IngestPipeline {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStoreProvider>,
    ) -> Self {
        Self { embedder, store }
    }

    /// Ingest a set of documents under one project tag.
    ///
    /// Documents that yield no text are skipped and recorded; embedding or
    /// upsert failures abort the whole call since they indicate a down
    /// dependency rather than a bad document.
    pub async fn ingest(
        &self,
        project: &str,
        documents: Vec<SourceDocument>,
        settings: &RuntimeSettings,
    ) -> Result<IngestReport> {
        let chunker = TextChunker::new(settings.chunk_size, settings.chunk_overlap);
        let mut report = IngestReport::default();
        let mut chunks: Vec<Chunk> = Vec::new();

        for doc in &documents {
            let extracted = TextExtractor::extract(&doc.filename, &doc.content_type, &doc.bytes);
            if let ExtractionMethod::Fallback { attempted, reason } = &extracted.method {
                tracing::warn!(
                    file = %doc.filename,
                    attempted,
                    reason,
                    "structured extraction failed, used lossy decode"
                );
            }

            if extracted.text.trim().is_empty() {
                tracing::warn!(file = %doc.filename, "no extractable text, skipping");
                report.push_skipped(&doc.filename, "no extractable text");
                continue;
            }

            let doc_chunks: Vec<Chunk> = chunker
                .chunk(&extracted.text)
                .into_iter()
                .map(|text| Chunk::new(text, project, &doc.filename))
                .collect();

            tracing::info!(
                file = %doc.filename,
                chunks = doc_chunks.len(),
                project,
                "document chunked"
            );
            report.outcomes.push(DocumentOutcome::Ingested {
                file: doc.filename.clone(),
                chunks: doc_chunks.len(),
            });
            chunks.extend(doc_chunks);
        }

        if chunks.is_empty() {
            return Ok(report);
        }

        let mut points: Vec<Point> = Vec::with_capacity(chunks.len());
        for group in chunks.chunks(settings.embed_batch) {
            let texts: Vec<String> = group.iter().map(|c| c.text.clone()).collect();
            let vectors = self.embedder.embed_many(&texts).await?;
            points.extend(
                group
                    .iter()
                    .cloned()
                    .zip(vectors)
                    .map(|(chunk, vector)| Point::from_chunk(chunk, vector)),
            );
        }

        let mut written = 0usize;
        for group in points.chunks(settings.upsert_batch) {
            self.store.upsert(group).await?;
            written += group.len();
            tracing::debug!(written, total = points.len(), "upsert batch complete");
        }

        tracing::info!(
            project,
            documents = report.ingested_count(),
            points = written,
            "ingestion complete"
        );
        Ok(report)
    }
}
