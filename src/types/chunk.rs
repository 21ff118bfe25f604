//! Chunk and point records
//!
//! A chunk carries its metadata from the moment it is created, so the
//! embedding and upsert batches can never desync text from provenance.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A bounded substring of a document's extracted text, tagged with provenance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Chunk text
    pub text: String,
    /// Project tag the document was ingested under
    pub project: String,
    /// Source file name
    pub source_file: String,
}

impl Chunk {
    pub fn new(
        text: impl Into<String>,
        project: impl Into<String>,
        source_file: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            project: project.into(),
            source_file: source_file.into(),
        }
    }
}

/// Payload stored alongside each vector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkPayload {
    pub text: String,
    pub project: String,
    pub file: String,
}

impl From<Chunk> for ChunkPayload {
    fn from(chunk: Chunk) -> Self {
        Self {
            text: chunk.text,
            project: chunk.project,
            file: chunk.source_file,
        }
    }
}

/// A (vector, payload) record ready for upsert
#[derive(Debug, Clone, Serialize)]
pub struct Point {
    pub id: Uuid,
    pub vector: Vec<f32>,
    pub payload: ChunkPayload,
}

impl Point {
    /// Pair a chunk with its embedding under a fresh random id
    pub fn from_chunk(chunk: Chunk, vector: Vec<f32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            vector,
            payload: chunk.into(),
        }
    }
}
