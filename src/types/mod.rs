//! Shared data types

pub mod chunk;
pub mod request;
pub mod response;

pub use chunk::{Chunk, ChunkPayload, Point};
pub use request::{ChatRequest, IngestUrlsRequest, SharePointRequest};
pub use response::{ChatResponse, ChatSource, ConfigResponse, IngestResponse, UrlIngestResponse};
