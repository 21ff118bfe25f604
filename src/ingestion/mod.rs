//! Document ingestion: extraction, chunking, embedding, upsert

pub mod chunker;
pub mod extractor;
pub mod fetch;
pub mod pipeline;

pub use chunker::TextChunker;
pub use extractor::{ExtractedText, ExtractionMethod, TextExtractor};
pub use fetch::UrlFetcher;
pub use pipeline::{DocumentOutcome, IngestPipeline, IngestReport, SourceDocument};
