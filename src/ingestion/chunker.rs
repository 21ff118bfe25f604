//! Sliding-window text chunking

/// Text chunker with configurable size and overlap
///
/// Windows are measured in characters, not bytes, so multi-byte text never
/// splits inside a code point. The window advances by `chunk_size - overlap`
/// (at least 1), so consecutive chunks share an `overlap`-character tail and
/// together cover the whole input. Overlap is positional only; it does not
/// respect word boundaries.
pub struct TextChunker {
    chunk_size: usize,
    overlap: usize,
}

impl TextChunker {
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        Self {
            chunk_size,
            overlap,
        }
    }

    /// Split `text` into overlapping windows. Empty input yields no chunks.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        if text.is_empty() || self.chunk_size == 0 {
            return Vec::new();
        }

        let chars: Vec<char> = text.chars().collect();
        let step = self.chunk_size.saturating_sub(self.overlap).max(1);

        let mut chunks = Vec::new();
        let mut offset = 0;
        loop {
            let end = (offset + self.chunk_size).min(chars.len());
            chunks.push(chars[offset..end].iter().collect());
            // the final window reaches the end; a further step would emit a
            // chunk made purely of already-covered overlap
            if end == chars.len() {
                break;
            }
            offset += step;
        }
        chunks
    }
}
