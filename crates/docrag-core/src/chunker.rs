//! Fixed-size, overlapping character windows over whitespace-normalized text.

use crate::error::{Error, Result};
use crate::types::{Chunk, Document};

pub const DEFAULT_CHUNK_SIZE: usize = 800;
pub const DEFAULT_OVERLAP: usize = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    chunk_size: usize,
    overlap: usize,
}

impl Default for Chunker {
    fn default() -> Self {
        Self { chunk_size: DEFAULT_CHUNK_SIZE, overlap: DEFAULT_OVERLAP }
    }
}

impl Chunker {
    /// Sizes are in characters. `overlap` must be smaller than `chunk_size`,
    /// otherwise the window could never advance.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::InvalidConfig("chunk_size must be at least 1".into()));
        }
        if overlap >= chunk_size {
            return Err(Error::InvalidConfig(format!(
                "chunking overlap ({overlap}) must be smaller than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, overlap })
    }

    pub fn chunk_size(&self) -> usize { self.chunk_size }
    pub fn overlap(&self) -> usize { self.overlap }
    pub fn stride(&self) -> usize { self.chunk_size - self.overlap }

    pub fn split(&self, text: &str) -> Vec<String> {
        let text = normalize_whitespace(text);
        if text.is_empty() {
            return Vec::new();
        }

        // Byte offset of every char plus the end, so windows never cut a code point.
        let bounds: Vec<usize> = text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len())).collect();
        let char_len = bounds.len() - 1;

        let mut chunks = Vec::new();
        let mut start = 0usize;
        loop {
            let end = (start + self.chunk_size).min(char_len);
            chunks.push(text[bounds[start]..bounds[end]].to_string());
            if end == char_len {
                break;
            }
            start += self.stride();
        }
        chunks
    }

    pub fn chunk_document(&self, doc: &Document) -> Vec<Chunk> {
        self.split(&doc.text)
            .into_iter()
            .enumerate()
            .map(|(chunk_id, text)| Chunk { doc_id: doc.id.clone(), chunk_id, text })
            .collect()
    }
}

/// Collapse every whitespace run (newlines included) into one space and trim.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
