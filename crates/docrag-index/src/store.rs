//! The persisted index: every chunk paired with its embedding.
//!
//! On disk this is one JSON document,
//! `{"embedding_model", "chunks": [...], "embeddings": [[...]]}`, with the two
//! arrays positionally aligned. In memory the pairing lives in `IndexEntry` so
//! the lists can never drift apart; alignment is checked again on load.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use docrag_core::error::{Error, Result};
use docrag_core::types::Chunk;

#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub chunk: Chunk,
    pub vector: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    embedding_model: String,
    entries: Vec<IndexEntry>,
}

#[derive(Serialize)]
struct IndexFileRef<'a> {
    embedding_model: &'a str,
    chunks: Vec<&'a Chunk>,
    embeddings: Vec<&'a [f32]>,
}

#[derive(Deserialize)]
struct IndexFile {
    embedding_model: String,
    chunks: Vec<Chunk>,
    embeddings: Vec<Vec<f32>>,
}

impl Index {
    /// Pair `chunks[i]` with `embeddings[i]`. Fails unless both lists have the
    /// same length and every vector has the same non-zero dimension.
    pub fn from_parts(embedding_model: impl Into<String>, chunks: Vec<Chunk>, embeddings: Vec<Vec<f32>>) -> Result<Self> {
        let entries = pair(chunks, embeddings).map_err(Error::Provider)?;
        Ok(Self { embedding_model: embedding_model.into(), entries })
    }

    pub fn embedding_model(&self) -> &str { &self.embedding_model }
    pub fn entries(&self) -> &[IndexEntry] { &self.entries }
    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Vector dimension, `None` for an empty index.
    pub fn dimension(&self) -> Option<usize> { self.entries.first().map(|e| e.vector.len()) }

    pub fn doc_count(&self) -> usize {
        self.entries.iter().map(|e| e.chunk.doc_id.as_str()).collect::<HashSet<_>>().len()
    }

    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> { self.entries.iter().map(|e| &e.chunk) }

    /// Write the whole index to `path` in one step: serialize into a temp file
    /// next to it, then rename over the target.
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent)?;

        let file = IndexFileRef {
            embedding_model: &self.embedding_model,
            chunks: self.entries.iter().map(|e| &e.chunk).collect(),
            embeddings: self.entries.iter().map(|e| e.vector.as_slice()).collect(),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(&parent)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            serde_json::to_writer(&mut writer, &file)?;
            writer.flush()?;
        }
        tmp.persist(path).map_err(|e| Error::Io(e.error))?;
        info!(path = %path.display(), chunks = self.len(), "index saved");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::IndexNotBuilt(path.to_path_buf()));
        }
        let corrupt = |reason: String| Error::CorruptIndex { path: path.to_path_buf(), reason };
        let reader = BufReader::new(File::open(path)?);
        let file: IndexFile = serde_json::from_reader(reader).map_err(|e| corrupt(e.to_string()))?;
        let entries = pair(file.chunks, file.embeddings).map_err(corrupt)?;
        info!(path = %path.display(), chunks = entries.len(), model = %file.embedding_model, "index loaded");
        Ok(Self { embedding_model: file.embedding_model, entries })
    }
}

fn pair(chunks: Vec<Chunk>, embeddings: Vec<Vec<f32>>) -> std::result::Result<Vec<IndexEntry>, String> {
    if chunks.len() != embeddings.len() {
        return Err(format!("{} chunks but {} embeddings", chunks.len(), embeddings.len()));
    }
    if let Some(first) = embeddings.first() {
        let dim = first.len();
        if dim == 0 {
            return Err("embedding vectors are empty".to_string());
        }
        if let Some(pos) = embeddings.iter().position(|v| v.len() != dim) {
            return Err(format!("embedding {pos} has dimension {}, expected {dim}", embeddings[pos].len()));
        }
    }
    Ok(chunks.into_iter().zip(embeddings).map(|(chunk, vector)| IndexEntry { chunk, vector }).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(doc: &str, id: usize) -> Chunk {
        Chunk { doc_id: doc.to_string(), chunk_id: id, text: format!("{doc} #{id}") }
    }

    #[test]
    fn from_parts_rejects_misaligned_lists() {
        let err = Index::from_parts("m", vec![chunk("a", 0), chunk("a", 1)], vec![vec![1.0]]).unwrap_err();
        assert!(err.to_string().contains("2 chunks but 1 embeddings"), "{err}");
    }

    #[test]
    fn from_parts_rejects_ragged_vectors() {
        assert!(Index::from_parts("m", vec![chunk("a", 0), chunk("b", 0)], vec![vec![1.0, 0.0], vec![1.0]]).is_err());
    }

    #[test]
    fn saved_file_uses_parallel_arrays() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested/dir/index.json");
        let index = Index::from_parts("llama3", vec![chunk("a.txt", 0)], vec![vec![0.6, 0.8]]).unwrap();
        index.save(&path).unwrap();

        let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["embedding_model"], "llama3");
        assert_eq!(raw["chunks"][0]["doc_id"], "a.txt");
        assert_eq!(raw["chunks"][0]["chunk_id"], 0);
        assert_eq!(raw["embeddings"].as_array().unwrap().len(), 1);

        assert_eq!(Index::load(&path).unwrap(), index);
    }

    #[test]
    fn load_rejects_misaligned_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("index.json");
        fs::write(&path, r#"{"embedding_model":"m","chunks":[{"doc_id":"a","chunk_id":0,"text":"x"}],"embeddings":[]}"#).unwrap();
        assert!(matches!(Index::load(&path), Err(Error::CorruptIndex { .. })));
    }

    #[test]
    fn doc_count_counts_distinct_documents() {
        let index = Index::from_parts("m", vec![chunk("a", 0), chunk("a", 1), chunk("b", 0)], vec![vec![1.0]; 3]).unwrap();
        assert_eq!(index.doc_count(), 2);
        assert_eq!(index.dimension(), Some(1));
    }
}
