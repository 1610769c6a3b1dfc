//! Build path: load → chunk → embed → pair.

use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use docrag_core::chunker::Chunker;
use docrag_core::error::{Error, Result};
use docrag_core::loader::load_documents;
use docrag_core::types::{Chunk, Document};
use docrag_embed::Embedder;

use crate::store::Index;

pub struct IndexBuilder<'a> {
    chunker: Chunker,
    embedder: &'a Embedder,
    show_progress: bool,
}

impl<'a> IndexBuilder<'a> {
    pub fn new(chunker: Chunker, embedder: &'a Embedder) -> Self {
        Self { chunker, embedder, show_progress: false }
    }

    /// Draw an indicatif bar over embedding batches.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn build(&self, docs_dir: &Path) -> Result<Index> {
        let docs = load_documents(docs_dir)?;
        self.build_from_documents(docs_dir, &docs)
    }

    /// `source` only names the origin in the error when nothing is indexable.
    pub fn build_from_documents(&self, source: &Path, docs: &[Document]) -> Result<Index> {
        if docs.is_empty() {
            return Err(Error::EmptySource(source.to_path_buf()));
        }

        let mut chunks: Vec<Chunk> = Vec::new();
        for doc in docs {
            let doc_chunks = self.chunker.chunk_document(doc);
            if doc_chunks.is_empty() {
                debug!(doc_id = %doc.id, "document has no text, skipped");
                continue;
            }
            chunks.extend(doc_chunks);
        }
        if chunks.is_empty() {
            return Err(Error::EmptySource(source.to_path_buf()));
        }
        info!(documents = docs.len(), chunks = chunks.len(), "chunked documents");

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let pb = self.progress_bar(texts.len());
        let embeddings = self.embedder.embed_with_progress(&texts, |n| pb.inc(n as u64));
        let embeddings = match embeddings {
            Ok(e) => { pb.finish_with_message("embedded"); e }
            Err(err) => { pb.abandon_with_message("embedding failed"); return Err(err); }
        };

        Index::from_parts(self.embedder.model(), chunks, embeddings)
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%) {msg}")
            .map(|s| s.progress_chars("#>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        pb
    }
}

pub fn build_index(docs_dir: &Path, chunker: Chunker, embedder: &Embedder) -> Result<Index> {
    IndexBuilder::new(chunker, embedder).build(docs_dir)
}

/// Build and persist. Nothing is written unless every batch embedded successfully.
pub fn build_and_save(docs_dir: &Path, index_path: &Path, chunker: Chunker, embedder: &Embedder, show_progress: bool) -> Result<Index> {
    let index = IndexBuilder::new(chunker, embedder).with_progress(show_progress).build(docs_dir)?;
    index.save(index_path)?;
    Ok(index)
}
