//! Recursive document loading.
//!
//! Plain-text files (`.txt`, `.md`) are read verbatim, dropping any byte
//! sequence that is not valid UTF-8. PDFs are extracted page by page when the
//! `pdf` feature is enabled. A document that cannot be read is logged and
//! skipped; it never aborts the whole load.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::types::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    PlainText,
    Pdf,
}

impl DocumentKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "txt" | "md" => Some(Self::PlainText),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct DocumentLoader;

impl DocumentLoader {
    pub fn new() -> Self { Self }

    /// Load every recognized file under `root`, ordered by `doc_id`.
    pub fn load(&self, root: &Path) -> Result<Vec<Document>> {
        let files = self.list_files(root);
        let mut docs = Vec::with_capacity(files.len());
        for (path, kind) in files {
            let doc_id = doc_id_for(&path, root);
            match read_document(&path, kind, &doc_id) {
                Ok(text) => {
                    debug!(doc_id = %doc_id, chars = text.len(), "loaded document");
                    docs.push(Document { id: doc_id, text });
                }
                Err(err) => warn!("Skipping document: {}", err),
            }
        }
        docs.sort_by(|a, b| a.id.cmp(&b.id));
        info!(root = %root.display(), documents = docs.len(), "documents loaded");
        Ok(docs)
    }

    fn list_files(&self, root: &Path) -> Vec<(PathBuf, DocumentKind)> {
        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(root).follow_links(true).into_iter() {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => { debug!("walk error under {}: {}", root.display(), err); continue; }
            };
            if !entry.file_type().is_file() { continue; }
            if let Some(kind) = DocumentKind::from_path(entry.path()) {
                files.push((entry.into_path(), kind));
            }
        }
        files
    }
}

pub fn load_documents(root: &Path) -> Result<Vec<Document>> {
    DocumentLoader::new().load(root)
}

/// Path relative to `root`, `/`-separated on every platform.
pub fn doc_id_for(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Decode UTF-8, dropping invalid sequences instead of replacing them.
pub fn decode_utf8_skipping_invalid(bytes: &[u8]) -> String {
    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
}

fn read_document(path: &Path, kind: DocumentKind, doc_id: &str) -> Result<String> {
    let ingestion = |reason: String| Error::Ingestion { doc_id: doc_id.to_string(), reason };
    match kind {
        DocumentKind::PlainText => {
            let bytes = fs::read(path).map_err(|e| ingestion(e.to_string()))?;
            Ok(decode_utf8_skipping_invalid(&bytes))
        }
        DocumentKind::Pdf => read_pdf(path).map_err(ingestion),
    }
}

#[cfg(feature = "pdf")]
fn read_pdf(path: &Path) -> std::result::Result<String, String> {
    let bytes = fs::read(path).map_err(|e| e.to_string())?;
    // The extractor panics on some malformed files.
    let pages = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(&bytes))
        .map_err(|_| "PDF extraction panicked (malformed file)".to_string())?
        .map_err(|e| format!("PDF extraction failed: {e:?}"))?;
    Ok(pages.join("\n"))
}

#[cfg(not(feature = "pdf"))]
fn read_pdf(_path: &Path) -> std::result::Result<String, String> {
    Err("PDF support is not compiled in (enable the `pdf` feature)".to_string())
}
