use tracing::debug;

use docrag_core::error::{Error, Result};
use docrag_core::types::RetrievalResult;
use docrag_embed::Embedder;

use crate::store::Index;

/// Brute-force top-k over a loaded index. Scores are dot products, which
/// equal cosine similarity because both sides are unit length.
pub struct Retriever<'a> {
    index: &'a Index,
    embedder: &'a Embedder,
}

impl<'a> Retriever<'a> {
    /// Refuses an embedder whose model differs from the one the index was built with.
    pub fn new(index: &'a Index, embedder: &'a Embedder) -> Result<Self> {
        if index.embedding_model() != embedder.model() {
            return Err(Error::ModelMismatch {
                index: index.embedding_model().to_string(),
                query: embedder.model().to_string(),
            });
        }
        Ok(Self { index, embedder })
    }

    pub fn index(&self) -> &Index { self.index }

    pub fn retrieve(&self, query: &str, k: usize) -> Result<Vec<RetrievalResult>> {
        if k == 0 || self.index.is_empty() {
            return Ok(Vec::new());
        }
        let q_vec = self.embedder.embed_one(query)?;
        rank(self.index, &q_vec, k)
    }
}

pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Score every entry against `query_vec` and keep the best `k`.
/// Ties keep index order.
pub fn rank(index: &Index, query_vec: &[f32], k: usize) -> Result<Vec<RetrievalResult>> {
    let Some(dim) = index.dimension() else { return Ok(Vec::new()) };
    if query_vec.len() != dim {
        return Err(Error::DimensionMismatch { index: dim, query: query_vec.len() });
    }

    let mut scored: Vec<(usize, f32)> =
        index.entries().iter().enumerate().map(|(i, e)| (i, dot(&e.vector, query_vec))).collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.truncate(k);
    debug!(candidates = index.len(), returned = scored.len(), "ranked");

    Ok(scored
        .into_iter()
        .map(|(i, score)| {
            let chunk = &index.entries()[i].chunk;
            RetrievalResult { score, doc_id: chunk.doc_id.clone(), chunk_id: chunk.chunk_id, text: chunk.text.clone() }
        })
        .collect())
}
