//! Deterministic offline embeddings.
//!
//! Each lowercased word is hashed into one of `dim` buckets, so texts sharing
//! words get similar vectors. Enabled with `APP_USE_FAKE_EMBEDDINGS=1`.

use std::hash::{Hash, Hasher};

use twox_hash::XxHash64;

use docrag_core::error::Result;
use docrag_core::traits::EmbedProvider;

pub const FAKE_EMBEDDING_DIM: usize = 384;

#[derive(Debug, Clone)]
pub struct FakeEmbedProvider {
    dim: usize,
}

impl Default for FakeEmbedProvider {
    fn default() -> Self { Self::new(FAKE_EMBEDDING_DIM) }
}

impl FakeEmbedProvider {
    pub fn new(dim: usize) -> Self { Self { dim: dim.max(1) } }

    pub fn dim(&self) -> usize { self.dim }

    /// `fake:<dim>`, the model name an index built with this provider carries.
    pub fn model_tag(&self) -> String { format!("fake:{}", self.dim) }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dim];
        for token in text.split_whitespace() {
            let token: String = token.chars().filter(|c| c.is_alphanumeric()).flat_map(char::to_lowercase).collect();
            if token.is_empty() { continue; }
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h % self.dim as u64) as usize;
            v[idx] += 1.0 + ((h >> 32) as u32) as f32 / u32::MAX as f32 * 0.1;
        }
        v
    }
}

impl EmbedProvider for FakeEmbedProvider {
    fn embed(&self, _model: &str, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}
