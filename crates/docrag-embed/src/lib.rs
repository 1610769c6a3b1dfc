//! Batched, order-preserving embedding with unit-length output.

use std::sync::Arc;

use tracing::{debug, info};

use docrag_core::config::ProviderSettings;
use docrag_core::error::{Error, Result};
use docrag_core::traits::EmbedProvider;

pub mod fake;
pub mod normalize;
pub mod openai;

pub use fake::FakeEmbedProvider;
pub use normalize::{l2_norm, l2_normalize, NORM_EPSILON};
pub use openai::OpenAiCompatibleProvider;

pub const DEFAULT_BATCH_SIZE: usize = 4;

pub struct Embedder {
    provider: Arc<dyn EmbedProvider>,
    model: String,
    batch_size: usize,
}

impl Embedder {
    pub fn new(provider: Arc<dyn EmbedProvider>, model: impl Into<String>, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(Error::InvalidConfig("embedding batch_size must be at least 1".into()));
        }
        Ok(Self { provider, model: model.into(), batch_size })
    }

    pub fn model(&self) -> &str { &self.model }
    pub fn batch_size(&self) -> usize { self.batch_size }

    /// `output[i]` is the normalized embedding of `texts[i]`.
    pub fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.embed_with_progress(texts, |_| {})
    }

    pub fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(&[text.to_string()])?
            .pop()
            .ok_or_else(|| Error::Provider("provider returned no embedding".into()))
    }

    /// Like `embed`, calling `on_batch(n)` after each batch of `n` texts completes.
    /// The first failing batch aborts the whole call.
    pub fn embed_with_progress(&self, texts: &[String], mut on_batch: impl FnMut(usize)) -> Result<Vec<Vec<f32>>> {
        let mut out: Vec<Vec<f32>> = Vec::with_capacity(texts.len());
        let mut dim: Option<usize> = None;
        for (batch_no, batch) in texts.chunks(self.batch_size).enumerate() {
            debug!(batch = batch_no, size = batch.len(), model = %self.model, "embedding batch");
            let vectors = self.provider.embed(&self.model, batch)?;
            if vectors.len() != batch.len() {
                return Err(Error::Provider(format!(
                    "embedding batch {batch_no}: sent {} texts, got {} vectors",
                    batch.len(),
                    vectors.len()
                )));
            }
            for mut v in vectors {
                let expected = *dim.get_or_insert(v.len());
                if v.is_empty() || v.len() != expected {
                    return Err(Error::Provider(format!(
                        "embedding batch {batch_no}: vector of dimension {} (expected {expected})",
                        v.len()
                    )));
                }
                if !v.iter().all(|x| x.is_finite()) {
                    return Err(Error::Provider(format!(
                        "embedding batch {batch_no}: vector contains NaN or infinite components"
                    )));
                }
                l2_normalize(&mut v);
                out.push(v);
            }
            on_batch(batch.len());
        }
        Ok(out)
    }
}

/// `APP_USE_FAKE_EMBEDDINGS=1|true` switches to the offline fake provider.
pub fn use_fake_embeddings() -> bool {
    std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// The embedding provider selected by the environment and settings.
pub fn default_embed_provider(settings: &ProviderSettings) -> Result<Arc<dyn EmbedProvider>> {
    if use_fake_embeddings() {
        info!("Using FakeEmbedProvider");
        return Ok(Arc::new(FakeEmbedProvider::default()));
    }
    Ok(Arc::new(OpenAiCompatibleProvider::from_settings(settings)?))
}

/// Model tag recorded in the index. The fake provider gets its own tag so a
/// fake-built index is never mistaken for one built by the configured model.
pub fn default_embedding_model(settings: &ProviderSettings) -> String {
    if use_fake_embeddings() {
        FakeEmbedProvider::default().model_tag()
    } else {
        settings.embedding_model.clone()
    }
}

pub fn default_embedder(settings: &ProviderSettings) -> Result<Embedder> {
    Embedder::new(default_embed_provider(settings)?, default_embedding_model(settings), settings.batch_size)
}
