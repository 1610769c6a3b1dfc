use crate::error::Result;
use crate::types::{ChatMessage, GenerationParams};

/// Something that turns texts into embedding vectors.
///
/// Output is positionally aligned with `texts`. Vectors need not be
/// normalized; `docrag_embed::Embedder` normalizes them.
pub trait EmbedProvider: Send + Sync {
    fn embed(&self, model: &str, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Something that answers a chat conversation with a single text reply.
pub trait ChatProvider: Send + Sync {
    fn complete(&self, model: &str, messages: &[ChatMessage], params: &GenerationParams) -> Result<String>;
}
