use std::sync::Arc;

use docrag_embed::{Embedder, FakeEmbedProvider};

fn main() -> anyhow::Result<()> {
    let embedder = Embedder::new(Arc::new(FakeEmbedProvider::default()), "fake", 4)?;
    let texts = vec!["hello world".to_string(), "rust embeddings".to_string()];
    let embs = embedder.embed(&texts)?;
    println!("B={} dim={}", embs.len(), embs.first().map(Vec::len).unwrap_or(0));
    Ok(())
}
