use std::path::{Path, PathBuf};

use docrag_index::Index;

fn main() -> anyhow::Result<()> {
    let ws_root = Path::new(env!("CARGO_MANIFEST_DIR")).ancestors().nth(2).unwrap_or(Path::new("."));
    let index_path = std::env::args().nth(1).map(PathBuf::from).unwrap_or_else(|| ws_root.join("data/index.json"));
    let index = Index::load(&index_path)?;
    println!("index: {}", index_path.display());
    println!("embedding_model={} dim={}", index.embedding_model(), index.dimension().unwrap_or(0));
    println!("documents={} chunks={}", index.doc_count(), index.len());
    Ok(())
}
