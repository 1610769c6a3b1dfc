use std::collections::HashSet;
use std::fs;
use std::sync::Arc;

use docrag_core::chunker::Chunker;
use docrag_core::loader::load_documents;
use docrag_embed::{l2_norm, Embedder, FakeEmbedProvider};
use docrag_index::{build_and_save, Index, Retriever};
use tempfile::TempDir;

fn seed_docs(dir: &std::path::Path) {
    fs::create_dir_all(dir.join("skills")).unwrap();
    fs::write(dir.join("skills/fire.txt"), "To start a fire gather dry tinder, kindling and fuel wood. Keep the fire small and sheltered from wind.").unwrap();
    fs::write(dir.join("skills/water.txt"), "Boil water for one minute to make it safe. Filter cloudy water through cloth before boiling.").unwrap();
    fs::write(dir.join("garden.md"), "Plant potatoes in early spring. Hill the soil around the stems as the plants grow.").unwrap();
}

#[test]
fn build_load_retrieve_full_flow() {
    let tmp = TempDir::new().expect("tmp");
    let docs_dir = tmp.path().join("docs");
    let index_path = tmp.path().join("out/index.json");
    seed_docs(&docs_dir);

    let embedder = Embedder::new(Arc::new(FakeEmbedProvider::default()), "fake-embed", 4).expect("embedder");
    let chunker = Chunker::new(60, 10).expect("chunker");
    let built = build_and_save(&docs_dir, &index_path, chunker, &embedder, false).expect("build");
    assert!(index_path.exists());

    let loaded = Index::load(&index_path).expect("load");
    assert_eq!(loaded.embedding_model(), "fake-embed");

    // Round trip: same chunk texts and count as chunking the documents directly.
    let expected: Vec<String> = load_documents(&docs_dir)
        .expect("docs")
        .iter()
        .flat_map(|d| chunker.split(&d.text))
        .collect();
    let stored: Vec<String> = loaded.chunks().map(|c| c.text.clone()).collect();
    assert_eq!(stored, expected);
    assert_eq!(loaded.len(), built.len());
    assert_eq!(loaded.doc_count(), 3);

    for e in loaded.entries() { assert!((l2_norm(&e.vector) - 1.0).abs() < 1e-4); }

    let ids: HashSet<&str> = loaded.chunks().map(|c| c.doc_id.as_str()).collect();
    assert!(ids.contains("skills/fire.txt"));

    let retriever = Retriever::new(&loaded, &embedder).expect("retriever");
    let results = retriever.retrieve("how do I keep a fire small", 3).expect("retrieve");
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].doc_id, "skills/fire.txt");
    for w in results.windows(2) { assert!(w[0].score >= w[1].score); }
}
