use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use docrag_core::chunker::Chunker;
use docrag_core::error::{Error, Result};
use docrag_core::traits::EmbedProvider;
use docrag_core::types::Document;
use docrag_embed::{Embedder, FakeEmbedProvider};
use docrag_index::{build_and_save, build_index, Index, IndexBuilder, Retriever};
use tempfile::TempDir;

struct FlakyProvider {
    calls: AtomicUsize,
    fail_at: usize,
}

impl EmbedProvider for FlakyProvider {
    fn embed(&self, model: &str, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == self.fail_at {
            return Err(Error::Timeout("embedding provider did not answer".into()));
        }
        FakeEmbedProvider::default().embed(model, texts)
    }
}

/// Fake vectors, except texts mentioning "broken" get an infinite component.
struct NonFiniteProvider;

impl EmbedProvider for NonFiniteProvider {
    fn embed(&self, model: &str, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = FakeEmbedProvider::new(2).embed(model, texts)?;
        for (text, v) in texts.iter().zip(vectors.iter_mut()) {
            if text.contains("broken") { v[0] = f32::INFINITY; }
        }
        Ok(vectors)
    }
}

fn fake_embedder(model: &str) -> Embedder {
    Embedder::new(Arc::new(FakeEmbedProvider::default()), model, 4).unwrap()
}

/// Ten single-chunk documents, one distinct topic word each.
fn ten_chunk_index(embedder: &Embedder) -> Index {
    let words = ["apple", "bridge", "candle", "desert", "engine", "forest", "glacier", "harbor", "island", "jungle"];
    let docs: Vec<Document> = words.iter().map(|w| Document::new(format!("{w}.txt"), format!("notes about the {w}"))).collect();
    IndexBuilder::new(Chunker::default(), embedder).build_from_documents(std::path::Path::new("mem"), &docs).unwrap()
}

#[test]
fn empty_document_root_is_a_configuration_error() {
    let tmp = TempDir::new().unwrap();
    let docs_dir = tmp.path().join("docs");
    fs::create_dir_all(&docs_dir).unwrap();

    let err = build_index(&docs_dir, Chunker::default(), &fake_embedder("m")).unwrap_err();
    assert!(err.is_configuration());
    assert!(matches!(err, Error::EmptySource(ref p) if p == &docs_dir));
    assert!(err.to_string().contains(&docs_dir.display().to_string()));
}

#[test]
fn whitespace_only_documents_count_as_empty() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("blank.txt"), "   \n\n  ").unwrap();
    let err = build_index(tmp.path(), Chunker::default(), &fake_embedder("m")).unwrap_err();
    assert!(matches!(err, Error::EmptySource(_)));
}

#[test]
fn empty_documents_are_skipped_but_others_indexed() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("blank.txt"), "\n").unwrap();
    fs::write(tmp.path().join("real.txt"), "real content").unwrap();
    let index = build_index(tmp.path(), Chunker::default(), &fake_embedder("m")).unwrap();
    assert_eq!(index.len(), 1);
    assert_eq!(index.entries()[0].chunk.doc_id, "real.txt");
}

#[test]
fn loading_a_missing_index_asks_for_a_build() {
    let tmp = TempDir::new().unwrap();
    let err = Index::load(&tmp.path().join("index.json")).unwrap_err();
    assert!(matches!(err, Error::IndexNotBuilt(_)));
    assert!(err.to_string().contains("--build-index"));
}

#[test]
fn failed_embedding_never_writes_an_index() {
    let tmp = TempDir::new().unwrap();
    let docs_dir = tmp.path().join("docs");
    fs::create_dir_all(&docs_dir).unwrap();
    for i in 0..6 { fs::write(docs_dir.join(format!("{i}.txt")), format!("document number {i}")).unwrap(); }
    let index_path = tmp.path().join("index.json");

    let provider = Arc::new(FlakyProvider { calls: AtomicUsize::new(0), fail_at: 1 });
    let embedder = Embedder::new(provider, "m", 2).unwrap();
    let err = build_and_save(&docs_dir, &index_path, Chunker::default(), &embedder, false).unwrap_err();

    assert!(err.is_provider());
    assert!(!index_path.exists());
}

#[test]
fn failed_rebuild_keeps_previous_index() {
    let tmp = TempDir::new().unwrap();
    let docs_dir = tmp.path().join("docs");
    fs::create_dir_all(&docs_dir).unwrap();
    fs::write(docs_dir.join("a.txt"), "first version").unwrap();
    let index_path = tmp.path().join("index.json");
    build_and_save(&docs_dir, &index_path, Chunker::default(), &fake_embedder("m"), false).unwrap();

    fs::write(docs_dir.join("b.txt"), "second document").unwrap();
    let flaky = Embedder::new(Arc::new(FlakyProvider { calls: AtomicUsize::new(0), fail_at: 0 }), "m", 4).unwrap();
    assert!(build_and_save(&docs_dir, &index_path, Chunker::default(), &flaky, false).is_err());

    assert_eq!(Index::load(&index_path).unwrap().len(), 1);
}

#[test]
fn non_finite_embedding_fails_the_build_and_keeps_previous_index() {
    let tmp = TempDir::new().unwrap();
    let docs_dir = tmp.path().join("docs");
    fs::create_dir_all(&docs_dir).unwrap();
    fs::write(docs_dir.join("a.txt"), "good notes").unwrap();
    let index_path = tmp.path().join("index.json");
    let embedder = Embedder::new(Arc::new(NonFiniteProvider), "m", 4).unwrap();

    fs::write(docs_dir.join("b.txt"), "broken notes").unwrap();
    let err = build_and_save(&docs_dir, &index_path, Chunker::default(), &embedder, false).unwrap_err();
    assert!(err.is_provider());
    assert!(!index_path.exists());

    fs::remove_file(docs_dir.join("b.txt")).unwrap();
    build_and_save(&docs_dir, &index_path, Chunker::default(), &embedder, false).unwrap();
    fs::write(docs_dir.join("b.txt"), "broken notes").unwrap();
    assert!(build_and_save(&docs_dir, &index_path, Chunker::default(), &embedder, false).is_err());

    let index = Index::load(&index_path).unwrap();
    assert_eq!(index.len(), 1);
    assert!(index.entries()[0].vector.iter().all(|x| x.is_finite()));
}

#[test]
fn top_k_is_bounded_by_k_and_index_size() {
    let embedder = fake_embedder("m");
    let index = ten_chunk_index(&embedder);
    assert_eq!(index.len(), 10);
    let retriever = Retriever::new(&index, &embedder).unwrap();

    let three = retriever.retrieve("glacier", 3).unwrap();
    assert_eq!(three.len(), 3);
    assert_eq!(three[0].doc_id, "glacier.txt");
    for w in three.windows(2) { assert!(w[0].score >= w[1].score); }

    let all = retriever.retrieve("tell me about the glacier", 20).unwrap();
    assert_eq!(all.len(), 10);
    for w in all.windows(2) { assert!(w[0].score >= w[1].score); }
}

#[test]
fn retriever_rejects_a_different_embedding_model() {
    let index = ten_chunk_index(&fake_embedder("model-a"));
    let other = fake_embedder("model-b");
    let err = Retriever::new(&index, &other).err().expect("mismatch");
    assert!(matches!(err, Error::ModelMismatch { .. }));
    assert!(err.is_configuration());
}

#[test]
fn query_time_provider_failure_is_reported() {
    let index = ten_chunk_index(&fake_embedder("m"));
    let flaky = Embedder::new(Arc::new(FlakyProvider { calls: AtomicUsize::new(0), fail_at: 0 }), "m", 4).unwrap();
    let retriever = Retriever::new(&index, &flaky).unwrap();
    assert!(matches!(retriever.retrieve("anything", 3), Err(Error::Timeout(_))));
    // The session continues: the next query goes through.
    assert_eq!(retriever.retrieve("anything", 3).unwrap().len(), 3);
}
