use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use docrag_chat::AnswerComposer;
use docrag_cli::{init_tracing, load_settings, read_input, Input};
use docrag_embed::{default_embedder, OpenAiCompatibleProvider};
use docrag_index::{build_and_save, Index, Retriever};

#[derive(Parser, Debug)]
#[command(name = "docrag-assistant", about = "Document-aware assistant over a local embedding index")]
struct Args {
    /// Build the embedding index from the document directory, then exit
    #[arg(long)]
    build_index: bool,
    /// Top-k chunks to retrieve per question
    #[arg(long)]
    k: Option<usize>,
    /// Document root (default: data.docs_dir)
    #[arg(long)]
    docs_dir: Option<PathBuf>,
    /// Index file (default: data.index_path)
    #[arg(long)]
    index_path: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    let (settings, base) = load_settings()?;
    let docs_dir = args.docs_dir.unwrap_or_else(|| settings.data.docs_dir(&base));
    let index_path = args.index_path.unwrap_or_else(|| settings.data.index_path(&base));
    let embedder = default_embedder(&settings.provider)?;

    if args.build_index {
        println!("Building index from {}...", docs_dir.display());
        let chunker = settings.chunking.chunker()?;
        let index = build_and_save(&docs_dir, &index_path, chunker, &embedder, true)?;
        println!("📊 Indexed {} chunks from {} documents", index.len(), index.doc_count());
        println!("Index saved to {}", index_path.display());
        return Ok(());
    }

    let k = args.k.unwrap_or(settings.retrieval.top_k);
    let index = Index::load(&index_path)?;
    let retriever = Retriever::new(&index, &embedder)?;
    info!(chunks = index.len(), k, "index ready");

    let chat = Arc::new(OpenAiCompatibleProvider::from_settings(&settings.provider)?);
    let composer = AnswerComposer::new(chat, settings.provider.chat_model.clone(), settings.chat.params());

    println!("Document-Aware Assistant (type 'exit' to quit)");
    println!("Tip: run once with --build-index after you add or change documents.\n");

    let mut stdin = io::stdin().lock();
    loop {
        let question = match read_input("You: ", &mut stdin)? {
            Input::Quit => { println!("Goodbye."); break; }
            Input::Empty => { println!("Please enter a question.\n"); continue; }
            Input::Text(q) => q,
        };

        let retrieved = match retriever.retrieve(&question, k) {
            Ok(r) => r,
            Err(e) => { eprintln!("\nError: {e}\n"); continue; }
        };
        println!("\nTop retrieved chunks:");
        for r in &retrieved {
            println!("- score={:.3} source={} chunk={}", r.score, r.doc_id, r.chunk_id);
        }
        println!();

        match composer.answer(&question, &retrieved) {
            Ok(answer) => println!("Assistant:\n{answer}\n"),
            Err(e) => eprintln!("Error: {e}\n"),
        }
    }
    Ok(())
}
