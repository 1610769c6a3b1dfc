use std::io;

use clap::Parser;

use docrag_chat::session::DEFAULT_MAX_AGE_SECS;
use docrag_chat::{PromptMode, SessionStore};
use docrag_cli::{init_tracing, load_settings, read_input, Input};
use docrag_core::traits::ChatProvider;
use docrag_core::types::{ChatMessage, Role};
use docrag_embed::OpenAiCompatibleProvider;

const SYSTEM_PROMPT: &str = "You are a helpful assistant. Be concise and correct.";

#[derive(Parser, Debug)]
#[command(name = "docrag-chat", about = "Plain chat assistant with persisted sessions")]
struct Args {
    /// Session to resume or create
    #[arg(long, default_value = "default")]
    session: String,
    /// Wrap every input in a prompt template (summarize, qa, classify, rewrite, plan)
    #[arg(long)]
    mode: Option<PromptMode>,
    /// How many earlier messages to send along (default: chat.history)
    #[arg(long)]
    history: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    let (settings, base) = load_settings()?;
    let history = args.history.unwrap_or(settings.chat.history);
    let params = settings.chat.params();
    let chat = OpenAiCompatibleProvider::from_settings(&settings.provider)?;

    let mut store = SessionStore::load(&settings.data.sessions_path(&base))?;
    if store.cleanup(DEFAULT_MAX_AGE_SECS) > 0 {
        store.flush()?;
    }

    match args.mode {
        Some(mode) => println!("CLI Assistant [{mode}] session={} (type 'exit' to quit)", args.session),
        None => println!("CLI Assistant session={} (type 'exit' to quit)", args.session),
    }

    let mut stdin = io::stdin().lock();
    loop {
        let user_text = match read_input("\nYou: ", &mut stdin)? {
            Input::Quit => { println!("Goodbye."); break; }
            Input::Empty => { println!("Please enter a question."); continue; }
            Input::Text(t) => t,
        };
        let prompt = args.mode.map(|m| m.render(&user_text)).unwrap_or_else(|| user_text.clone());

        let mut messages = vec![ChatMessage::system(SYSTEM_PROMPT)];
        messages.extend(store.history(&args.session, history));
        messages.push(ChatMessage::user(prompt));

        match chat.complete(&settings.provider.chat_model, &messages, &params) {
            Ok(answer) => {
                println!("\nAssistant: {answer}");
                store.append_message(&args.session, Role::User, &user_text);
                store.append_message(&args.session, Role::Assistant, &answer);
                if let Err(e) = store.flush() {
                    eprintln!("Warning: could not save session: {e}");
                }
            }
            Err(e) => eprintln!("\nError: {e}"),
        }
    }
    Ok(())
}
