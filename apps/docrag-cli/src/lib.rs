//! Shared plumbing for the interactive binaries.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use docrag_core::config::{Config, Settings};
use tracing_subscriber::EnvFilter;

/// Logs go to stderr; `RUST_LOG` overrides the default `warn`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).try_init();
}

/// Settings from `config*.toml` + `APP_*`, and the directory relative paths resolve against.
pub fn load_settings() -> anyhow::Result<(Settings, PathBuf)> {
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let settings = config.settings()?;
    let base = std::env::current_dir()?;
    Ok((settings, base))
}

#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Quit,
    Empty,
    Text(String),
}

pub fn classify(line: &str) -> Input {
    let text = line.trim();
    if text.eq_ignore_ascii_case("exit") || text.eq_ignore_ascii_case("quit") {
        Input::Quit
    } else if text.is_empty() {
        Input::Empty
    } else {
        Input::Text(text.to_string())
    }
}

/// Print `prompt` and read one line. End of input counts as quit.
pub fn read_input(prompt: &str, stdin: &mut impl BufRead) -> io::Result<Input> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    if stdin.read_line(&mut line)? == 0 {
        return Ok(Input::Quit);
    }
    Ok(classify(&line))
}
