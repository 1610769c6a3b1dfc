//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge built-in defaults + `config.toml` + `config.<env>.toml`
//! + `APP_*` env vars (`__` separates nested keys, e.g. `APP_PROVIDER__BASE_URL`).
//! Provides helpers to expand `~` and `${VAR}` and to resolve relative paths
//! against a known base directory.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::chunker::Chunker;
use crate::error::{Error, Result};
use crate::types::GenerationParams;

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self::from_figment(figment);
        config.settings()?;
        Ok(config)
    }

    /// Wrap an already-assembled figment (tests, embedding callers).
    pub fn from_figment(figment: Figment) -> Self {
        Self { figment }
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// Extract and validate the typed settings tree.
    pub fn settings(&self) -> anyhow::Result<Settings> {
        let settings: Settings = self
            .figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to read settings: {}", e))?;
        settings.validate()?;
        Ok(settings)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data: DataSettings,
    pub provider: ProviderSettings,
    pub chunking: ChunkingSettings,
    pub retrieval: RetrievalSettings,
    pub chat: ChatSettings,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        self.chunking.chunker()?;
        if self.provider.batch_size == 0 {
            return Err(Error::InvalidConfig("provider.batch_size must be at least 1".into()));
        }
        if self.provider.timeout_secs == 0 {
            return Err(Error::InvalidConfig("provider.timeout_secs must be greater than 0".into()));
        }
        if self.provider.base_url.trim().is_empty() {
            return Err(Error::InvalidConfig("provider.base_url must not be empty".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub docs_dir: String,
    pub index_path: String,
    pub sessions_path: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            docs_dir: "data/docs".to_string(),
            index_path: "data/index.json".to_string(),
            sessions_path: "data/sessions.json".to_string(),
        }
    }
}

impl DataSettings {
    pub fn docs_dir(&self, base: &Path) -> PathBuf { resolve_with_base(base, &self.docs_dir) }
    pub fn index_path(&self, base: &Path) -> PathBuf { resolve_with_base(base, &self.index_path) }
    pub fn sessions_path(&self, base: &Path) -> PathBuf { resolve_with_base(base, &self.sessions_path) }
}

/// OpenAI-compatible endpoint settings. The defaults point at a local Ollama.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub base_url: String,
    pub api_key: String,
    pub embedding_model: String,
    pub chat_model: String,
    pub batch_size: usize,
    pub timeout_secs: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434/v1".to_string(),
            api_key: "ollama".to_string(),
            embedding_model: "llama3".to_string(),
            chat_model: "llama3".to_string(),
            batch_size: 4,
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self { chunk_size: 800, overlap: 120 }
    }
}

impl ChunkingSettings {
    pub fn chunker(&self) -> Result<Chunker> { Chunker::new(self.chunk_size, self.overlap) }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub top_k: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self { top_k: 5 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    pub temperature: f32,
    pub max_tokens: u32,
    pub history: usize,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self { temperature: 0.2, max_tokens: 400, history: 10 }
    }
}

impl ChatSettings {
    pub fn params(&self) -> GenerationParams {
        GenerationParams { temperature: self.temperature, max_tokens: self.max_tokens }
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_from(toml: &str) -> Config {
        Config::from_figment(Figment::from(Serialized::defaults(Settings::default())).merge(Toml::string(toml)))
    }

    #[test]
    fn defaults_match_local_ollama_layout() {
        let settings = config_from("").settings().expect("settings");
        assert_eq!(settings.data.docs_dir, "data/docs");
        assert_eq!(settings.data.index_path, "data/index.json");
        assert_eq!(settings.provider.batch_size, 4);
        assert_eq!(settings.chunking.chunk_size, 800);
        assert_eq!(settings.chunking.overlap, 120);
        assert_eq!(settings.retrieval.top_k, 5);
    }

    #[test]
    fn toml_overrides_nested_keys() {
        let config = config_from("[chunking]\nchunk_size = 200\noverlap = 20\n\n[provider]\nchat_model = \"mistral\"\n");
        let settings = config.settings().expect("settings");
        assert_eq!(settings.chunking.chunk_size, 200);
        assert_eq!(settings.provider.chat_model, "mistral");
        assert_eq!(settings.provider.embedding_model, "llama3");
        let k: usize = config.get("retrieval.top_k").expect("top_k");
        assert_eq!(k, 5);
    }

    #[test]
    fn overlap_not_smaller_than_chunk_is_rejected() {
        let err = config_from("[chunking]\nchunk_size = 100\noverlap = 100\n").settings().unwrap_err();
        assert!(err.to_string().contains("overlap"), "{err}");
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        assert!(config_from("[provider]\nbatch_size = 0\n").settings().is_err());
    }

    #[test]
    fn relative_paths_resolve_against_base() {
        let base = Path::new("/srv/rag");
        assert_eq!(resolve_with_base(base, "data/index.json"), PathBuf::from("/srv/rag/data/index.json"));
        assert_eq!(resolve_with_base(base, "/abs/index.json"), PathBuf::from("/abs/index.json"));
    }
}
