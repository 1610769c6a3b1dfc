//! OpenAI-compatible HTTP provider (OpenAI, Ollama, llama.cpp server, ...).
//!
//! Providers differ only by base URL and API key; both `/embeddings` and
//! `/chat/completions` are served from the same client.

use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use docrag_core::config::ProviderSettings;
use docrag_core::error::{Error, Result};
use docrag_core::traits::{ChatProvider, EmbedProvider};
use docrag_core::types::{ChatMessage, GenerationParams};

pub struct OpenAiCompatibleProvider {
    base_url: String,
    api_key: String,
    client: reqwest::blocking::Client,
}

impl OpenAiCompatibleProvider {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Provider(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.trim().to_string(),
            client,
        })
    }

    pub fn from_settings(settings: &ProviderSettings) -> Result<Self> {
        Self::new(&settings.base_url, &settings.api_key, Duration::from_secs(settings.timeout_secs))
    }

    pub fn base_url(&self) -> &str { &self.base_url }

    fn post(&self, path: &str, body: &Value) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "provider request");
        let mut req = self.client.post(&url).json(body);
        if !self.api_key.is_empty() {
            req = req.bearer_auth(&self.api_key);
        }
        let response = req.send().map_err(|e| transport_error(&url, e))?;
        let status = response.status();
        let text = response.text().map_err(|e| transport_error(&url, e))?;
        if !status.is_success() {
            return Err(Error::Provider(format!("{url} returned {status}: {}", text.trim())));
        }
        serde_json::from_str(&text).map_err(|e| Error::Provider(format!("Invalid JSON from {url}: {e}")))
    }
}

fn transport_error(url: &str, err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Timeout(format!("{url}: {err}"))
    } else {
        Error::Provider(format!("{url}: {err}"))
    }
}

impl EmbedProvider for OpenAiCompatibleProvider {
    fn embed(&self, model: &str, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let payload = self.post("/embeddings", &embeddings_request(model, texts))?;
        parse_embeddings(payload)
    }
}

impl ChatProvider for OpenAiCompatibleProvider {
    fn complete(&self, model: &str, messages: &[ChatMessage], params: &GenerationParams) -> Result<String> {
        let payload = self.post("/chat/completions", &chat_request(model, messages, params))?;
        parse_chat_content(&payload)
    }
}

pub fn embeddings_request(model: &str, texts: &[String]) -> Value {
    json!({ "model": model, "input": texts })
}

pub fn chat_request(model: &str, messages: &[ChatMessage], params: &GenerationParams) -> Value {
    json!({
        "model": model,
        "messages": messages,
        "temperature": params.temperature,
        "max_tokens": params.max_tokens,
    })
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: Option<usize>,
    embedding: Vec<f32>,
}

/// Vectors in input order; honours the `index` field when every item carries one.
pub fn parse_embeddings(payload: Value) -> Result<Vec<Vec<f32>>> {
    let mut resp: EmbeddingResponse = serde_json::from_value(payload)
        .map_err(|e| Error::Provider(format!("Malformed embeddings response: {e}")))?;
    if resp.data.iter().all(|d| d.index.is_some()) {
        resp.data.sort_by_key(|d| d.index);
    }
    Ok(resp.data.into_iter().map(|d| d.embedding).collect())
}

pub fn parse_chat_content(payload: &Value) -> Result<String> {
    payload
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
        .map(|content| content.trim().to_string())
        .ok_or_else(|| Error::Provider(format!("Chat response did not include assistant content: {payload}")))
}
