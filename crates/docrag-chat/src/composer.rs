use std::sync::Arc;

use tracing::debug;

use docrag_core::error::Result;
use docrag_core::traits::ChatProvider;
use docrag_core::types::{ChatMessage, GenerationParams, RetrievalResult};

pub const INSUFFICIENT_CONTEXT_REPLY: &str = "I don't have enough information in the documents to answer that.";

pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Asks the chat model to answer from retrieved chunks only, citing
/// `doc_id`/`chunk_id`. The reply is returned as-is (trimmed); citations are
/// not checked.
pub struct AnswerComposer {
    chat: Arc<dyn ChatProvider>,
    model: String,
    params: GenerationParams,
}

impl AnswerComposer {
    pub fn new(chat: Arc<dyn ChatProvider>, model: impl Into<String>, params: GenerationParams) -> Self {
        Self { chat, model: model.into(), params }
    }

    pub fn model(&self) -> &str { &self.model }

    pub fn answer(&self, question: &str, retrieved: &[RetrievalResult]) -> Result<String> {
        let messages = grounding_messages(question, retrieved);
        debug!(model = %self.model, sources = retrieved.len(), "composing grounded answer");
        let reply = self.chat.complete(&self.model, &messages, &self.params)?;
        Ok(reply.trim().to_string())
    }
}

pub fn system_instruction() -> String {
    format!(
        "You are a document-grounded assistant.\n\
         Answer using ONLY the provided context.\n\
         If the answer is not in the context, say: '{INSUFFICIENT_CONTEXT_REPLY}'\n\
         Cite sources by doc_id and chunk_id when you make a claim.\n"
    )
}

pub fn render_context(retrieved: &[RetrievalResult]) -> String {
    retrieved
        .iter()
        .map(|r| format!("[Source: {} | chunk {}]\n{}", r.doc_id, r.chunk_id, r.text))
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

pub fn grounding_messages(question: &str, retrieved: &[RetrievalResult]) -> Vec<ChatMessage> {
    let user = format!("QUESTION:\n{}\n\nCONTEXT:\n{}", question, render_context(retrieved));
    vec![ChatMessage::system(system_instruction()), ChatMessage::user(user)]
}
