//! Everything that talks to the chat model: grounded answers over retrieved
//! chunks, fixed prompt templates, and persisted conversation sessions.

pub mod composer;
pub mod prompts;
pub mod session;

pub use composer::AnswerComposer;
pub use prompts::PromptMode;
pub use session::{Session, SessionMessage, SessionStore};
