pub mod client;
pub mod types;

pub use client::{ChatError, ChatModel, DEFAULT_MODEL, OpenAiClient};
pub use types::ChatMessage;
