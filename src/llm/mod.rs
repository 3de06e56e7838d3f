pub mod client;

pub use client::OllamaClient;

use crate::Result;

/// Conversational model
///
/// Each call is independent; the prompt is the user's text and nothing else.
pub trait ChatModel: Send + Sync {
    fn complete(&self, prompt: &str) -> Result<String>;
}
