//! Completion client implementations

pub mod openrouter;

use crate::{Message, Result};
use async_trait::async_trait;

/// Trait for chat-completion clients
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Request a reply to `user_message` given the prior conversation.
    ///
    /// Implementations forward at most the configured number of recent
    /// messages from `history` and return the text of the first choice.
    async fn complete(&self, history: &[Message], user_message: &str) -> Result<String>;
}

/// Get an API key from a provided value or environment variable.
///
/// Absent keys are not an error: the endpoint may be a proxy that injects
/// the credential server-side.
pub fn get_api_key(provided: Option<&str>, env_var: &str) -> Option<String> {
    if let Some(key) = provided.filter(|k| !k.is_empty()) {
        return Some(key.to_string());
    }

    std::env::var(env_var).ok().filter(|k| !k.is_empty())
}
