//! Core types for chat completions

use serde::{Deserialize, Serialize};

/// Default chat-completion endpoint
pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Default model identifier
pub const DEFAULT_MODEL: &str = "deepseek/deepseek-r1-0528-qwen3-8b:free";

/// Default maximum tokens to generate
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Number of prior messages forwarded as context
pub const DEFAULT_CONTEXT_LIMIT: usize = 10;

/// `X-Title` sent for OpenRouter attribution
pub const DEFAULT_TITLE: &str = "KarirKita Career Assistant";

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    /// Role tag used on the wire
    pub fn role(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "assistant",
        }
    }
}

/// A single chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub sender: Sender,
}

impl Message {
    /// Create a user message
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::User,
        }
    }

    /// Create a bot message
    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Bot,
        }
    }
}

/// The most recent `limit` messages of `history`.
pub fn recent(history: &[Message], limit: usize) -> &[Message] {
    &history[history.len().saturating_sub(limit)..]
}

/// Context for one completion request
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// System prompt
    pub system_prompt: Option<String>,
    /// Conversation messages, oldest first, ending with the new user message
    pub messages: Vec<Message>,
}

impl Context {
    /// Build the context for a user turn.
    ///
    /// Only the last `limit` entries of `history` are kept; `user_message` is
    /// always appended after them.
    pub fn for_turn(
        system_prompt: Option<&str>,
        history: &[Message],
        user_message: &str,
        limit: usize,
    ) -> Self {
        let mut messages = recent(history, limit).to_vec();
        messages.push(Message::user(user_message));
        Self {
            system_prompt: system_prompt.map(str::to_string),
            messages,
        }
    }
}

/// Options for completion requests
#[derive(Debug, Clone)]
pub struct CompletionOptions {
    /// Model identifier
    pub model: String,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Temperature (0.0 - 2.0)
    pub temperature: Option<f32>,
    /// How many prior messages to forward
    pub context_limit: usize,
    /// Persona instruction prepended as a system message
    pub system_prompt: Option<String>,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: Some(DEFAULT_MAX_TOKENS),
            temperature: Some(DEFAULT_TEMPERATURE),
            context_limit: DEFAULT_CONTEXT_LIMIT,
            system_prompt: Some(crate::persona::CAREER_ASSISTANT.to_string()),
        }
    }
}
